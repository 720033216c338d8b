use std::borrow::Cow;

use url::Url;

/// Shown in place of a link whose domain is not on the allow-list.
pub const WITHHELD_LINK: &str = "(link withheld: unverified domain)";

const DEFAULT_ALLOWED_DOMAINS: [&str; 7] = [
    "go.kr",
    "or.kr",
    "fss.or.kr",
    "hf.go.kr",
    "hrd.go.kr",
    "kua.go.kr",
    "bokjiro.go.kr",
];

/// Allow-list of domains whose application links may be shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPolicy {
    allowed_domains: Vec<String>,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS)
    }
}

impl LinkPolicy {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_domains = domains
            .into_iter()
            .map(|domain| domain.as_ref().trim().trim_matches('.').to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        Self { allowed_domains }
    }

    /// Only `https` links on an allowed domain or one of its subdomains pass.
    pub fn is_allowed(&self, link: &str) -> bool {
        let Ok(parsed) = Url::parse(link.trim()) else {
            return false;
        };
        if parsed.scheme() != "https" {
            return false;
        }
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        self.allowed_domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    pub fn display<'a>(&self, link: &'a str) -> Cow<'a, str> {
        if self.is_allowed(link) {
            Cow::Borrowed(link.trim())
        } else {
            Cow::Borrowed(WITHHELD_LINK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_government_subdomains() {
        let policy = LinkPolicy::default();
        assert!(policy.is_allowed("https://www.bokjiro.go.kr"));
        assert!(policy.is_allowed("https://www.fss.or.kr/path?q=1"));
    }

    #[test]
    fn rejects_lookalike_and_plain_http_links() {
        let policy = LinkPolicy::default();
        assert!(!policy.is_allowed("https://evil-go.kr"));
        assert!(!policy.is_allowed("https://bokjiro.go.kr.example.com"));
        assert!(!policy.is_allowed("http://www.hf.go.kr"));
        assert!(!policy.is_allowed("not a link"));
    }

    #[test]
    fn display_withholds_unverified_links() {
        let policy = LinkPolicy::new(["example.org"]);
        assert_eq!(policy.display("https://example.org/apply"), "https://example.org/apply");
        assert_eq!(policy.display("https://www.hf.go.kr"), WITHHELD_LINK);
    }
}

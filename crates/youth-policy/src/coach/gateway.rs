use std::fmt::{self, Write as _};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::LinkPolicy;
use crate::config::AssistantConfig;
use crate::eligibility::{Classification, Profile, ScoredProgram};

pub const SYSTEM_PROMPT: &str = "You are a coach that explains youth policy and finance programs concisely. \
Never guess or state anything you cannot support; when unsure, point to the official link.";

const CONTEXT_RULES: &str =
    "Rules: no speculation, no false statements, point to official links when unsure. Be concise.";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("assistant API key is not configured")]
    MissingApiKey,
    #[error("assistant client could not be built: {0}")]
    Client(String),
    #[error("assistant request timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("assistant transport failure: {0}")]
    Transport(String),
    #[error("assistant returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("assistant returned no answer")]
    EmptyResponse,
}

/// Everything the external assistant is told about the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantContext {
    profile: String,
    fully_eligible: Vec<String>,
    near_miss: Vec<String>,
}

impl AssistantContext {
    /// Captures the profile and both buckets, each capped to `top_n`.
    pub fn new(
        profile: &Profile,
        classification: &Classification,
        top_n: usize,
        links: &LinkPolicy,
    ) -> Self {
        let (fully, near) = classification.top(top_n);
        Self {
            profile: format!(
                "age={}, income={}, housing={}, employment={}",
                profile.age(),
                profile.income(),
                profile.housing_status(),
                profile.employment_status()
            ),
            fully_eligible: context_lines(fully, links),
            near_miss: context_lines(near, links),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[profile] {}", self.profile);
        render_section(&mut out, "fully eligible", &self.fully_eligible);
        render_section(&mut out, "near miss", &self.near_miss);
        out.push_str(CONTEXT_RULES);
        out
    }
}

fn context_lines(entries: &[ScoredProgram], links: &LinkPolicy) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let program = &entry.program;
            format!(
                "- {}: {}, {} (link: {})",
                program.name,
                program.category,
                program.benefit,
                links.display(&program.apply_url)
            )
        })
        .collect()
}

fn render_section(out: &mut String, title: &str, lines: &[String]) {
    let _ = writeln!(out, "[{title}]");
    if lines.is_empty() {
        let _ = writeln!(out, "none");
    }
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantRequest {
    pub system_prompt: String,
    pub context: String,
    pub question: String,
}

impl AssistantRequest {
    pub fn new(context: &AssistantContext, question: &str) -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            context: context.render(),
            question: question.trim().to_string(),
        }
    }

    pub fn user_prompt(&self) -> String {
        format!("{}\n\nQuestion: {}", self.context, self.question)
    }
}

/// External text-completion service. One call per question, no retry.
#[async_trait]
pub trait AssistantGateway: Send + Sync + fmt::Debug {
    async fn complete(&self, request: &AssistantRequest) -> Result<String, GatewayError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout_secs: u64,
}

impl fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAiGateway {
    pub fn from_config(config: &AssistantConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key.clone().ok_or(GatewayError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| GatewayError::Client(err.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Cap on upstream error text carried into fallback replies.
const MAX_ERROR_BODY_CHARS: usize = 200;

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[async_trait]
impl AssistantGateway for OpenAiGateway {
    async fn complete(&self, request: &AssistantRequest) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": &request.system_prompt},
                {"role": "user", "content": request.user_prompt()}
            ],
            "temperature": 0.2
        });

        debug!(model = %self.model, "sending assistant request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.map_transport(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|err| self.map_transport(err))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GatewayError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProgramCatalog;
    use crate::eligibility::{classify_and_rank, EmploymentStatus, HousingStatus, SortPolicy};

    fn profile() -> Profile {
        Profile::new(27, 2800, HousingStatus::NonHomeowner, EmploymentStatus::Employed)
            .expect("valid profile")
    }

    #[test]
    fn context_caps_each_bucket() {
        let catalog = ProgramCatalog::sample();
        let classification =
            classify_and_rank(catalog.programs(), &profile(), SortPolicy::Popularity);
        assert!(classification.fully_eligible.len() > 2);

        let context = AssistantContext::new(&profile(), &classification, 2, &LinkPolicy::default());
        let rendered = context.render();

        assert!(rendered.starts_with(
            "[profile] age=27, income=2800, housing=non-homeowner, employment=employed"
        ));
        assert_eq!(context.fully_eligible.len(), 2);
        assert!(rendered.contains("[near miss]\nnone\n"));
        assert!(rendered.ends_with(CONTEXT_RULES));
    }

    #[test]
    fn gateway_requires_api_key() {
        let err = OpenAiGateway::from_config(&AssistantConfig::default())
            .expect_err("missing key rejected");
        assert!(matches!(err, GatewayError::MissingApiKey));
    }

    #[test]
    fn error_bodies_are_truncated_on_char_boundaries() {
        let long = "오류".repeat(150);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_body("  rate limited \n"), "rate limited");
    }

    #[test]
    fn user_prompt_appends_question() {
        let catalog = ProgramCatalog::sample();
        let classification =
            classify_and_rank(catalog.programs(), &profile(), SortPolicy::Popularity);
        let context = AssistantContext::new(&profile(), &classification, 6, &LinkPolicy::default());

        let request = AssistantRequest::new(&context, "  what documents do I need?  ");

        assert!(request
            .user_prompt()
            .ends_with("\n\nQuestion: what documents do I need?"));
        assert_eq!(request.system_prompt, SYSTEM_PROMPT);
    }
}

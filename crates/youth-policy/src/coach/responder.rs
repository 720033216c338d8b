use std::fmt::Write as _;

use crate::catalog::LinkPolicy;
use crate::eligibility::{Profile, Program, ScoredProgram};

/// Query terms signalling a housing question.
const HOUSING_QUERY_TERMS: [&str; 15] = [
    "무주택",
    "전세",
    "월세",
    "전월세",
    "주거",
    "주택",
    "보증금",
    "청약",
    "임대",
    "housing",
    "home",
    "rent",
    "lease",
    "deposit",
    "subscription",
];

/// Program-name fragments that mark a program as housing related.
const HOUSING_NAME_TERMS: [&str; 8] = [
    "전월세", "전세", "월세", "주거", "주택", "임대", "housing", "rent",
];

const OFFICIAL_NOTICE: &str = "Check the official notice for final eligibility.";
const FOLLOW_LINKS: &str =
    "Follow the links above for the latest notices and required documents.";
const EMPTY_GUIDANCE: [&str; 3] = [
    "Check that annual income is entered correctly (unit: 10,000 KRW).",
    "Check the housing status selection.",
    "Try a different sort order or turn on near-miss results.",
];

/// Follow-up topics recognised in a query, in the order their guidance is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Training,
    Income,
    Application,
}

impl Topic {
    const ALL: [Topic; 3] = [Topic::Training, Topic::Income, Topic::Application];

    fn terms(self) -> &'static [&'static str] {
        match self {
            Topic::Training => &["교육", "자격", "훈련", "training", "course", "certificate"],
            Topic::Income => &["소득", "연봉", "income", "salary"],
            Topic::Application => &["신청", "서류", "방법", "apply", "application", "document"],
        }
    }

    fn guidance(self) -> &'static str {
        match self {
            Topic::Training => {
                "Training and certification: training cards cover course fees and employment \
                 support programs add job-search allowances; check each program's conditions above."
            }
            Topic::Income => {
                "Income tip: enter annual income in 10,000 KRW units; both buckets update from it."
            }
            Topic::Application => {
                "Application checklist: ID, proof of income or employment, a lease contract for \
                 housing programs, a training plan for training programs. Confirm the latest \
                 document list at each program's apply link."
            }
        }
    }

    fn matches(self, query: &str) -> bool {
        self.terms().iter().any(|term| query.contains(term))
    }
}

/// Deterministic reply builder used when no assistant is available.
#[derive(Debug, Clone, Default)]
pub struct KeywordResponder {
    links: LinkPolicy,
}

impl KeywordResponder {
    pub fn new(links: LinkPolicy) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &LinkPolicy {
        &self.links
    }

    /// Direct program lookup wins over everything; otherwise both buckets are
    /// summarized, housing programs first when the query is about housing,
    /// followed by guidance for any training, income, or application topic.
    pub fn respond(
        &self,
        query: &str,
        fully_eligible: &[ScoredProgram],
        near_miss: &[ScoredProgram],
        catalog: &[Program],
        profile: &Profile,
    ) -> String {
        let query = query.trim().to_lowercase();

        if let Some(program) = lookup_program(&query, catalog) {
            return self.program_summary(program);
        }

        let housing = is_housing_query(&query);
        let (fully_eligible, near_miss) = if housing {
            (housing_first(fully_eligible), housing_first(near_miss))
        } else {
            (fully_eligible.iter().collect(), near_miss.iter().collect())
        };

        let mut reply = String::new();
        let _ = writeln!(reply, "Profile: {profile}");
        if housing {
            let _ = writeln!(reply, "Housing-related programs first.");
        }
        reply.push('\n');
        self.write_bucket(&mut reply, "Fully eligible", &fully_eligible, false);
        reply.push('\n');
        self.write_bucket(&mut reply, "Near miss", &near_miss, true);
        reply.push('\n');

        let topics: Vec<Topic> = Topic::ALL
            .into_iter()
            .filter(|topic| topic.matches(&query))
            .collect();
        if !topics.is_empty() {
            for topic in topics {
                let _ = writeln!(reply, "{}", topic.guidance());
            }
            reply.push('\n');
        }

        if fully_eligible.is_empty() && near_miss.is_empty() {
            let _ = writeln!(reply, "No matching programs yet. Things to try:");
            for tip in EMPTY_GUIDANCE {
                let _ = writeln!(reply, "- {tip}");
            }
        } else {
            let _ = writeln!(reply, "{FOLLOW_LINKS}");
        }

        reply.trim_end().to_string()
    }

    fn program_summary(&self, program: &Program) -> String {
        format!(
            "• {} ({})\n  - Benefit: {}\n  - Why it fits: {}\n  - Apply: {}\n{}",
            program.name,
            program.category,
            program.benefit,
            program.why_fit,
            self.links.display(&program.apply_url),
            OFFICIAL_NOTICE
        )
    }

    fn write_bucket(
        &self,
        out: &mut String,
        title: &str,
        entries: &[&ScoredProgram],
        show_failed: bool,
    ) {
        let _ = writeln!(out, "{title} ({})", entries.len());
        if entries.is_empty() {
            let _ = writeln!(out, "- none");
            return;
        }
        for entry in entries {
            let program = &entry.program;
            let _ = writeln!(
                out,
                "- {} ({}): {} | {}",
                program.name,
                program.category,
                program.benefit,
                self.links.display(&program.apply_url)
            );
            if show_failed && !entry.failed.is_empty() {
                let _ = writeln!(out, "  missing: {}", entry.failed.join("; "));
            }
        }
    }
}

/// First catalog entry whose name (with or without spaces) occurs in the
/// normalized query. Order dependent when names overlap.
fn lookup_program<'a>(query: &str, catalog: &'a [Program]) -> Option<&'a Program> {
    if query.is_empty() {
        return None;
    }
    catalog.iter().find(|program| {
        let name = program.name.to_lowercase();
        let compact = name.replace(' ', "");
        (!name.is_empty() && query.contains(&name))
            || (!compact.is_empty() && query.contains(&compact))
    })
}

fn is_housing_query(query: &str) -> bool {
    HOUSING_QUERY_TERMS.iter().any(|term| query.contains(term))
}

fn is_housing_program(program: &Program) -> bool {
    let name = program.name.to_lowercase();
    HOUSING_NAME_TERMS.iter().any(|term| name.contains(term))
}

/// Stable partition: housing programs move to the front, relative order kept.
fn housing_first(entries: &[ScoredProgram]) -> Vec<&ScoredProgram> {
    let (mut front, back): (Vec<&ScoredProgram>, Vec<&ScoredProgram>) = entries
        .iter()
        .partition(|entry| is_housing_program(&entry.program));
    front.extend(back);
    front
}

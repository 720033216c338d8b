use crate::infra::{build_coach, load_catalog};
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use youth_policy::catalog::{CatalogSource, LinkPolicy, ProgramCatalog};
use youth_policy::coach::{ChatSession, CoachMode, CoachQuery};
use youth_policy::config::AppConfig;
use youth_policy::eligibility::{Classification, EligibilityEngine, Profile, ScoredProgram};
use youth_policy::error::AppError;
use youth_policy::telemetry::{self, LogOutput};

#[derive(Args, Debug)]
pub(crate) struct ProfileArgs {
    /// Age in years
    #[arg(long)]
    pub(crate) age: String,
    /// Annual income in 10,000 KRW units
    #[arg(long)]
    pub(crate) income: String,
    /// Housing status: non-homeowner or homeowner
    #[arg(long)]
    pub(crate) housing: String,
    /// Employment status: employed, job-seeking, or self-employed
    #[arg(long)]
    pub(crate) employment: String,
    /// Sort policy: popularity, benefit, or difficulty (defaults to popularity)
    #[arg(long)]
    pub(crate) sort_by: Option<String>,
    /// Program catalog CSV (defaults to APP_CATALOG_PATH, then the built-in sample)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Only print the fully eligible bucket
    #[arg(long)]
    pub(crate) hide_near_miss: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AskArgs {
    /// Question for the coach
    pub(crate) query: String,
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Delegate to the external assistant when an API key is configured
    #[arg(long)]
    pub(crate) assistant: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Program catalog CSV (defaults to APP_CATALOG_PATH, then the built-in sample)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

struct Evaluation {
    engine: EligibilityEngine,
    profile: Profile,
    classification: Classification,
}

fn init_cli(config: &AppConfig) -> Result<(), AppError> {
    telemetry::init(&config.telemetry, LogOutput::Cli)?;
    Ok(())
}

fn evaluate(config: &AppConfig, args: &ProfileArgs) -> Result<Evaluation, AppError> {
    let profile = Profile::parse(&args.age, &args.income, &args.housing, &args.employment)?;
    let catalog = load_catalog(args.catalog.as_deref().or(config.catalog.path.as_deref()));
    let engine = EligibilityEngine::new(Arc::new(catalog));
    let classification = engine.evaluate_named(&profile, args.sort_by.as_deref())?;
    Ok(Evaluation {
        engine,
        profile,
        classification,
    })
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    init_cli(&config)?;

    let evaluation = evaluate(&config, &args.profile)?;
    print!(
        "{}",
        render_classification(
            &evaluation.profile,
            &evaluation.classification,
            !args.hide_near_miss,
            &LinkPolicy::default(),
        )
    );
    Ok(())
}

pub(crate) async fn run_ask(args: AskArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    init_cli(&config)?;

    let evaluation = evaluate(&config, &args.profile)?;
    let coach = build_coach(&config.assistant)?;
    let mut session = ChatSession::new();

    let reply = coach
        .answer(
            &mut session,
            CoachQuery {
                query: &args.query,
                profile: &evaluation.profile,
                classification: &evaluation.classification,
                catalog: evaluation.engine.catalog().programs(),
                use_assistant: args.assistant,
            },
        )
        .await;

    if reply.mode == CoachMode::Rules && args.assistant {
        if let Some(cause) = &reply.fallback_cause {
            eprintln!("note: assistant not used ({cause})");
        }
    }
    println!("{}", reply.text);
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    init_cli(&config)?;

    let catalog = load_catalog(args.catalog.as_deref().or(config.catalog.path.as_deref()));
    print!("{}", render_catalog(&catalog, &LinkPolicy::default()));
    Ok(())
}

pub(crate) fn render_classification(
    profile: &Profile,
    classification: &Classification,
    show_near_miss: bool,
    links: &LinkPolicy,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Input: {profile} | sort: {}", classification.policy);
    let _ = writeln!(out, "Programs evaluated: {}", classification.evaluated);

    let _ = writeln!(
        out,
        "\nFully eligible ({})",
        classification.fully_eligible.len()
    );
    render_bucket(&mut out, &classification.fully_eligible, links, |entry| {
        entry.satisfied.join("; ")
    });

    if show_near_miss {
        let _ = writeln!(out, "\nNear miss ({})", classification.near_miss.len());
        render_bucket(&mut out, &classification.near_miss, links, |entry| {
            format!("missing {}", entry.failed.join("; "))
        });
    }

    out
}

fn render_bucket<F>(out: &mut String, entries: &[ScoredProgram], links: &LinkPolicy, reasons: F)
where
    F: Fn(&ScoredProgram) -> String,
{
    if entries.is_empty() {
        let _ = writeln!(out, "- none");
        return;
    }
    for entry in entries {
        let program = &entry.program;
        let _ = writeln!(
            out,
            "- {} [{}] popularity {}, difficulty {}",
            program.name, program.category, program.popularity, program.difficulty
        );
        let _ = writeln!(out, "  benefit: {}", program.benefit);
        let _ = writeln!(out, "  why: {}", program.why_fit);
        let _ = writeln!(out, "  apply: {}", links.display(&program.apply_url));
        let _ = writeln!(out, "  {}", reasons(entry));
    }
}

pub(crate) fn render_catalog(catalog: &ProgramCatalog, links: &LinkPolicy) -> String {
    let mut out = String::new();
    let source = match catalog.source() {
        CatalogSource::File { path } => format!("file {}", path.display()),
        CatalogSource::BuiltInSample { reason: None } => "built-in sample".to_string(),
        CatalogSource::BuiltInSample {
            reason: Some(reason),
        } => format!("built-in sample (fallback: {reason})"),
        CatalogSource::Inline => "inline".to_string(),
    };
    let _ = writeln!(out, "Catalog: {source}");
    let _ = writeln!(out, "Programs: {}", catalog.len());
    for program in catalog.programs() {
        let _ = writeln!(
            out,
            "- {} [{}] age {}~{}, income cap {}, non-homeowner {}, employment {} | {}",
            program.name,
            program.category,
            program.min_age,
            program.max_age,
            program.max_income,
            if program.needs_non_homeowner {
                "required"
            } else {
                "any"
            },
            if program.employment_required {
                "required"
            } else {
                "any"
            },
            links.display(&program.apply_url)
        );
    }
    out
}

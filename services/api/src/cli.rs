use crate::render::{run_ask, run_catalog, run_match, AskArgs, CatalogArgs, MatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use youth_policy::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Youth Policy Matcher",
    about = "Match a profile against youth-support programs and ask the policy coach",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify the catalog for a profile and print both buckets
    Match(MatchArgs),
    /// Ask the coach one question about the matched programs
    Ask(AskArgs),
    /// List the programs in the active catalog
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Match(args) => run_match(args),
        Command::Ask(args) => run_ask(args).await,
        Command::Catalog(args) => run_catalog(args),
    }
}

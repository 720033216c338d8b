mod cli;
mod infra;
mod render;
mod routes;
mod server;

use youth_policy::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

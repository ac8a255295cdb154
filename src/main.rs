use std::error::Error;

mod telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the process environment may already be set.
    let dotenv = dotenvy::dotenv();

    telemetry::init();

    if let Err(e) = dotenv {
        tracing::debug!(error = %e, ".env not loaded");
    }

    api::start().await?;

    Ok(())
}

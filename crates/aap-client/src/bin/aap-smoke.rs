use std::env;

use eyre::{bail, Result};
use tracing_subscriber::EnvFilter;

use aap_client::client::AapClient;
use aap_client::scenario::{self, CheckReport, ScenarioConfig};
use aap_client::token::token_from_env;

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base_url = env::var("AAP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let client = AapClient::new(&base_url).with_token(token_from_env()?);
    let config = ScenarioConfig::from_env();
    tracing::info!(%base_url, loop_count = config.loop_count, "starting smoke run");

    if !client.health()? {
        bail!("{base_url}/health is not UP");
    }

    let mut report = CheckReport::default();
    report.merge(scenario::create_and_query(&client)?);
    report.merge(scenario::point_in_time(&client, &config)?);

    let total = report.checks.len();
    let failures = report.failures();
    tracing::info!(total, failed = failures.len(), "smoke run finished");
    if !failures.is_empty() {
        bail!("{} of {total} checks failed: {}", failures.len(), failures.join(", "));
    }
    Ok(())
}

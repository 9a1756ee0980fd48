use tracing_subscriber::EnvFilter;

use aap_api::config::{ApiConfig, StoreConfig};
use aap_api::service::AssessmentService;
use aap_api::state::AppState;
use aap_storage::s3::S3EventStore;
use aap_storage::store::EventStore;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ApiConfig::from_env()?;

    let store = match &config.store {
        StoreConfig::Memory => EventStore::memory(),
        StoreConfig::S3 { bucket, endpoint } => {
            let s3 = aap_storage::client::build_client(endpoint.as_deref()).await;
            EventStore::S3(S3EventStore::new(s3, bucket.clone()))
        }
    };
    tracing::info!(store = store.backend(), "event store ready");

    let verifier = config.verifier()?;
    if verifier.is_none() {
        tracing::warn!("authentication disabled; every request runs as anonymous");
    }

    let app = aap_api::router(AppState::new(AssessmentService::new(store), verifier));

    if config.lambda {
        return lambda_http::run(app).await.map_err(|e| eyre::eyre!(e));
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ledgerlens::api::api_router;
use ledgerlens::config::{self, ExtractionSettings};
use ledgerlens::pipeline::client::OpenAiChatClient;
use ledgerlens::pipeline::orchestrator::{AnalyzerConfig, StatementAnalyzer};

// The extraction client is blocking and builds its own transport, so the
// analyzer is assembled before the async runtime starts.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let settings = ExtractionSettings::from_env()?;
    info!(
        app = config::APP_NAME,
        version = config::APP_VERSION,
        model = %settings.model,
        "starting analysis server"
    );

    let client = OpenAiChatClient::new(
        &settings.base_url,
        &settings.api_key,
        &settings.model,
        settings.timeout_secs,
    )?;
    let analyzer = Arc::new(StatementAnalyzer::new(client, AnalyzerConfig::default()));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(analyzer, settings.port))
}

async fn serve(
    analyzer: Arc<StatementAnalyzer<OpenAiChatClient>>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = api_router(analyzer);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

// Events API server

use tokio::net::TcpListener;
use tracing::info;

use events_service::{api::create_router, app_state::AppState, config::ApiConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ApiConfig::from_env()?;
    let address = config.server.address();
    info!(
        dialect = ?config.database.dialect(),
        connect_timeout_secs = config.database.connect_timeout_secs,
        "loaded configuration"
    );

    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(&address).await?;
    info!(%address, "events API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// Events website server

use tokio::net::TcpListener;
use tracing::info;

use events_service::{
    config::WebsiteConfig,
    logging,
    website::{create_router, WebsiteState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = WebsiteConfig::from_env()?;
    let address = config.server.address();
    let app = create_router(WebsiteState::new(&config)?);

    let listener = TcpListener::bind(&address).await?;
    info!(%address, api_url = %config.api_url, "events website listening");
    axum::serve(listener, app).await?;

    Ok(())
}

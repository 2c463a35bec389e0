// Provision the events database, retrying while the server comes up

use tracing::info;

use events_service::{
    config::InitializerConfig,
    data_seeder::{run_with_retry, RetryPolicy},
    logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = InitializerConfig::from_env()?;
    let policy = RetryPolicy::from_config(&config);
    info!(
        database = %config.database.database,
        max_attempts = policy.max_attempts,
        "initializing database"
    );

    run_with_retry(&config, &policy).await?;
    info!("database ready");
    Ok(())
}

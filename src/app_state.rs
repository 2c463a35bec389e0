use std::sync::Arc;
use crate::{config::ApiConfig, repository::EventRepository};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<EventRepository>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        let repository = Arc::new(EventRepository::new(&config.database));
        Self { repository, config }
    }

    pub fn with_repository(config: ApiConfig, repository: EventRepository) -> Self {
        Self {
            repository: Arc::new(repository),
            config,
        }
    }
}

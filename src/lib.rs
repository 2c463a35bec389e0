// Events service - REST API, website and database initializer over one repository

// Configuration and shared state
pub mod app_state;
pub mod config;
pub mod logging;

// Data model and storage
pub mod infrastructure;
pub mod models;
pub mod repository;

// HTTP surfaces
pub mod api;
pub mod website;

// Database provisioning
pub mod data_seeder;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use repository::EventRepository;

// Storage infrastructure
pub mod store;            // EventStore trait, StoreError, Served
pub mod connection;       // Per-operation connection provider
pub mod likes;            // Like counter protocol
pub mod schema;           // DDL and seed rows
pub mod relational_store; // MySQL/SQLite backed store
pub mod memory_store;     // Seeded in-memory mock store

pub use connection::{Acquired, ConnectionProvider};
pub use likes::LikeChange;
pub use memory_store::InMemoryStore;
pub use relational_store::RelationalStore;
pub use store::{EventStore, Served, StoreError, StoreKind, StoreResult};

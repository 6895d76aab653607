pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod service;

pub use connection::{connect, connect_in_memory, connect_with_settings, DbPool};
pub use fixtures::{CatalogSeedDataset, SeedCheck, SeedResult, VerificationResult};
pub use service::CatalogService;

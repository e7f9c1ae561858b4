pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{remove_seed_components, seed_components, SeedComponent, SEED_COMPONENTS};
pub use repositories::{RepositoryError, SqlComponentCatalog, SqlRecommendationStore};

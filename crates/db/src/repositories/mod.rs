use thiserror::Error;

pub mod component;
pub mod recommendation;

pub use component::SqlComponentCatalog;
pub use recommendation::SqlRecommendationStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

use crate::model::ModelId;
use thiserror::Error;

/// Failures from the relational store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("product {0} not found")]
    ProductNotFound(ModelId),

    #[error("invalid row data: {0}")]
    InvalidRow(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures from the cache adapter. These never reach clients: the
/// orchestrator degrades them to a forced cache miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Operation-level errors surfaced to the HTTP layer, which maps them
/// to status codes. Raw store causes are logged there, not leaked.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Order not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

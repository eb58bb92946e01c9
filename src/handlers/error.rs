//! Handler failure type.

use thiserror::Error;

use crate::storage::StoreError;

/// Anything that can go wrong inside a route handler.
///
/// The executor logs these with the route as context and answers the client
/// with the generic 500 body; the message never leaves the process.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Message(String),

    #[error("invalid request body: {0}")]
    Body(String),

    #[error("missing storage handle for route")]
    MissingStore,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }
}

//! Transport boundary
//!
//! The client core never opens connections. It hands a command name and its
//! ordered arguments to a [`Transport`] and gets back one untyped wire value
//! or a failure. Connection management, pooling, and retries all live behind
//! this trait; cancellation is ordinary future cancellation, passed straight
//! through because the core never spawns tasks or imposes timeouts.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::wire::Value;

/// Failure raised by a transport implementation
///
/// Transport failures pass through the client unchanged; the core never
/// retries and never wraps them in a domain error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established or was lost
    #[error("connection error: {0}")]
    Connection(String),

    /// Underlying IO failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure of the underlying client library
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wrap an arbitrary client-library error
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TransportError::Other(err.into())
    }
}

/// Executes one command against the server
///
/// Implementations must represent server errors attached to individual
/// reply elements as [`Value::Error`] so batch replies keep their
/// per-element outcomes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `command` with `args` and return the raw reply
    async fn call(&self, command: &str, args: Vec<Value>) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, command: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        (**self).call(command, args).await
    }
}

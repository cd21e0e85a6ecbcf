//! Error types for Omega

use crate::protocol::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("shared state poisoned: {component}")]
    StatePoisoned { component: String },

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn state_poisoned(component: impl Into<String>) -> Self {
        Self::StatePoisoned {
            component: component.into(),
        }
    }

    /// JSON-RPC error code reported to clients.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::InvalidParams(_) => INVALID_PARAMS,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::StatePoisoned { .. } | Self::JsonError(_) => INTERNAL_ERROR,
        }
    }
}

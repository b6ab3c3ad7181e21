// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transient transport failure, including timeouts. Callers may retry.
    #[error("Network error: {0}")]
    Network(String),
    #[error("The requested message or conversation does not exist.")]
    NotFound,
    #[error("The action is not allowed for this user or message.")]
    Forbidden,
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use thiserror::Error;

use crate::domain::messaging::services::StoreError;
use crate::domain::shared::models::MessageId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("The conversation has not finished loading.")]
    NotReady,
    #[error("The conversation was archived.")]
    Closed,
    #[error("No user is signed in.")]
    NoViewer,
    #[error("Message {0} is not part of the loaded conversation.")]
    UnknownMessage(MessageId),
    #[error("The current user is not allowed to perform this action.")]
    NotAllowed,
    #[error("A message needs text or at least one attachment.")]
    EmptyContent,
}

impl ConversationError {
    /// True for failures that may succeed when attempted again unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConversationError::Store(err) => err.is_retryable(),
            _ => false,
        }
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::shared::models::{ConversationId, UserId};
use crate::domain::typing::models::TypingSignal;

pub type TypingListener = Box<dyn Fn(TypingSignal) + Send + Sync>;

/// Keeps a typing subscription alive. Dropping it unsubscribes.
pub struct TypingSubscription {
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl TypingSubscription {
    pub fn new(on_drop: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(on_drop)),
        }
    }

    pub fn detached() -> Self {
        Self { on_drop: None }
    }
}

impl Drop for TypingSubscription {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop()
        }
    }
}

/// Low-level presence channel keyed by conversation. Delivery is best-effort.
#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait TypingTransport: Send + Sync {
    async fn publish_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
        is_typing: bool,
    ) -> Result<()>;

    fn subscribe_typing(
        &self,
        conversation_id: &ConversationId,
        listener: TypingListener,
    ) -> TypingSubscription;
}

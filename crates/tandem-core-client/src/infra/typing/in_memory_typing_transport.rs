// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use anyhow::{format_err, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::shared::models::{ConversationId, UserId};
use crate::domain::typing::models::TypingSignal;
use crate::domain::typing::services::{TypingListener, TypingSubscription, TypingTransport};

type Listeners = HashMap<ConversationId, Vec<(u64, Arc<TypingListener>)>>;

/// Pub/sub hub that delivers typing signals to every listener of a conversation, including
/// the publisher's own listeners.
#[derive(Default)]
pub struct InMemoryTypingTransport {
    listeners: Arc<Mutex<Listeners>>,
    next_listener_id: AtomicU64,
    published: Mutex<Vec<TypingSignal>>,
    publish_failure: Mutex<Option<String>>,
}

impl InMemoryTypingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All signals published so far, in order.
    pub fn published(&self) -> Vec<TypingSignal> {
        self.published.lock().clone()
    }

    /// Makes publishing fail with `message` until reset with `None`.
    pub fn set_publish_failure(&self, message: Option<String>) {
        *self.publish_failure.lock() = message;
    }

    pub fn listener_count(&self, conversation_id: &ConversationId) -> usize {
        self.listeners
            .lock()
            .get(conversation_id)
            .map(Vec::len)
            .unwrap_or_default()
    }
}

#[async_trait]
impl TypingTransport for InMemoryTypingTransport {
    async fn publish_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
        is_typing: bool,
    ) -> Result<()> {
        if let Some(message) = self.publish_failure.lock().clone() {
            return Err(format_err!(message));
        }

        let signal = TypingSignal {
            conversation_id: conversation_id.clone(),
            user_id: user_id.clone(),
            is_typing,
        };
        self.published.lock().push(signal.clone());

        // Listeners are called without holding the lock so that they can unsubscribe.
        let listeners = self
            .listeners
            .lock()
            .get(conversation_id)
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|(_, listener)| listener.clone())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        for listener in listeners {
            (*listener)(signal.clone())
        }

        Ok(())
    }

    fn subscribe_typing(
        &self,
        conversation_id: &ConversationId,
        listener: TypingListener,
    ) -> TypingSubscription {
        let listener_id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);

        self.listeners
            .lock()
            .entry(conversation_id.clone())
            .or_default()
            .push((listener_id, Arc::new(listener)));

        let listeners: Weak<Mutex<Listeners>> = Arc::downgrade(&self.listeners);
        let conversation_id = conversation_id.clone();

        TypingSubscription::new(move || {
            let Some(listeners) = listeners.upgrade() else {
                return;
            };
            let mut listeners = listeners.lock();
            if let Some(conversation_listeners) = listeners.get_mut(&conversation_id) {
                conversation_listeners.retain(|(id, _)| *id != listener_id);
                if conversation_listeners.is_empty() {
                    listeners.remove(&conversation_id);
                }
            }
        })
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::app::deps::{DynIdProvider, DynTimeProvider};
use crate::domain::messaging::models::{
    Emoji, Message, MessageReaction, MessageType, SendMessageRequest,
};
use crate::domain::messaging::services::{MessageStore, StoreError};
use crate::domain::shared::models::{ConversationId, MessageId, ReactionId, SenderRole, UserId};
use crate::util::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    ListMessages,
    Send,
    Edit,
    Delete,
    AddReaction,
    RemoveReaction,
    MarkAllRead,
}

/// Process-local `MessageStore`. Failures and latency can be injected per operation.
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<Message>>,
    id_provider: DynIdProvider,
    time_provider: DynTimeProvider,
    failures: Mutex<HashMap<StoreOperation, VecDeque<StoreError>>>,
    latencies: Mutex<HashMap<StoreOperation, Duration>>,
    list_response_delay: Mutex<Option<Duration>>,
    calls: Mutex<HashMap<StoreOperation, usize>>,
}

impl InMemoryMessageStore {
    pub fn new(id_provider: DynIdProvider, time_provider: DynTimeProvider) -> Self {
        Self {
            messages: Default::default(),
            id_provider,
            time_provider,
            failures: Default::default(),
            latencies: Default::default(),
            list_response_delay: Default::default(),
            calls: Default::default(),
        }
    }

    /// Inserts or replaces messages as they are, e.g. history created by other clients.
    pub fn insert(&self, messages: impl IntoIterator<Item = Message>) {
        let mut stored = self.messages.write();
        for message in messages {
            match stored.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => *existing = message,
                None => stored.push(message),
            }
        }
    }

    pub fn message(&self, message_id: &MessageId) -> Option<Message> {
        self.messages
            .read()
            .iter()
            .find(|m| &m.id == message_id)
            .cloned()
    }

    /// Makes the next call of `operation` fail with `error`. Multiple failures are
    /// returned in the order in which they were registered.
    pub fn fail_next(&self, operation: StoreOperation, error: StoreError) {
        self.failures
            .lock()
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delays every call of `operation` before it touches any state.
    pub fn set_latency(&self, operation: StoreOperation, latency: Duration) {
        self.latencies.lock().insert(operation, latency);
    }

    /// Delays the response of `list_messages` after its snapshot was taken, so that the
    /// caller receives a list that may be outdated by then.
    pub fn set_list_response_delay(&self, delay: Option<Duration>) {
        *self.list_response_delay.lock() = delay;
    }

    pub fn call_count(&self, operation: StoreOperation) -> usize {
        self.calls.lock().get(&operation).copied().unwrap_or_default()
    }

    /// Sets `delivered_at` on every message in the conversation that was not sent by
    /// `recipient_role`, as the recipient's client would on receipt.
    pub fn mark_all_delivered(&self, conversation_id: &ConversationId, recipient_role: SenderRole) {
        let now = self.time_provider.now();
        self.messages
            .write()
            .iter_mut()
            .filter(|m| &m.conversation_id == conversation_id && m.sender_role != recipient_role)
            .for_each(|m| m.mark_delivered(now));
    }

    async fn begin(&self, operation: StoreOperation) -> Result<(), StoreError> {
        *self.calls.lock().entry(operation).or_default() += 1;

        let latency = self.latencies.lock().get(&operation).copied();
        if let Some(latency) = latency {
            sleep(latency).await;
        }

        match self
            .failures
            .lock()
            .get_mut(&operation)
            .and_then(|failures| failures.pop_front())
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn with_message<T>(
        &self,
        message_id: &MessageId,
        f: impl FnOnce(&mut Message) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut messages = self.messages.write();
        let message = messages
            .iter_mut()
            .find(|m| &m.id == message_id)
            .ok_or(StoreError::NotFound)?;
        f(message)
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        self.begin(StoreOperation::ListMessages).await?;

        let mut messages = self
            .messages
            .read()
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect::<Vec<_>>();
        Message::sort_for_display(&mut messages);

        let response_delay = *self.list_response_delay.lock();
        if let Some(delay) = response_delay {
            sleep(delay).await;
        }

        Ok(messages)
    }

    async fn send(&self, request: SendMessageRequest) -> Result<Message, StoreError> {
        self.begin(StoreOperation::Send).await?;

        let mut messages = self.messages.write();

        if let Some(reply_to_id) = &request.reply_to_id {
            let target_exists = messages
                .iter()
                .any(|m| &m.id == reply_to_id && m.conversation_id == request.conversation_id);
            if !target_exists {
                return Err(StoreError::Validation(format!(
                    "Reply target {reply_to_id} is not part of conversation {}.",
                    request.conversation_id
                )));
            }
        }

        let message = Message {
            id: self.id_provider.new_id().into(),
            conversation_id: request.conversation_id,
            sender_id: request.sender_id,
            sender_role: request.sender_role,
            content: request.content,
            r#type: MessageType::Text,
            reply_to_id: request.reply_to_id,
            sent_at: self.time_provider.now(),
            delivered_at: None,
            read_at: None,
            edited_at: None,
            deleted_at: None,
            reactions: vec![],
            attachments: vec![],
        };

        debug!("Stored message {} in {}", message.id, message.conversation_id);
        messages.push(message.clone());
        Ok(message)
    }

    async fn edit(
        &self,
        message_id: &MessageId,
        editor_id: &UserId,
        content: String,
    ) -> Result<Message, StoreError> {
        self.begin(StoreOperation::Edit).await?;

        let now = self.time_provider.now();
        self.with_message(message_id, |message| {
            if !message.is_mutable_by(editor_id) {
                return Err(StoreError::Forbidden);
            }
            message.content = content;
            message.edited_at = Some(now);
            Ok(message.clone())
        })
    }

    async fn delete(&self, message_id: &MessageId, user_id: &UserId) -> Result<(), StoreError> {
        self.begin(StoreOperation::Delete).await?;

        let now = self.time_provider.now();
        self.with_message(message_id, |message| {
            if !message.is_from(user_id) || message.is_system() {
                return Err(StoreError::Forbidden);
            }
            if message.deleted_at.is_none() {
                message.deleted_at = Some(now);
            }
            Ok(())
        })
    }

    async fn add_reaction(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<MessageReaction, StoreError> {
        self.begin(StoreOperation::AddReaction).await?;

        let reaction_id = ReactionId::from(self.id_provider.new_id());
        self.with_message(message_id, |message| {
            if message.is_deleted() {
                return Err(StoreError::Forbidden);
            }

            if let Some(existing) = message
                .reactions
                .iter()
                .find(|r| r.matches(message_id, user_id, emoji))
            {
                return Ok(existing.clone());
            }

            let reaction = MessageReaction {
                id: reaction_id,
                message_id: message_id.clone(),
                user_id: user_id.clone(),
                emoji: emoji.clone(),
            };
            message.reactions.push(reaction.clone());
            Ok(reaction)
        })
    }

    async fn remove_reaction(&self, reaction_id: &ReactionId) -> Result<(), StoreError> {
        self.begin(StoreOperation::RemoveReaction).await?;

        let mut messages = self.messages.write();
        for message in messages.iter_mut() {
            if let Some(idx) = message.reactions.iter().position(|r| &r.id == reaction_id) {
                message.reactions.remove(idx);
                return Ok(());
            }
        }
        Err(StoreError::NotFound)
    }

    async fn mark_all_read(
        &self,
        conversation_id: &ConversationId,
        viewer_role: SenderRole,
    ) -> Result<(), StoreError> {
        self.begin(StoreOperation::MarkAllRead).await?;

        let now = self.time_provider.now();
        self.messages
            .write()
            .iter_mut()
            .filter(|m| &m.conversation_id == conversation_id && m.sender_role != viewer_role)
            .for_each(|m| m.mark_read(now));
        Ok(())
    }
}

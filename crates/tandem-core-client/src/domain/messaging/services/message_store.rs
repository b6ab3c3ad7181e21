// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;

use crate::domain::messaging::models::{Emoji, Message, MessageReaction, SendMessageRequest};
use crate::domain::shared::models::{ConversationId, MessageId, ReactionId, SenderRole, UserId};

use super::StoreError;

/// Typed façade over the persistence service. This is the only channel to the authoritative
/// copy of messages and reactions.
#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait MessageStore: Send + Sync {
    /// Returns the messages of a conversation ordered by `sent_at`, ties broken by id.
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Message>, StoreError>;

    /// Persists a new message. Resubmitting a request creates another message.
    async fn send(&self, request: SendMessageRequest) -> Result<Message, StoreError>;

    /// Fails with `Forbidden` if `editor_id` did not send the message or it was deleted.
    async fn edit(
        &self,
        message_id: &MessageId,
        editor_id: &UserId,
        content: String,
    ) -> Result<Message, StoreError>;

    /// Soft-deletes a message. Deleting an already deleted message succeeds.
    async fn delete(&self, message_id: &MessageId, user_id: &UserId) -> Result<(), StoreError>;

    /// Adding the same emoji twice for the same user returns the existing reaction.
    async fn add_reaction(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
        emoji: &Emoji,
    ) -> Result<MessageReaction, StoreError>;

    async fn remove_reaction(&self, reaction_id: &ReactionId) -> Result<(), StoreError>;

    /// Marks every message not sent by `viewer_role` as read (and delivered, if needed).
    async fn mark_all_read(
        &self,
        conversation_id: &ConversationId,
        viewer_role: SenderRole,
    ) -> Result<(), StoreError>;
}

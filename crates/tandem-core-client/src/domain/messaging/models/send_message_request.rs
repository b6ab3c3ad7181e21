// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::shared::models::{ConversationId, MessageId, SenderRole, UserId};

/// A message draft as handed to the store. The store assigns `id` and `sent_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessageRequest {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub sender_role: SenderRole,
    pub content: String,
    pub reply_to_id: Option<MessageId>,
    pub mentions: Vec<UserId>,
}

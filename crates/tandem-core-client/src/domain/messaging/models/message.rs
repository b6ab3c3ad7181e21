// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tandem_utils::id_string;

use crate::domain::shared::models::{ConversationId, MessageId, SenderRole, UserId};
use crate::domain::uploads::models::Attachment;

use super::MessageReaction;

id_string!(Emoji);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    System,
}

/// Delivery progress of a message as seen by its sender. Derived entirely from the
/// timestamps on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeliveryState {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub sender_role: SenderRole,
    pub content: String,
    pub r#type: MessageType,
    pub reply_to_id: Option<MessageId>,
    pub sent_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reactions: Vec<MessageReaction>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some() && !self.is_deleted()
    }

    pub fn is_system(&self) -> bool {
        self.r#type == MessageType::System
    }

    pub fn is_from(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id
    }

    /// Edits and deletions are reserved for the sender of a message that still exists.
    pub fn is_mutable_by(&self, user_id: &UserId) -> bool {
        self.is_from(user_id) && !self.is_deleted() && !self.is_system()
    }

    pub fn delivery_state(&self) -> DeliveryState {
        if self.read_at.is_some() {
            DeliveryState::Read
        } else if self.delivered_at.is_some() {
            DeliveryState::Delivered
        } else {
            DeliveryState::Sent
        }
    }

    /// Sets `delivered_at` unless it was set before.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>) {
        if self.delivered_at.is_none() {
            self.delivered_at = Some(at);
        }
    }

    /// Sets `read_at` unless it was set before. A read message is always delivered as well.
    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        self.mark_delivered(at);
        if self.read_at.is_none() {
            self.read_at = Some(at);
        }
    }

    /// Display order: `sent_at` ascending with the id as a deterministic tiebreak.
    pub fn display_order(lhs: &Message, rhs: &Message) -> Ordering {
        lhs.sent_at
            .cmp(&rhs.sent_at)
            .then_with(|| lhs.id.cmp(&rhs.id))
    }

    pub fn sort_for_display(messages: &mut [Message]) {
        messages.sort_by(Message::display_order)
    }
}

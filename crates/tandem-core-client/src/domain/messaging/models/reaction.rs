// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::{Deserialize, Serialize};

use crate::domain::shared::models::{MessageId, ReactionId, UserId};

use super::Emoji;

/// A single emoji reaction. The store keeps at most one reaction per
/// (message, user, emoji) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageReaction {
    pub id: ReactionId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: Emoji,
}

impl MessageReaction {
    pub fn matches(&self, message_id: &MessageId, user_id: &UserId, emoji: &Emoji) -> bool {
        &self.message_id == message_id && &self.user_id == user_id && &self.emoji == emoji
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::shared::models::MessageId;

use super::MessageBubble;

/// Opaque reference to a rendered row, supplied by the host when a row is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineItem {
    DaySeparator {
        date: NaiveDate,
    },
    /// System messages render as centered, neutral banners instead of bubbles.
    SystemBanner {
        message_id: MessageId,
        text: String,
        sent_at: DateTime<Utc>,
    },
    Message(Box<MessageBubble>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    pub items: Vec<TimelineItem>,
    pub show_typing_indicator: bool,
}

impl Timeline {
    pub fn bubbles(&self) -> impl Iterator<Item = &MessageBubble> {
        self.items.iter().filter_map(|item| match item {
            TimelineItem::Message(bubble) => Some(bubble.as_ref()),
            _ => None,
        })
    }

    pub fn bubble(&self, message_id: &MessageId) -> Option<&MessageBubble> {
        self.bubbles()
            .find(|bubble| &bubble.message_id == message_id)
    }
}

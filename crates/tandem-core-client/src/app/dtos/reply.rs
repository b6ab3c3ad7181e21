// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::conversations::models::Conversation;
use crate::domain::messaging::models::Message;
use crate::domain::shared::models::MessageId;
use crate::util::StringExt;

use super::message_bubble::render_mentions;

/// Lightweight projection of the message a draft is replying to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub message_id: MessageId,
    pub snippet: String,
    /// "You" if the viewer sent the message, otherwise the sender's display name.
    pub sender_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub message_id: MessageId,
    pub original_content: String,
}

/// How the quoted message of a reply is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyQuote {
    Resolved {
        message_id: MessageId,
        snippet: String,
        sender_name: String,
    },
    /// The quoted message was soft-deleted after the reply was sent.
    Deleted {
        message_id: MessageId,
        sender_name: String,
    },
    /// The quoted message is not part of the loaded messages.
    Unresolved { message_id: MessageId },
}

impl ReplyQuote {
    pub fn message_id(&self) -> &MessageId {
        match self {
            ReplyQuote::Resolved { message_id, .. }
            | ReplyQuote::Deleted { message_id, .. }
            | ReplyQuote::Unresolved { message_id } => message_id,
        }
    }
}

/// Short single-line preview of a message for reply targets and quotes. Messages without
/// text are previewed by their first attachment.
pub(crate) fn message_snippet(
    message: &Message,
    conversation: &Conversation,
    max_chars: usize,
) -> String {
    if message.content.trim().is_empty() {
        if let Some(attachment) = message.attachments.first() {
            return format!("📎 {}", attachment.file_name).snippet(max_chars);
        }
    }
    render_mentions(&message.content, conversation)
        .0
        .snippet(max_chars)
}

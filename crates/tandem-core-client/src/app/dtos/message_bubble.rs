// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use url::Url;

use crate::domain::conversations::models::Conversation;
use crate::domain::messaging::models::{
    parse_mentions, DeliveryState, Emoji, Message, MessageReaction,
};
use crate::domain::shared::models::{MessageId, ReactionId, UserId};
use crate::domain::uploads::models::Attachment;

use super::ReplyQuote;

pub const DELETED_MESSAGE_PLACEHOLDER: &str = "This message was deleted.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleBody {
    Text {
        /// Content with mention tokens replaced by `@Display Name`.
        text: String,
        mentions: Vec<UserId>,
    },
    Deleted {
        placeholder: String,
    },
}

/// Check mark rendering of the delivery state of an own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryIndicator {
    pub state: DeliveryState,
    pub check_marks: u8,
    pub is_emphasized: bool,
}

impl From<DeliveryState> for DeliveryIndicator {
    fn from(state: DeliveryState) -> Self {
        let (check_marks, is_emphasized) = match state {
            DeliveryState::Sent => (1, false),
            DeliveryState::Delivered => (2, false),
            DeliveryState::Read => (2, true),
        };
        Self {
            state,
            check_marks,
            is_emphasized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionSummary {
    pub emoji: Emoji,
    pub user_ids: Vec<UserId>,
    /// Set if the viewer is among `user_ids`. Needed to remove the reaction again.
    pub viewer_reaction_id: Option<ReactionId>,
}

impl ReactionSummary {
    pub fn count(&self) -> usize {
        self.user_ids.len()
    }

    pub fn has_viewer_reacted(&self) -> bool {
        self.viewer_reaction_id.is_some()
    }
}

/// Presentation state of a single message, derived from the message entity only.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBubble {
    pub message_id: MessageId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub sent_at: DateTime<Utc>,
    pub body: BubbleBody,
    pub is_own: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub is_edited: bool,
    /// Only present on the viewer's own messages.
    pub delivery: Option<DeliveryIndicator>,
    pub reactions: Vec<ReactionSummary>,
    pub attachments: Vec<Attachment>,
    pub link_previews: Vec<Url>,
    pub reply: Option<ReplyQuote>,
    pub is_first_in_group: bool,
    pub is_last_in_group: bool,
    pub is_highlighted: bool,
}

impl MessageBubble {
    /// Without a `viewer_id` no message is treated as the viewer's own.
    pub fn new(message: &Message, viewer_id: Option<&UserId>, conversation: &Conversation) -> Self {
        let is_own = viewer_id.is_some_and(|id| message.is_from(id));
        let is_deleted = message.is_deleted();

        let body = if is_deleted {
            BubbleBody::Deleted {
                placeholder: DELETED_MESSAGE_PLACEHOLDER.to_string(),
            }
        } else {
            render_body(&message.content, conversation)
        };

        let (reactions, attachments, link_previews) = if is_deleted {
            (vec![], vec![], vec![])
        } else {
            (
                summarize_reactions(&message.reactions, viewer_id),
                message.attachments.clone(),
                extract_links(&message.content),
            )
        };

        Self {
            message_id: message.id.clone(),
            sender_id: message.sender_id.clone(),
            sender_name: conversation.display_name(&message.sender_id, message.sender_role),
            sent_at: message.sent_at,
            body,
            is_own,
            can_edit: is_own && !is_deleted,
            can_delete: is_own && !is_deleted,
            is_edited: message.is_edited(),
            delivery: is_own.then(|| message.delivery_state().into()),
            reactions,
            attachments,
            link_previews,
            reply: None,
            is_first_in_group: true,
            is_last_in_group: true,
            is_highlighted: false,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.body, BubbleBody::Deleted { .. })
    }
}

fn render_body(content: &str, conversation: &Conversation) -> BubbleBody {
    let (text, mentions) = render_mentions(content, conversation);
    BubbleBody::Text { text, mentions }
}

/// Replaces mention tokens with `@Display Name` and returns the mentioned users.
pub(crate) fn render_mentions(content: &str, conversation: &Conversation) -> (String, Vec<UserId>) {
    let spans = parse_mentions(content);
    let mut text = content.to_string();

    // Back to front so that earlier ranges stay valid.
    for span in spans.iter().rev() {
        let name = conversation
            .participant(&span.user_id)
            .map(|participant| participant.display_name.as_str())
            .unwrap_or(span.user_id.as_str());
        text.replace_range(span.range.clone(), &format!("@{name}"));
    }

    (text, spans.into_iter().map(|span| span.user_id).collect())
}

/// Groups reactions by emoji in the order in which each emoji first appeared.
fn summarize_reactions(
    reactions: &[MessageReaction],
    viewer_id: Option<&UserId>,
) -> Vec<ReactionSummary> {
    let mut summaries = IndexMap::<Emoji, ReactionSummary>::new();

    for reaction in reactions {
        let summary = summaries
            .entry(reaction.emoji.clone())
            .or_insert_with(|| ReactionSummary {
                emoji: reaction.emoji.clone(),
                user_ids: vec![],
                viewer_reaction_id: None,
            });

        if summary.user_ids.contains(&reaction.user_id) {
            continue;
        }

        summary.user_ids.push(reaction.user_id.clone());
        if viewer_id == Some(&reaction.user_id) {
            summary.viewer_reaction_id = Some(reaction.id.clone());
        }
    }

    summaries.into_values().collect()
}

fn extract_links(content: &str) -> Vec<Url> {
    let mut links = Vec::<Url>::new();

    for word in content.split_whitespace() {
        let candidate = word
            .trim_start_matches(['(', '<', '[', '"', '\''])
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '>', ']', '"', '\'']);

        if !(candidate.starts_with("http://") || candidate.starts_with("https://")) {
            continue;
        }

        let Ok(url) = Url::parse(candidate) else {
            continue;
        };

        if !links.contains(&url) {
            links.push(url);
        }
    }

    links
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use crate::domain::conversations::models::{Conversation, LinkedTopic, Participant};
pub use crate::domain::messaging::models::{
    DeliveryState, Emoji, MentionUser, Message, MessageReaction, MessageType,
};
pub use crate::domain::shared::models::{
    AttachmentId, ConversationId, MessageId, ReactionId, SenderRole, StagedFileId, TopicId,
    UserId, Viewer,
};
pub use crate::domain::uploads::models::{
    Attachment, AttachmentPolicy, LocalFile, StagedAttachment, UploadHandle,
};

pub use composer_input::{ComposerKey, KeyAction, MentionSuggestions};
pub use conversation_phase::ConversationPhase;
pub use message_bubble::{BubbleBody, DeliveryIndicator, MessageBubble, ReactionSummary};
pub use reply::{EditTarget, ReplyQuote, ReplyTarget};
pub(crate) use reply::message_snippet;
pub use timeline::{RenderHandle, ScrollBehavior, Timeline, TimelineItem};

mod composer_input;
mod conversation_phase;
mod message_bubble;
mod reply;
mod timeline;

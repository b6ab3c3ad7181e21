// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::app::dtos::ConversationPhase;
use crate::app::services::AttachmentOutcome;
use crate::domain::shared::models::MessageId;

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// The conversation moved between Closed, Loading and Ready.
    PhaseChanged { phase: ConversationPhase },

    /// The message list was (re-)derived from the store. Hosts should re-render the
    /// timeline.
    MessagesChanged,

    /// The first send was queued or the last queued send settled.
    SendingChanged { is_sending: bool },

    /// The counterpart started or stopped typing.
    CounterpartTypingChanged { is_typing: bool },

    /// The uploads staged with a sent message settled. Failed uploads are reported per
    /// file; the message itself stays sent.
    AttachmentsProcessed {
        message_id: MessageId,
        outcomes: Vec<AttachmentOutcome>,
    },

    /// The reply target or the message being edited changed.
    ComposerContextChanged,

    /// A message was highlighted after scrolling to it, or the highlight was cleared.
    HighlightChanged { message_id: Option<MessageId> },

    /// The conversation was closed. `archived` is true if it was closed by archiving it.
    ConversationClosed { archived: bool },
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use attachment_pipeline::{AttachmentOutcome, AttachmentPipeline, StagingReport};
pub use composer::{Composer, SubmitOutcome};
pub use conversation_controller::{ConversationController, ReactionToggle, SendDraft};
pub use errors::ConversationError;
pub use mention_autocomplete::{AcceptedMention, MentionAutocomplete};
pub use timeline_renderer::{DynScrollTarget, MessageScroller, ScrollTarget, TimelineRenderer};
pub use typing_indicator::TypingIndicator;
pub use typing_signal_channel::TypingSignalChannel;

mod attachment_pipeline;
mod composer;
mod conversation_controller;
mod errors;
mod mention_autocomplete;
mod timeline_renderer;
mod typing_indicator;
mod typing_signal_channel;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::timeline_renderer::MockScrollTarget;
}

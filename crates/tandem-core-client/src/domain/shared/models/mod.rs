// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use ids::{AttachmentId, ConversationId, MessageId, ReactionId, StagedFileId, TopicId, UserId};
pub use viewer::{SenderRole, Viewer};

mod ids;
mod viewer;

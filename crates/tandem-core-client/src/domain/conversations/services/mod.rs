// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use conversation_archive_service::ConversationArchiveService;

mod conversation_archive_service;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::conversation_archive_service::MockConversationArchiveService;
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;

use crate::domain::messaging::services::StoreError;
use crate::domain::shared::models::ConversationId;

#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait ConversationArchiveService: Send + Sync {
    async fn archive_conversation(&self, conversation_id: &ConversationId)
        -> Result<(), StoreError>;
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::conversations::services::ConversationArchiveService;
use crate::domain::messaging::services::StoreError;
use crate::domain::shared::models::ConversationId;

#[derive(Default)]
pub struct InMemoryArchiveService {
    archived: Mutex<Vec<ConversationId>>,
    failure: Mutex<Option<StoreError>>,
}

impl InMemoryArchiveService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_archived(&self, conversation_id: &ConversationId) -> bool {
        self.archived.lock().contains(conversation_id)
    }

    pub fn fail_next(&self, error: StoreError) {
        *self.failure.lock() = Some(error);
    }
}

#[async_trait]
impl ConversationArchiveService for InMemoryArchiveService {
    async fn archive_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(), StoreError> {
        if let Some(error) = self.failure.lock().take() {
            return Err(error);
        }

        let mut archived = self.archived.lock();
        if !archived.contains(conversation_id) {
            archived.push(conversation_id.clone());
        }
        Ok(())
    }
}

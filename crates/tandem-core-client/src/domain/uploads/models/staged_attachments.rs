// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::shared::models::StagedFileId;

use super::{LocalFile, StagingError};

#[derive(Debug, Clone, PartialEq)]
pub struct StagedAttachment {
    pub id: StagedFileId,
    pub file: LocalFile,
}

/// Files attached to the draft that is currently being composed.
///
/// The list is bounded. Staging past the limit is refused; nothing that was staged earlier
/// is ever evicted to make room.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedAttachments {
    items: Vec<StagedAttachment>,
    limit: usize,
}

impl StagedAttachments {
    pub fn new(limit: usize) -> Self {
        Self {
            items: vec![],
            limit,
        }
    }

    pub fn stage(&mut self, attachment: StagedAttachment) -> Result<(), StagingError> {
        if self.items.len() >= self.limit {
            return Err(StagingError::LimitReached {
                limit: self.limit,
                file_name: attachment.file.file_name,
            });
        }
        self.items.push(attachment);
        Ok(())
    }

    pub fn remove(&mut self, id: &StagedFileId) -> Option<StagedAttachment> {
        let idx = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Removes all attachments whose id is contained in `ids`. Attachments staged after
    /// `ids` was captured are kept.
    pub fn remove_all(&mut self, ids: &[StagedFileId]) {
        self.items.retain(|item| !ids.contains(&item.id))
    }

    pub fn clear(&mut self) {
        self.items.clear()
    }

    pub fn items(&self) -> &[StagedAttachment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

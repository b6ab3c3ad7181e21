// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map};

use crate::app::deps::DynIdProvider;
use crate::domain::shared::models::MessageId;
use crate::domain::uploads::models::{Attachment, LocalFile, UploadError, UploadHandle};
use crate::domain::uploads::services::AttachmentService;
use crate::util::sleep;

/// Keeps uploaded files and linked attachments in memory. Failures are injected per file
/// name and consumed by the next matching call.
pub struct InMemoryAttachmentService {
    id_provider: DynIdProvider,
    upload_latency: Mutex<Option<Duration>>,
    upload_failures: Mutex<HashMap<String, UploadError>>,
    link_failures: Mutex<HashMap<String, UploadError>>,
    uploads: Mutex<Vec<UploadHandle>>,
    attachments: Mutex<Vec<Attachment>>,
}

impl InMemoryAttachmentService {
    pub fn new(id_provider: DynIdProvider) -> Self {
        Self {
            id_provider,
            upload_latency: Default::default(),
            upload_failures: Default::default(),
            link_failures: Default::default(),
            uploads: Default::default(),
            attachments: Default::default(),
        }
    }

    pub fn fail_upload(&self, file_name: impl Into<String>, error: UploadError) {
        self.upload_failures.lock().insert(file_name.into(), error);
    }

    pub fn fail_link(&self, file_name: impl Into<String>, error: UploadError) {
        self.link_failures.lock().insert(file_name.into(), error);
    }

    pub fn set_upload_latency(&self, latency: Option<Duration>) {
        *self.upload_latency.lock() = latency;
    }

    pub fn uploads(&self) -> Vec<UploadHandle> {
        self.uploads.lock().clone()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.lock().clone()
    }

    pub fn attachments_for_message(&self, message_id: &MessageId) -> Vec<Attachment> {
        self.attachments
            .lock()
            .iter()
            .filter(|a| &a.message_id == message_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AttachmentService for InMemoryAttachmentService {
    async fn upload_file(&self, file: &LocalFile) -> Result<UploadHandle, UploadError> {
        let latency = *self.upload_latency.lock();
        if let Some(latency) = latency {
            sleep(latency).await;
        }

        if let Some(error) = self.upload_failures.lock().remove(&file.file_name) {
            return Err(error);
        }

        let storage_path = format!("uploads/{}/{}", self.id_provider.new_id(), file.file_name);
        let is_image = file.media_type.type_() == mime::IMAGE;

        let handle = UploadHandle {
            thumbnail_path: is_image.then(|| format!("{storage_path}.thumbnail")),
            storage_path,
            file_name: file.file_name.clone(),
            media_type: file.media_type.clone(),
            file_size: file.file_size,
            metadata: Map::from_iter([(
                "source_path".to_string(),
                json!(file.path.to_string_lossy()),
            )]),
        };

        self.uploads.lock().push(handle.clone());
        Ok(handle)
    }

    async fn link_attachment(
        &self,
        message_id: &MessageId,
        handle: &UploadHandle,
    ) -> Result<Attachment, UploadError> {
        if let Some(error) = self.link_failures.lock().remove(&handle.file_name) {
            return Err(error);
        }

        let attachment = Attachment {
            id: self.id_provider.new_id().into(),
            message_id: message_id.clone(),
            file_name: handle.file_name.clone(),
            file_type: handle.media_type.clone(),
            file_size: handle.file_size,
            storage_path: handle.storage_path.clone(),
            thumbnail_path: handle.thumbnail_path.clone(),
            metadata: handle.metadata.clone(),
        };

        self.attachments.lock().push(attachment.clone());
        Ok(attachment)
    }
}

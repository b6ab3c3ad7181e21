// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;

use crate::domain::shared::models::MessageId;
use crate::domain::uploads::models::{Attachment, LocalFile, UploadError, UploadHandle};

/// Attachment storage. Uploading and linking are separate steps since a file is uploaded
/// before the message it belongs to necessarily exists.
#[async_trait]
#[cfg_attr(feature = "test", mockall::automock)]
pub trait AttachmentService: Send + Sync {
    async fn upload_file(&self, file: &LocalFile) -> Result<UploadHandle, UploadError>;

    async fn link_attachment(
        &self,
        message_id: &MessageId,
        handle: &UploadHandle,
    ) -> Result<Attachment, UploadError>;
}

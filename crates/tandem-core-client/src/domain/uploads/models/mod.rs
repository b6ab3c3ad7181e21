// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use attachment::Attachment;
pub use attachment_policy::AttachmentPolicy;
pub use errors::{AttachmentValidationError, StagingError, UploadError};
pub use local_file::LocalFile;
pub use staged_attachments::{StagedAttachment, StagedAttachments};
pub use upload_handle::UploadHandle;

mod attachment;
mod attachment_policy;
mod errors;
mod local_file;
mod staged_attachments;
mod upload_handle;

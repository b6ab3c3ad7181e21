// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentValidationError {
    #[error("'{file_name}' has an unsupported file type ({media_type}).")]
    UnsupportedMediaType {
        file_name: String,
        media_type: String,
    },
    #[error("'{file_name}' exceeds the maximum file size of {max_file_size} bytes.")]
    FileTooLarge {
        file_name: String,
        file_size: u64,
        max_file_size: u64,
    },
    #[error("'{file_name}' is empty.")]
    EmptyFile { file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    #[error("Cannot stage '{file_name}': at most {limit} files can be attached to a message.")]
    LimitReached { limit: usize, file_name: String },
    #[error(transparent)]
    Invalid(#[from] AttachmentValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("The upload was rejected: {0}")]
    Rejected(String),
    #[error("The upload was cancelled.")]
    Cancelled,
}

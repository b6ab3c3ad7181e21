// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use mime::Mime;
use serde::Deserialize;

use super::{AttachmentValidationError, LocalFile};

/// Local, I/O-free rules a file must satisfy before it can be staged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttachmentPolicy {
    /// Accepted media types. Entries may use a `type/*` wildcard.
    pub allowed_media_types: Vec<String>,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            allowed_media_types: [
                "image/*",
                "application/pdf",
                "text/plain",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/vnd.ms-excel",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "application/zip",
            ]
            .into_iter()
            .map(ToString::to_string)
            .collect(),
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl AttachmentPolicy {
    pub fn validate(&self, file: &LocalFile) -> Result<(), AttachmentValidationError> {
        if file.file_size == 0 {
            return Err(AttachmentValidationError::EmptyFile {
                file_name: file.file_name.clone(),
            });
        }

        if file.file_size > self.max_file_size {
            return Err(AttachmentValidationError::FileTooLarge {
                file_name: file.file_name.clone(),
                file_size: file.file_size,
                max_file_size: self.max_file_size,
            });
        }

        if !self.allows(&file.media_type) {
            return Err(AttachmentValidationError::UnsupportedMediaType {
                file_name: file.file_name.clone(),
                media_type: file.media_type.essence_str().to_string(),
            });
        }

        Ok(())
    }

    fn allows(&self, media_type: &Mime) -> bool {
        self.allowed_media_types.iter().any(|allowed| {
            match allowed.strip_suffix("/*") {
                Some(top_level) => media_type.type_().as_str().eq_ignore_ascii_case(top_level),
                None => media_type.essence_str().eq_ignore_ascii_case(allowed),
            }
        })
    }
}

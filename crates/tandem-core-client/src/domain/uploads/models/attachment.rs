// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use mime::Mime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::shared::models::{AttachmentId, MessageId};
use crate::util::mime_serde_shim;

/// A file that was uploaded and linked to its owning message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub message_id: MessageId,
    pub file_name: String,
    #[serde(with = "mime_serde_shim")]
    pub file_type: Mime,
    pub file_size: u64,
    pub storage_path: String,
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.file_type.type_() == mime::IMAGE
    }
}

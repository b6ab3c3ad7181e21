// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use mime::Mime;
use serde_json::{Map, Value};

/// Storage reference returned for an uploaded file that is not yet linked to a message.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadHandle {
    pub storage_path: String,
    pub thumbnail_path: Option<String>,
    pub file_name: String,
    pub media_type: Mime,
    pub file_size: u64,
    pub metadata: Map<String, Value>,
}

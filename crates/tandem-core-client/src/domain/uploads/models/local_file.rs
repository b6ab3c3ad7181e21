// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::path::PathBuf;

use mime::Mime;

use crate::util::PathExt;

/// A file picked by the user, described without reading its contents.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: Mime,
    pub file_size: u64,
}

impl LocalFile {
    /// Derives the file name and media type from `path`.
    pub fn new(path: impl Into<PathBuf>, file_size: u64) -> Self {
        let path = path.into();
        let file_name = path.file_name_lossy();
        let media_type = path.media_type();

        Self {
            path,
            file_name,
            media_type,
            file_size,
        }
    }

    pub fn with_media_type(mut self, media_type: Mime) -> Self {
        self.media_type = media_type;
        self
    }
}

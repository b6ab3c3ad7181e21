// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::path::Path;

use mime::Mime;

pub trait PathExt {
    fn media_type(&self) -> Mime;
    fn file_name_lossy(&self) -> String;
}

impl PathExt for Path {
    // https://github.com/abonander/mime_guess/issues/88
    fn media_type(&self) -> Mime {
        let media_type = mime_guess::from_path(self).first_or(mime::APPLICATION_OCTET_STREAM);

        if media_type.type_() == mime::AUDIO && media_type.subtype() == "m4a" {
            if let Ok(mp4) = "audio/mp4".parse() {
                return mp4;
            }
        }

        media_type
    }

    fn file_name_lossy(&self) -> String {
        self.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.to_string_lossy().into_owned())
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt;
use std::str::FromStr;

use mime::Mime;
use serde::{de, Deserializer, Serializer};

pub fn serialize<S>(mime: &Mime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(mime.as_ref())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Mime, D::Error>
where
    D: Deserializer<'de>,
{
    struct MimeVisitor;

    impl<'de> de::Visitor<'de> for MimeVisitor {
        type Value = Mime;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a media type such as 'image/png'")
        }

        fn visit_str<E>(self, value: &str) -> Result<Mime, E>
        where
            E: de::Error,
        {
            Mime::from_str(value).map_err(|err| E::custom(format!("invalid media type: {err}")))
        }
    }

    deserializer.deserialize_str(MimeVisitor)
}

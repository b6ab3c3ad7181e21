// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub(crate) use join_all::join_all;
pub(crate) use path_ext::PathExt;
pub(crate) use runtime::{sleep, sleep_until, spawn};
pub(crate) use string_ext::StringExt;

mod join_all;
pub(crate) mod mime_serde_shim;
mod path_ext;
mod runtime;
mod string_ext;

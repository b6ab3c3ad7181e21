// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;

mod id_provider;
mod time_provider;

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use system_time_provider::SystemTimeProvider;
pub use uuid_provider::UuidProvider;

mod system_time_provider;
mod uuid_provider;

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use message_store::MessageStore;
pub use store_error::StoreError;

mod message_store;
mod store_error;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::message_store::MockMessageStore;
}

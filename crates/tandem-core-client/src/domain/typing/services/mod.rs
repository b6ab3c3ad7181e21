// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use typing_transport::{TypingListener, TypingSubscription, TypingTransport};

mod typing_transport;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::typing_transport::MockTypingTransport;
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use app::dtos;
pub use app::services;
pub use chat_event::ChatEvent;
pub use client::{ChatClient, ChatDelegate, OpenConversation};
pub use client_builder::ChatClientBuilder;

#[cfg(any(test, feature = "test"))]
pub mod test;

pub mod app;
mod chat_event;
mod client;
mod client_builder;
pub mod domain;
pub mod infra;

pub(crate) mod util;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::client::MockChatDelegate;
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use mention::{format_mention, parse_mentions, MentionSpan, MentionUser};
pub use message::{DeliveryState, Emoji, Message, MessageType};
pub use reaction::MessageReaction;
pub use send_message_request::SendMessageRequest;

mod mention;
mod message;
mod reaction;
mod send_message_request;

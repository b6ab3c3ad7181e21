// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use tracing::trace;

use crate::domain::shared::models::ConversationId;
use crate::{ChatDelegate, ChatEvent};

/// Forwards events to the host's delegate, if one was registered.
pub struct ChatEventDispatcher {
    delegate: Option<Box<dyn ChatDelegate>>,
}

impl ChatEventDispatcher {
    pub fn new(delegate: Option<Box<dyn ChatDelegate>>) -> Self {
        Self { delegate }
    }

    pub fn dispatch_event(&self, conversation_id: &ConversationId, event: ChatEvent) {
        let Some(ref delegate) = self.delegate else {
            return;
        };

        trace!("Dispatching {:?} for conversation {}", event, conversation_id);
        delegate.handle_event(conversation_id.clone(), event)
    }
}

impl Default for ChatEventDispatcher {
    fn default() -> Self {
        Self::new(None)
    }
}

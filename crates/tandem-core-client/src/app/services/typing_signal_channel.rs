// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::app::deps::{DynTimeProvider, DynTypingTransport};
use crate::domain::shared::models::{ConversationId, UserId};
use crate::domain::typing::models::{TypingEdge, TypingStateMachine};
use crate::util::{sleep_until, spawn};

/// Publishes the local user's typing state for one conversation.
///
/// Only edges of the Idle/Typing state machine are published. Publishing happens on a
/// single background task so that signals arrive in the order they were produced.
pub struct TypingSignalChannel {
    inner: Arc<TypingSignalChannelInner>,
}

struct TypingSignalChannelInner {
    state: Mutex<TypingStateMachine>,
    edges: mpsc::UnboundedSender<TypingEdge>,
    time_provider: DynTimeProvider,
}

impl TypingSignalChannel {
    pub fn new(
        conversation_id: ConversationId,
        user_id: UserId,
        idle_timeout: chrono::Duration,
        transport: DynTypingTransport,
        time_provider: DynTimeProvider,
    ) -> Self {
        let (edges, mut receiver) = mpsc::unbounded_channel::<TypingEdge>();

        spawn(async move {
            while let Some(edge) = receiver.recv().await {
                let is_typing = edge.is_typing();
                debug!("Publishing typing={is_typing} for {conversation_id}");

                if let Err(err) = transport
                    .publish_typing(&conversation_id, &user_id, is_typing)
                    .await
                {
                    warn!("Failed to publish typing state in {conversation_id}. {err}");
                }
            }
        });

        Self {
            inner: Arc::new(TypingSignalChannelInner {
                state: Mutex::new(TypingStateMachine::new(idle_timeout)),
                edges,
                time_provider,
            }),
        }
    }

    /// Registers composer input. Starts typing if idle and restarts the silence timer.
    pub fn handle_input(&self) {
        let (outcome, idle_timeout) = {
            let mut state = self.inner.state.lock();
            let outcome = state.handle_input(self.inner.time_provider.now());
            (outcome, state.idle_timeout())
        };

        if let Some(edge) = outcome.edge {
            self.inner.emit(edge);
        }

        let inner = self.inner.clone();
        let deadline = Instant::now() + idle_timeout.to_std().unwrap_or_default();

        spawn(async move {
            sleep_until(deadline).await;
            let edge = inner.state.lock().expire(outcome.token);
            if let Some(edge) = edge {
                inner.emit(edge);
            }
        });
    }

    /// Forces the transition to idle, e.g. after sending or discarding the draft.
    pub fn stop(&self) {
        let edge = self.inner.state.lock().stop();
        if let Some(edge) = edge {
            self.inner.emit(edge);
        }
    }

    pub fn is_typing(&self) -> bool {
        self.inner.state.lock().is_typing()
    }
}

impl Drop for TypingSignalChannel {
    fn drop(&mut self) {
        self.stop()
    }
}

impl TypingSignalChannelInner {
    fn emit(&self, edge: TypingEdge) {
        // Only fails once the publishing task is gone, i.e. the runtime shut down.
        if self.edges.send(edge).is_err() {
            debug!("Dropping typing edge {edge:?}");
        }
    }
}

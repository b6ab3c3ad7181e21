// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::{Arc, Weak};

use itertools::Itertools;
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::app::deps::{
    AppDependencies, DynAppContext, DynChatEventDispatcher, DynConversationArchiveService,
    DynMessageStore, DynTimeProvider, DynTypingTransport,
};
use crate::app::dtos::{message_snippet, ConversationPhase, EditTarget, ReplyTarget};
use crate::domain::conversations::models::Conversation;
use crate::domain::messaging::models::{
    parse_mentions, Emoji, MentionUser, Message, MessageReaction, SendMessageRequest,
};
use crate::domain::shared::models::{ConversationId, MessageId, ReactionId, Viewer};
use crate::domain::typing::models::TypingSignal;
use crate::domain::typing::services::TypingSubscription;
use crate::util::{sleep_until, spawn};
use crate::ChatEvent;

use super::{AttachmentOutcome, ConversationError, TypingIndicator};

type Result<T, E = ConversationError> = std::result::Result<T, E>;

/// How often `refresh` fetches again when local changes landed during a fetch before it
/// falls back to merging.
const MAX_REFRESH_ATTEMPTS: usize = 3;

/// What the composer hands to the controller on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendDraft {
    pub content: String,
    pub reply_to_id: Option<MessageId>,
    /// Messages without text are allowed if files will be attached to them.
    pub has_attachments: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionToggle {
    Added(MessageReaction),
    Removed(ReactionId),
}

/// Owns the state of one open conversation. All mutations are forwarded to the message
/// store and the local message list is re-derived from what the store returns.
///
/// Sends are queued per conversation and executed one after another in the order in which
/// they were requested.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    conversation_id: ConversationId,
    state: RwLock<ControllerState>,
    send_queue: tokio::sync::Mutex<()>,
    typing_subscription: Mutex<Option<TypingSubscription>>,

    archive_service: DynConversationArchiveService,
    ctx: DynAppContext,
    event_dispatcher: DynChatEventDispatcher,
    message_store: DynMessageStore,
    time_provider: DynTimeProvider,
    typing_transport: DynTypingTransport,
}

struct ControllerState {
    conversation: Conversation,
    phase: ConversationPhase,
    messages: Vec<Message>,
    /// Bumped by every local change of `messages` outside of a full reload.
    list_generation: u64,
    pending_sends: usize,
    reply_target: Option<ReplyTarget>,
    edit_target: Option<EditTarget>,
    typing_indicator: TypingIndicator,
    is_archived: bool,
}

impl ConversationController {
    pub fn new(conversation: Conversation, deps: &AppDependencies) -> Self {
        let typing_indicator = TypingIndicator::new(
            conversation.counterpart.id.clone(),
            deps.ctx.config.typing_indicator_max_display(),
        );

        let inner = ControllerInner {
            conversation_id: conversation.id.clone(),
            state: RwLock::new(ControllerState {
                is_archived: conversation.is_archived(),
                conversation,
                phase: ConversationPhase::Closed,
                messages: vec![],
                list_generation: 0,
                pending_sends: 0,
                reply_target: None,
                edit_target: None,
                typing_indicator,
            }),
            send_queue: Default::default(),
            typing_subscription: Default::default(),
            archive_service: deps.archive_service.clone(),
            ctx: deps.ctx.clone(),
            event_dispatcher: deps.event_dispatcher.clone(),
            message_store: deps.message_store.clone(),
            time_provider: deps.time_provider.clone(),
            typing_transport: deps.typing_transport.clone(),
        };

        Self {
            inner: Arc::new(inner),
        }
    }
}

impl ConversationController {
    pub fn conversation_id(&self) -> &ConversationId {
        &self.inner.conversation_id
    }

    pub fn conversation(&self) -> Conversation {
        self.inner.state.read().conversation.clone()
    }

    pub fn phase(&self) -> ConversationPhase {
        self.inner.state.read().phase
    }

    pub fn is_archived(&self) -> bool {
        self.inner.state.read().is_archived
    }

    /// The loaded messages in display order.
    pub fn messages(&self) -> Vec<Message> {
        self.inner.state.read().messages.clone()
    }

    pub fn message(&self, message_id: &MessageId) -> Option<Message> {
        self.inner
            .state
            .read()
            .messages
            .iter()
            .find(|m| &m.id == message_id)
            .cloned()
    }

    /// True while at least one send is queued or in flight.
    pub fn is_sending(&self) -> bool {
        self.inner.state.read().pending_sends > 0
    }

    pub fn reply_target(&self) -> Option<ReplyTarget> {
        self.inner.state.read().reply_target.clone()
    }

    pub fn edit_target(&self) -> Option<EditTarget> {
        self.inner.state.read().edit_target.clone()
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.inner.ctx.viewer()
    }

    /// Whether the viewer may write into this conversation at all.
    pub fn can_compose(&self) -> bool {
        let Some(viewer) = self.viewer() else {
            return false;
        };
        let state = self.inner.state.read();
        !state.is_archived && state.conversation.can_compose(&viewer)
    }

    pub fn is_counterpart_typing(&self) -> bool {
        let now = self.inner.time_provider.now();
        self.inner.state.read().typing_indicator.is_visible(now)
    }

    pub fn mention_users(&self) -> Vec<MentionUser> {
        let state = self.inner.state.read();
        match self.viewer() {
            Some(viewer) => state.conversation.mention_users(&viewer),
            None => vec![],
        }
    }
}

impl ConversationController {
    /// Loads the messages (Closed → Loading → Ready), subscribes to the counterpart's typing
    /// signal and marks the conversation as read in the background.
    pub async fn open(&self) -> Result<()> {
        {
            let mut state = self.inner.state.write();
            if state.is_archived {
                return Err(ConversationError::Closed);
            }
            if state.phase != ConversationPhase::Closed {
                return Ok(());
            }
            state.phase = ConversationPhase::Loading;
        }

        info!("Opening conversation {}…", self.inner.conversation_id);
        self.dispatch(ChatEvent::PhaseChanged {
            phase: ConversationPhase::Loading,
        });

        let messages = match self
            .inner
            .message_store
            .list_messages(&self.inner.conversation_id)
            .await
        {
            Ok(messages) => messages,
            Err(err) => {
                warn!(
                    "Failed to load conversation {}. {err}",
                    self.inner.conversation_id
                );
                self.inner.state.write().phase = ConversationPhase::Closed;
                self.dispatch(ChatEvent::PhaseChanged {
                    phase: ConversationPhase::Closed,
                });
                return Err(err.into());
            }
        };

        {
            let mut state = self.inner.state.write();
            // The conversation was closed while loading.
            if state.phase != ConversationPhase::Loading {
                return Ok(());
            }
            state.messages = messages;
            Message::sort_for_display(&mut state.messages);
            state.phase = ConversationPhase::Ready;
        }

        debug!(
            "Loaded {} messages in {}",
            self.inner.state.read().messages.len(),
            self.inner.conversation_id
        );
        self.dispatch(ChatEvent::PhaseChanged {
            phase: ConversationPhase::Ready,
        });
        self.dispatch(ChatEvent::MessagesChanged);

        self.subscribe_to_typing();

        if self.viewer().is_some() {
            self.mark_all_read_in_background();
        }

        Ok(())
    }

    /// Re-fetches the message list from the store.
    ///
    /// If the local list changed while a snapshot was being fetched, the list is fetched
    /// again. After `MAX_REFRESH_ATTEMPTS` the last snapshot is kept together with the local
    /// messages it does not contain yet.
    pub async fn refresh(&self) -> Result<()> {
        self.ensure_ready()?;

        let mut attempt = 1;
        loop {
            let generation = self.inner.state.read().list_generation;

            let mut messages = self
                .inner
                .message_store
                .list_messages(&self.inner.conversation_id)
                .await?;

            {
                let mut state = self.inner.state.write();
                if state.phase != ConversationPhase::Ready {
                    return Ok(());
                }

                if state.list_generation != generation {
                    if attempt < MAX_REFRESH_ATTEMPTS {
                        debug!(
                            "Messages in {} changed while reloading. Fetching again…",
                            self.inner.conversation_id
                        );
                        attempt += 1;
                        continue;
                    }

                    let unknown = state
                        .messages
                        .iter()
                        .filter(|local| !messages.iter().any(|m| m.id == local.id))
                        .cloned()
                        .collect_vec();
                    messages.extend(unknown);
                }

                Message::sort_for_display(&mut messages);
                state.messages = messages;
            }

            self.dispatch(ChatEvent::MessagesChanged);
            return Ok(());
        }
    }

    /// Marks every message of the other party as read and reloads the list.
    pub async fn mark_all_read(&self) -> Result<()> {
        self.ensure_ready()?;
        let viewer = self.require_viewer()?;

        self.inner
            .message_store
            .mark_all_read(&self.inner.conversation_id, viewer.role)
            .await?;
        self.refresh().await
    }

    pub async fn request_send(&self, draft: SendDraft) -> Result<Message> {
        self.ensure_ready()?;
        let viewer = self.require_viewer()?;

        if !self.can_compose() {
            return Err(ConversationError::NotAllowed);
        }

        let content = draft.content.trim().to_string();
        if content.is_empty() && !draft.has_attachments {
            return Err(ConversationError::EmptyContent);
        }

        let request = SendMessageRequest {
            conversation_id: self.inner.conversation_id.clone(),
            sender_id: viewer.id,
            sender_role: viewer.role,
            mentions: parse_mentions(&content)
                .into_iter()
                .map(|span| span.user_id)
                .unique()
                .collect(),
            content,
            reply_to_id: draft.reply_to_id,
        };

        let _pending = PendingSend::new(self);
        let _turn = self.inner.send_queue.lock().await;

        debug!("Sending message in {}…", self.inner.conversation_id);
        let message = self.inner.message_store.send(request).await?;
        self.upsert_message(message.clone());

        Ok(message)
    }

    pub async fn request_edit(&self, message_id: &MessageId, content: String) -> Result<Message> {
        self.ensure_ready()?;
        let viewer = self.require_viewer()?;

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ConversationError::EmptyContent);
        }

        let message = self
            .inner
            .message_store
            .edit(message_id, &viewer.id, content)
            .await?;
        self.upsert_message(message.clone());

        let cleared_edit_target = {
            let mut state = self.inner.state.write();
            let is_target = state
                .edit_target
                .as_ref()
                .is_some_and(|target| &target.message_id == message_id);
            if is_target {
                state.edit_target = None;
            }
            is_target
        };
        if cleared_edit_target {
            self.dispatch(ChatEvent::ComposerContextChanged);
        }

        Ok(message)
    }

    /// Soft-deletes a message and reloads the list to pick up the deletion.
    pub async fn request_delete(&self, message_id: &MessageId) -> Result<()> {
        self.ensure_ready()?;
        let viewer = self.require_viewer()?;

        self.inner
            .message_store
            .delete(message_id, &viewer.id)
            .await?;

        let context_changed = {
            let mut state = self.inner.state.write();
            let mut changed = false;
            if state
                .reply_target
                .as_ref()
                .is_some_and(|target| &target.message_id == message_id)
            {
                state.reply_target = None;
                changed = true;
            }
            if state
                .edit_target
                .as_ref()
                .is_some_and(|target| &target.message_id == message_id)
            {
                state.edit_target = None;
                changed = true;
            }
            changed
        };
        if context_changed {
            self.dispatch(ChatEvent::ComposerContextChanged);
        }

        self.refresh().await
    }

    pub async fn request_react(&self, message_id: &MessageId, emoji: Emoji) -> Result<MessageReaction> {
        self.ensure_ready()?;
        let viewer = self.require_viewer()?;

        let reaction = self
            .inner
            .message_store
            .add_reaction(message_id, &viewer.id, &emoji)
            .await?;

        let changed = {
            let mut guard = self.inner.state.write();
            let state = &mut *guard;
            match state.messages.iter_mut().find(|m| &m.id == message_id) {
                Some(message) if !message.reactions.iter().any(|r| r.id == reaction.id) => {
                    message.reactions.push(reaction.clone());
                    state.list_generation += 1;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.dispatch(ChatEvent::MessagesChanged);
        }

        Ok(reaction)
    }

    pub async fn request_unreact(&self, reaction_id: &ReactionId) -> Result<()> {
        self.ensure_ready()?;

        self.inner
            .message_store
            .remove_reaction(reaction_id)
            .await?;

        let changed = {
            let mut state = self.inner.state.write();
            let mut changed = false;
            for message in state.messages.iter_mut() {
                let count = message.reactions.len();
                message.reactions.retain(|r| &r.id != reaction_id);
                changed |= message.reactions.len() != count;
            }
            if changed {
                state.list_generation += 1;
            }
            changed
        };
        if changed {
            self.dispatch(ChatEvent::MessagesChanged);
        }

        Ok(())
    }

    /// Removes the viewer's `emoji` reaction from the message if present, adds it otherwise.
    pub async fn toggle_reaction(&self, message_id: &MessageId, emoji: Emoji) -> Result<ReactionToggle> {
        self.ensure_ready()?;
        let viewer = self.require_viewer()?;

        let existing_reaction_id = {
            let state = self.inner.state.read();
            let message = state
                .messages
                .iter()
                .find(|m| &m.id == message_id)
                .ok_or_else(|| ConversationError::UnknownMessage(message_id.clone()))?;
            message
                .reactions
                .iter()
                .find(|r| r.user_id == viewer.id && r.emoji == emoji)
                .map(|r| r.id.clone())
        };

        match existing_reaction_id {
            Some(reaction_id) => {
                self.request_unreact(&reaction_id).await?;
                Ok(ReactionToggle::Removed(reaction_id))
            }
            None => Ok(ReactionToggle::Added(
                self.request_react(message_id, emoji).await?,
            )),
        }
    }

    /// Archives the conversation. Archiving is terminal; the controller cannot be opened
    /// again afterwards.
    pub async fn archive(&self) -> Result<()> {
        if self.is_archived() {
            return Err(ConversationError::Closed);
        }

        self.inner
            .archive_service
            .archive_conversation(&self.inner.conversation_id)
            .await?;

        let now = self.inner.time_provider.now();
        {
            let mut state = self.inner.state.write();
            state.is_archived = true;
            state.conversation.archived_at = Some(now);
        }

        info!("Archived conversation {}", self.inner.conversation_id);
        self.tear_down(true);
        Ok(())
    }

    /// Closes the view. The conversation can be opened again.
    pub fn close(&self) {
        if self.phase() == ConversationPhase::Closed {
            return;
        }
        info!("Closing conversation {}", self.inner.conversation_id);
        self.tear_down(false);
    }
}

impl ConversationController {
    pub fn set_reply_target(&self, message_id: &MessageId) -> Result<ReplyTarget> {
        self.ensure_ready()?;
        let viewer = self.viewer();
        let snippet_length = self.inner.ctx.config.reply_snippet_length;

        let target = {
            let mut state = self.inner.state.write();
            let message = state
                .messages
                .iter()
                .find(|m| &m.id == message_id)
                .ok_or_else(|| ConversationError::UnknownMessage(message_id.clone()))?;

            if message.is_deleted() || message.is_system() {
                return Err(ConversationError::NotAllowed);
            }

            let sender_name = match &viewer {
                Some(viewer) => state.conversation.display_name_for_viewer(
                    &viewer.id,
                    &message.sender_id,
                    message.sender_role,
                ),
                None => state
                    .conversation
                    .display_name(&message.sender_id, message.sender_role),
            };

            let target = ReplyTarget {
                message_id: message.id.clone(),
                snippet: message_snippet(message, &state.conversation, snippet_length),
                sender_name,
            };

            state.reply_target = Some(target.clone());
            state.edit_target = None;
            target
        };

        self.dispatch(ChatEvent::ComposerContextChanged);
        Ok(target)
    }

    pub fn clear_reply_target(&self) {
        let had_target = self.inner.state.write().reply_target.take().is_some();
        if had_target {
            self.dispatch(ChatEvent::ComposerContextChanged);
        }
    }

    /// Clears the reply target only if it still points to `message_id`.
    pub(crate) fn clear_reply_target_if(&self, message_id: &MessageId) {
        let cleared = {
            let mut state = self.inner.state.write();
            let matches = state
                .reply_target
                .as_ref()
                .is_some_and(|target| &target.message_id == message_id);
            if matches {
                state.reply_target = None;
            }
            matches
        };
        if cleared {
            self.dispatch(ChatEvent::ComposerContextChanged);
        }
    }

    /// Enters edit mode for one of the viewer's own messages.
    pub fn begin_edit(&self, message_id: &MessageId) -> Result<EditTarget> {
        self.ensure_ready()?;
        let viewer = self.require_viewer()?;

        let target = {
            let mut state = self.inner.state.write();
            let message = state
                .messages
                .iter()
                .find(|m| &m.id == message_id)
                .ok_or_else(|| ConversationError::UnknownMessage(message_id.clone()))?;

            if !message.is_mutable_by(&viewer.id) {
                return Err(ConversationError::NotAllowed);
            }

            let target = EditTarget {
                message_id: message.id.clone(),
                original_content: message.content.clone(),
            };
            state.edit_target = Some(target.clone());
            state.reply_target = None;
            target
        };

        self.dispatch(ChatEvent::ComposerContextChanged);
        Ok(target)
    }

    pub fn cancel_edit(&self) {
        let had_target = self.inner.state.write().edit_target.take().is_some();
        if had_target {
            self.dispatch(ChatEvent::ComposerContextChanged);
        }
    }

    /// Adds the attachments that were linked to `message_id` and reports the outcome of
    /// every file to the delegate.
    pub fn apply_attachment_outcomes(&self, message_id: &MessageId, outcomes: &[AttachmentOutcome]) {
        let changed = {
            let mut state = self.inner.state.write();
            let mut changed = false;

            if let Some(message) = state.messages.iter_mut().find(|m| &m.id == message_id) {
                for attachment in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
                    if !message.attachments.iter().any(|a| a.id == attachment.id) {
                        message.attachments.push(attachment.clone());
                        changed = true;
                    }
                }
            }
            if changed {
                state.list_generation += 1;
            }
            changed
        };

        if changed {
            self.dispatch(ChatEvent::MessagesChanged);
        }
        self.dispatch(ChatEvent::AttachmentsProcessed {
            message_id: message_id.clone(),
            outcomes: outcomes.to_vec(),
        });
    }
}

impl ConversationController {
    fn dispatch(&self, event: ChatEvent) {
        self.inner
            .event_dispatcher
            .dispatch_event(&self.inner.conversation_id, event)
    }

    fn ensure_ready(&self) -> Result<()> {
        let state = self.inner.state.read();
        if state.is_archived {
            return Err(ConversationError::Closed);
        }
        if state.phase != ConversationPhase::Ready {
            return Err(ConversationError::NotReady);
        }
        Ok(())
    }

    fn require_viewer(&self) -> Result<Viewer> {
        self.viewer().ok_or(ConversationError::NoViewer)
    }

    fn upsert_message(&self, message: Message) {
        {
            let mut state = self.inner.state.write();
            if state.phase != ConversationPhase::Ready {
                return;
            }
            match state.messages.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => *existing = message,
                None => state.messages.push(message),
            }
            Message::sort_for_display(&mut state.messages);
            state.list_generation += 1;
        }
        self.dispatch(ChatEvent::MessagesChanged);
    }

    fn mark_all_read_in_background(&self) {
        let controller = self.clone();
        spawn(async move {
            if let Err(err) = controller.mark_all_read().await {
                warn!(
                    "Failed to mark conversation {} as read. {err}",
                    controller.inner.conversation_id
                );
            }
        });
    }

    fn subscribe_to_typing(&self) {
        if let Some(viewer) = self.viewer() {
            let mut state = self.inner.state.write();
            let watched_user_id = state.conversation.other_participant(&viewer).id.clone();
            let max_display = state.typing_indicator.max_display();
            state.typing_indicator = TypingIndicator::new(watched_user_id, max_display);
        }

        let weak_inner = Arc::downgrade(&self.inner);
        let subscription = self.inner.typing_transport.subscribe_typing(
            &self.inner.conversation_id,
            Box::new(move |signal| {
                let Some(inner) = weak_inner.upgrade() else {
                    return;
                };
                ConversationController { inner }.handle_typing_signal(signal)
            }),
        );

        *self.inner.typing_subscription.lock() = Some(subscription);
    }

    fn handle_typing_signal(&self, signal: TypingSignal) {
        let now = self.inner.time_provider.now();

        let (was_visible, generation, is_visible, max_display) = {
            let mut state = self.inner.state.write();
            if state.phase != ConversationPhase::Ready {
                return;
            }
            let indicator = &mut state.typing_indicator;
            let was_visible = indicator.is_visible(now);
            let generation = indicator.handle_signal(&signal, now);
            (
                was_visible,
                generation,
                indicator.is_visible(now),
                indicator.max_display(),
            )
        };

        if was_visible != is_visible {
            self.dispatch(ChatEvent::CounterpartTypingChanged {
                is_typing: is_visible,
            });
        }

        if let Some(generation) = generation {
            self.schedule_typing_expiry(generation, max_display);
        }
    }

    fn schedule_typing_expiry(&self, generation: u64, max_display: chrono::Duration) {
        let weak_inner: Weak<ControllerInner> = Arc::downgrade(&self.inner);
        let deadline = Instant::now() + max_display.to_std().unwrap_or_default();

        spawn(async move {
            sleep_until(deadline).await;

            let Some(inner) = weak_inner.upgrade() else {
                return;
            };
            let controller = ConversationController { inner };
            let expired = controller
                .inner
                .state
                .write()
                .typing_indicator
                .expire(generation);

            if expired {
                debug!(
                    "Hiding stale typing indicator in {}",
                    controller.inner.conversation_id
                );
                controller.dispatch(ChatEvent::CounterpartTypingChanged { is_typing: false });
            }
        });
    }

    fn tear_down(&self, archived: bool) {
        {
            let mut state = self.inner.state.write();
            state.phase = ConversationPhase::Closed;
            state.messages.clear();
            state.reply_target = None;
            state.edit_target = None;
            state.typing_indicator.reset();
        }

        let subscription = self.inner.typing_subscription.lock().take();
        drop(subscription);

        self.dispatch(ChatEvent::PhaseChanged {
            phase: ConversationPhase::Closed,
        });
        self.dispatch(ChatEvent::ConversationClosed { archived });
    }
}

/// Tracks a queued or in-flight send for `is_sending`.
struct PendingSend {
    controller: ConversationController,
}

impl PendingSend {
    fn new(controller: &ConversationController) -> Self {
        let is_first = {
            let mut state = controller.inner.state.write();
            state.pending_sends += 1;
            state.pending_sends == 1
        };
        if is_first {
            controller.dispatch(ChatEvent::SendingChanged { is_sending: true });
        }
        Self {
            controller: controller.clone(),
        }
    }
}

impl Drop for PendingSend {
    fn drop(&mut self) {
        let is_last = {
            let mut state = self.controller.inner.state.write();
            state.pending_sends = state.pending_sends.saturating_sub(1);
            state.pending_sends == 0
        };
        if is_last {
            self.controller
                .dispatch(ChatEvent::SendingChanged { is_sending: false });
        }
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::app::deps::{AppDependencies, DynChatEventDispatcher};
use crate::app::dtos::{
    message_snippet, MessageBubble, RenderHandle, ReplyQuote, ScrollBehavior, Timeline,
    TimelineItem,
};
use crate::domain::conversations::models::Conversation;
use crate::domain::messaging::models::Message;
use crate::domain::shared::models::{MessageId, UserId};
use crate::util::{sleep_until, spawn};
use crate::ChatEvent;

use super::ConversationController;

/// The scrollable view that displays the timeline.
#[cfg_attr(feature = "test", mockall::automock)]
pub trait ScrollTarget: Send + Sync {
    fn scroll_to(&self, handle: RenderHandle, behavior: ScrollBehavior);
    fn scroll_to_bottom(&self, behavior: ScrollBehavior);
}

pub type DynScrollTarget = Arc<dyn ScrollTarget>;

/// Lets a parent view scroll the timeline to a message it knows by id.
pub trait MessageScroller: Send + Sync {
    /// Returns false if no row is mounted for `message_id`.
    fn scroll_to_message(&self, message_id: &MessageId) -> bool;
}

/// Turns the controller's message list into renderable timeline items and drives the
/// scroll position of the host view.
#[derive(Clone)]
pub struct TimelineRenderer {
    inner: Arc<TimelineRendererInner>,
}

struct TimelineRendererInner {
    controller: ConversationController,
    event_dispatcher: DynChatEventDispatcher,
    highlight_duration: chrono::Duration,
    group_window: chrono::Duration,
    auto_scroll_threshold: f64,
    reply_snippet_length: usize,
    state: Mutex<RendererState>,
}

#[derive(Default)]
struct RendererState {
    scroll_target: Option<DynScrollTarget>,
    handles: HashMap<MessageId, RenderHandle>,
    next_handle: u64,
    highlight: Option<(MessageId, u64)>,
    highlight_generation: u64,
    is_scrolled_away: bool,
    fingerprint: Option<ContentFingerprint>,
}

/// Changes of these values move the newest content.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContentFingerprint {
    message_count: usize,
    last_message_id: Option<MessageId>,
    shows_typing_indicator: bool,
}

impl TimelineRenderer {
    pub fn new(controller: ConversationController, deps: &AppDependencies) -> Self {
        let config = &deps.ctx.config;

        Self {
            inner: Arc::new(TimelineRendererInner {
                controller,
                event_dispatcher: deps.event_dispatcher.clone(),
                highlight_duration: config.highlight_duration(),
                group_window: config.message_group_window(),
                auto_scroll_threshold: config.auto_scroll_threshold,
                reply_snippet_length: config.reply_snippet_length,
                state: Default::default(),
            }),
        }
    }

    pub fn attach_scroll_target(&self, scroll_target: DynScrollTarget) {
        self.inner.state.lock().scroll_target = Some(scroll_target);
    }

    pub fn detach_scroll_target(&self) {
        self.inner.state.lock().scroll_target = None;
    }

    /// Registers the row of a message and returns its handle. Mounting the same message
    /// again returns the same handle.
    pub fn mount(&self, message_id: &MessageId) -> RenderHandle {
        let mut state = self.inner.state.lock();
        if let Some(handle) = state.handles.get(message_id) {
            return *handle;
        }
        state.next_handle += 1;
        let handle = RenderHandle(state.next_handle);
        state.handles.insert(message_id.clone(), handle);
        handle
    }

    pub fn unmount(&self, message_id: &MessageId) {
        self.inner.state.lock().handles.remove(message_id);
    }

    pub fn handle(&self, message_id: &MessageId) -> Option<RenderHandle> {
        self.inner.state.lock().handles.get(message_id).copied()
    }

    pub fn is_highlighted(&self, message_id: &MessageId) -> bool {
        self.inner
            .state
            .lock()
            .highlight
            .as_ref()
            .is_some_and(|(id, _)| id == message_id)
    }

    /// False once the user scrolled away from the newest message.
    pub fn is_following_latest(&self) -> bool {
        !self.inner.state.lock().is_scrolled_away
    }
}

impl TimelineRenderer {
    pub fn render(&self) -> Timeline {
        let controller = &self.inner.controller;
        let messages = controller.messages();
        let conversation = controller.conversation();
        let viewer_id = controller.viewer().map(|viewer| viewer.id);
        let highlighted_id = self
            .inner
            .state
            .lock()
            .highlight
            .as_ref()
            .map(|(id, _)| id.clone());

        let reply_index = messages
            .iter()
            .map(|message| (&message.id, message))
            .collect::<HashMap<_, _>>();

        let mut items = Vec::<TimelineItem>::new();
        let mut current_date = None;
        let mut group_head: Option<&Message> = None;

        for message in messages.iter() {
            let date = message.sent_at.date_naive();
            if current_date != Some(date) {
                items.push(TimelineItem::DaySeparator { date });
                current_date = Some(date);
                group_head = None;
            }

            if message.is_system() {
                items.push(TimelineItem::SystemBanner {
                    message_id: message.id.clone(),
                    text: message.content.clone(),
                    sent_at: message.sent_at,
                });
                group_head = None;
                continue;
            }

            let mut bubble = MessageBubble::new(message, viewer_id.as_ref(), &conversation);
            bubble.reply = message.reply_to_id.as_ref().map(|reply_to_id| {
                self.resolve_reply(reply_to_id, &reply_index, &conversation, viewer_id.as_ref())
            });
            bubble.is_first_in_group =
                !group_head.is_some_and(|previous| self.continues_group(previous, message));
            bubble.is_highlighted = highlighted_id.as_ref() == Some(&message.id);

            items.push(TimelineItem::Message(Box::new(bubble)));
            group_head = Some(message);
        }

        for idx in 0..items.len() {
            let next_continues_group = matches!(
                items.get(idx + 1),
                Some(TimelineItem::Message(next)) if !next.is_first_in_group
            );
            if let TimelineItem::Message(bubble) = &mut items[idx] {
                bubble.is_last_in_group = !next_continues_group;
            }
        }

        Timeline {
            items,
            show_typing_indicator: controller.is_counterpart_typing(),
        }
    }

    /// Called by the host after the message list or the typing indicator changed. Scrolls
    /// to the newest content unless the user scrolled away. Returns true if it scrolled.
    pub fn handle_content_change(&self) -> bool {
        let controller = &self.inner.controller;
        let messages = controller.messages();
        let fingerprint = ContentFingerprint {
            message_count: messages.len(),
            last_message_id: messages.last().map(|message| message.id.clone()),
            shows_typing_indicator: controller.is_counterpart_typing(),
        };

        let (scroll_target, behavior) = {
            let mut state = self.inner.state.lock();
            let previous = state.fingerprint.replace(fingerprint.clone());
            if previous.as_ref() == Some(&fingerprint) || state.is_scrolled_away {
                return false;
            }
            let Some(scroll_target) = state.scroll_target.clone() else {
                return false;
            };
            // Jump on the first render, animate afterwards.
            let behavior = if previous.is_none() {
                ScrollBehavior::Instant
            } else {
                ScrollBehavior::Smooth
            };
            (scroll_target, behavior)
        };

        scroll_target.scroll_to_bottom(behavior);
        true
    }

    /// Reports the current distance between the visible area and the bottom of the content.
    pub fn handle_user_scroll(&self, distance_from_bottom: f64) {
        let mut state = self.inner.state.lock();
        let is_scrolled_away = distance_from_bottom > self.inner.auto_scroll_threshold;
        if state.is_scrolled_away != is_scrolled_away {
            debug!("Timeline follows latest messages: {}", !is_scrolled_away);
        }
        state.is_scrolled_away = is_scrolled_away;
    }

    pub fn scroll_to_latest(&self) {
        let scroll_target = {
            let mut state = self.inner.state.lock();
            state.is_scrolled_away = false;
            state.scroll_target.clone()
        };
        if let Some(scroll_target) = scroll_target {
            scroll_target.scroll_to_bottom(ScrollBehavior::Smooth);
        }
    }

    /// Smooth-scrolls to the row of `message_id` and highlights it for a while.
    pub fn scroll_to_message(&self, message_id: &MessageId) -> bool {
        let (scroll_target, handle, generation) = {
            let mut state = self.inner.state.lock();
            let Some(handle) = state.handles.get(message_id).copied() else {
                return false;
            };
            let Some(scroll_target) = state.scroll_target.clone() else {
                return false;
            };
            state.highlight_generation += 1;
            let generation = state.highlight_generation;
            state.highlight = Some((message_id.clone(), generation));
            // Jumping into history stops following the newest messages.
            state.is_scrolled_away = true;
            (scroll_target, handle, generation)
        };

        scroll_target.scroll_to(handle, ScrollBehavior::Smooth);
        self.dispatch(ChatEvent::HighlightChanged {
            message_id: Some(message_id.clone()),
        });
        self.schedule_highlight_reset(generation);
        true
    }
}

impl MessageScroller for TimelineRenderer {
    fn scroll_to_message(&self, message_id: &MessageId) -> bool {
        TimelineRenderer::scroll_to_message(self, message_id)
    }
}

impl TimelineRenderer {
    fn dispatch(&self, event: ChatEvent) {
        self.inner
            .event_dispatcher
            .dispatch_event(self.inner.controller.conversation_id(), event)
    }

    fn continues_group(&self, previous: &Message, message: &Message) -> bool {
        previous.sender_id == message.sender_id
            && message.sent_at - previous.sent_at <= self.inner.group_window
    }

    fn resolve_reply(
        &self,
        reply_to_id: &MessageId,
        reply_index: &HashMap<&MessageId, &Message>,
        conversation: &Conversation,
        viewer_id: Option<&UserId>,
    ) -> ReplyQuote {
        let Some(target) = reply_index.get(reply_to_id) else {
            return ReplyQuote::Unresolved {
                message_id: reply_to_id.clone(),
            };
        };

        let sender_name = match viewer_id {
            Some(viewer_id) => {
                conversation.display_name_for_viewer(viewer_id, &target.sender_id, target.sender_role)
            }
            None => conversation.display_name(&target.sender_id, target.sender_role),
        };

        if target.is_deleted() {
            return ReplyQuote::Deleted {
                message_id: target.id.clone(),
                sender_name,
            };
        }

        ReplyQuote::Resolved {
            message_id: target.id.clone(),
            snippet: message_snippet(target, conversation, self.inner.reply_snippet_length),
            sender_name,
        }
    }

    fn schedule_highlight_reset(&self, generation: u64) {
        let renderer = Arc::downgrade(&self.inner);
        let deadline =
            Instant::now() + self.inner.highlight_duration.to_std().unwrap_or_default();

        spawn(async move {
            sleep_until(deadline).await;

            let Some(inner) = renderer.upgrade() else {
                return;
            };
            let renderer = TimelineRenderer { inner };

            let cleared = {
                let mut state = renderer.inner.state.lock();
                match &state.highlight {
                    Some((_, current)) if *current == generation => {
                        state.highlight = None;
                        true
                    }
                    _ => false,
                }
            };

            if cleared {
                renderer.dispatch(ChatEvent::HighlightChanged { message_id: None });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::app::services::SendDraft;
    use crate::domain::shared::models::SenderRole;
    use crate::test::{mock_data, InMemoryEnvironment, MessageBuilder};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum ScrollCall {
        To(RenderHandle, ScrollBehavior),
        Bottom(ScrollBehavior),
    }

    #[derive(Default)]
    struct RecordingScrollTarget {
        calls: Mutex<Vec<ScrollCall>>,
    }

    impl RecordingScrollTarget {
        fn take_calls(&self) -> Vec<ScrollCall> {
            std::mem::take(&mut *self.calls.lock())
        }
    }

    impl ScrollTarget for RecordingScrollTarget {
        fn scroll_to(&self, handle: RenderHandle, behavior: ScrollBehavior) {
            self.calls.lock().push(ScrollCall::To(handle, behavior))
        }

        fn scroll_to_bottom(&self, behavior: ScrollBehavior) {
            self.calls.lock().push(ScrollCall::Bottom(behavior))
        }
    }

    async fn setup(
        env: &InMemoryEnvironment,
    ) -> (
        ConversationController,
        TimelineRenderer,
        Arc<RecordingScrollTarget>,
    ) {
        let controller = env.controller();
        controller.open().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let timeline = env.timeline(&controller);
        let scroll_target = Arc::new(RecordingScrollTarget::default());
        timeline.attach_scroll_target(scroll_target.clone());
        (controller, timeline, scroll_target)
    }

    fn org_message(idx: u32) -> MessageBuilder {
        MessageBuilder::new_with_index(idx)
            .set_sender(&mock_data::organization_id(), SenderRole::Organization)
    }

    fn describe(timeline: &Timeline) -> Vec<String> {
        timeline
            .items
            .iter()
            .map(|item| match item {
                TimelineItem::DaySeparator { date } => format!("-- {date} --"),
                TimelineItem::SystemBanner { message_id, .. } => format!("[{message_id}]"),
                TimelineItem::Message(bubble) => {
                    let mut description = bubble.message_id.to_string();
                    if bubble.is_first_in_group {
                        description.push_str(" first");
                    }
                    if bubble.is_last_in_group {
                        description.push_str(" last");
                    }
                    description
                }
            })
            .collect()
    }

    async fn send(controller: &ConversationController, content: &str) {
        controller
            .request_send(SendDraft {
                content: content.to_string(),
                reply_to_id: None,
                has_attachments: false,
            })
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_groups_messages_by_sender_day_and_time() {
        let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
        env.seed([
            MessageBuilder::new_with_index(1).build(),
            MessageBuilder::new_with_index(2).build(),
            org_message(3).build(),
            MessageBuilder::new_with_index(4).set_system().build(),
            org_message(5).build(),
            org_message(6).build(),
            org_message(12).build(),
            org_message(20)
                .set_sent_at(mock_data::reference_date() + chrono::Duration::days(1))
                .build(),
        ]);
        let (_controller, timeline, _) = setup(&env).await;

        let rendered = timeline.render();

        assert_eq!(
            describe(&rendered),
            vec![
                "-- 2024-03-04 --",
                "msg-1 first",
                "msg-2 last",
                "msg-3 first last",
                "[msg-4]",
                "msg-5 first",
                "msg-6 last",
                "msg-12 first last",
                "-- 2024-03-05 --",
                "msg-20 first last",
            ]
        );
        assert!(!rendered.show_typing_indicator);
        assert_eq!(
            rendered.items[0],
            TimelineItem::DaySeparator {
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_reply_quotes() {
        let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
        env.seed([
            MessageBuilder::new_with_index(1).build(),
            org_message(2).set_reply_to("msg-1").build(),
            MessageBuilder::new_with_index(3).set_deleted().build(),
            org_message(4).set_reply_to("msg-3").build(),
            org_message(5).set_reply_to("msg-99").build(),
            MessageBuilder::new_with_index(6).set_reply_to("msg-2").build(),
        ]);
        let (_controller, timeline, _) = setup(&env).await;

        let rendered = timeline.render();
        let reply = |idx: u32| {
            rendered
                .bubble(&MessageBuilder::id_for_index(idx))
                .and_then(|bubble| bubble.reply.clone())
        };

        assert_eq!(reply(1), None);
        assert_eq!(
            reply(2),
            Some(ReplyQuote::Resolved {
                message_id: "msg-1".into(),
                snippet: "Message 1".to_string(),
                sender_name: "Jane Doe".to_string(),
            })
        );
        assert_eq!(
            reply(4),
            Some(ReplyQuote::Deleted {
                message_id: "msg-3".into(),
                sender_name: "Jane Doe".to_string(),
            })
        );
        assert_eq!(
            reply(5),
            Some(ReplyQuote::Unresolved {
                message_id: "msg-99".into()
            })
        );
        assert_eq!(
            reply(6),
            Some(ReplyQuote::Resolved {
                message_id: "msg-2".into(),
                snippet: "Message 2".to_string(),
                sender_name: "You".to_string(),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_returns_stable_handles() {
        let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
        let (_controller, timeline, _) = setup(&env).await;
        let msg_1 = MessageBuilder::id_for_index(1);
        let msg_2 = MessageBuilder::id_for_index(2);

        let handle = timeline.mount(&msg_1);
        assert_eq!(timeline.mount(&msg_1), handle);
        assert_ne!(timeline.mount(&msg_2), handle);
        assert_eq!(timeline.handle(&msg_1), Some(handle));

        timeline.unmount(&msg_1);
        assert_eq!(timeline.handle(&msg_1), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_to_message_highlights_temporarily() {
        let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
        env.seed([
            MessageBuilder::new_with_index(1).build(),
            MessageBuilder::new_with_index(2).build(),
        ]);
        let (_controller, timeline, scroll_target) = setup(&env).await;
        let msg_1 = MessageBuilder::id_for_index(1);
        let handle = timeline.mount(&msg_1);
        env.delegate.take_events();

        assert!(!timeline.scroll_to_message(&MessageBuilder::id_for_index(2)));
        assert!(scroll_target.take_calls().is_empty());

        assert!(timeline.scroll_to_message(&msg_1));
        assert_eq!(
            scroll_target.take_calls(),
            vec![ScrollCall::To(handle, ScrollBehavior::Smooth)]
        );
        assert!(timeline.is_highlighted(&msg_1));
        assert!(timeline.render().bubble(&msg_1).unwrap().is_highlighted);
        assert!(!timeline.is_following_latest());

        tokio::time::sleep(Duration::from_millis(1990)).await;
        assert!(timeline.is_highlighted(&msg_1));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!timeline.is_highlighted(&msg_1));
        assert!(!timeline.render().bubble(&msg_1).unwrap().is_highlighted);
        assert_eq!(
            env.delegate.take_events(),
            vec![
                ChatEvent::HighlightChanged {
                    message_id: Some(msg_1.clone())
                },
                ChatEvent::HighlightChanged { message_id: None },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_highlight_supersedes_previous_timer() {
        let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
        let (_controller, timeline, _) = setup(&env).await;
        let msg_1 = MessageBuilder::id_for_index(1);
        let msg_2 = MessageBuilder::id_for_index(2);
        timeline.mount(&msg_1);
        timeline.mount(&msg_2);

        timeline.scroll_to_message(&msg_1);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        timeline.scroll_to_message(&msg_2);
        assert!(!timeline.is_highlighted(&msg_1));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(timeline.is_highlighted(&msg_2));

        tokio::time::sleep(Duration::from_millis(1010)).await;
        assert!(!timeline.is_highlighted(&msg_2));
        assert_eq!(
            env.delegate
                .count(&ChatEvent::HighlightChanged { message_id: None }),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_follows_new_content_until_scrolled_away() {
        let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
        env.seed([MessageBuilder::new_with_index(1).build()]);
        let (controller, timeline, scroll_target) = setup(&env).await;

        assert!(timeline.handle_content_change());
        assert_eq!(
            scroll_target.take_calls(),
            vec![ScrollCall::Bottom(ScrollBehavior::Instant)]
        );

        // Nothing changed.
        assert!(!timeline.handle_content_change());

        send(&controller, "First").await;
        assert!(timeline.handle_content_change());
        assert_eq!(
            scroll_target.take_calls(),
            vec![ScrollCall::Bottom(ScrollBehavior::Smooth)]
        );

        timeline.handle_user_scroll(200.);
        assert!(!timeline.is_following_latest());
        send(&controller, "Second").await;
        assert!(!timeline.handle_content_change());
        assert!(scroll_target.take_calls().is_empty());

        timeline.handle_user_scroll(40.);
        assert!(timeline.is_following_latest());
        send(&controller, "Third").await;
        assert!(timeline.handle_content_change());
        assert_eq!(
            scroll_target.take_calls(),
            vec![ScrollCall::Bottom(ScrollBehavior::Smooth)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_to_latest_resumes_following() {
        let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
        let (_controller, timeline, scroll_target) = setup(&env).await;

        timeline.handle_user_scroll(500.);
        timeline.scroll_to_latest();

        assert!(timeline.is_following_latest());
        assert_eq!(
            scroll_target.take_calls(),
            vec![ScrollCall::Bottom(ScrollBehavior::Smooth)]
        );

        timeline.detach_scroll_target();
        assert!(!timeline.handle_content_change());
        assert!(scroll_target.take_calls().is_empty());
    }
}

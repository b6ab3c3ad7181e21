// tandem-core-client/tandem-core-integration-tests
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use anyhow::Result;
use mockall::{predicate, Sequence};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use tandem_core_client::domain::messaging::models::SendMessageRequest;
use tandem_core_client::domain::messaging::services::StoreError;
use tandem_core_client::domain::typing::models::TypingSignal;
use tandem_core_client::domain::typing::services::{TypingListener, TypingSubscription};
use tandem_core_client::dtos::{ConversationPhase, Message, MessageId, SenderRole};
use tandem_core_client::mocks::MockChatDelegate;
use tandem_core_client::services::{ConversationController, ConversationError, SendDraft};
use tandem_core_client::test::{mock_data, MessageBuilder, MockAppDependencies, RecordingDelegate};
use tandem_core_client::ChatEvent;

use super::settle;

fn expect_open(deps: &mut MockAppDependencies, messages: Vec<Message>) {
    deps.message_store
        .expect_list_messages()
        .with(predicate::eq(mock_data::conversation_id()))
        .returning(move |_| {
            let messages = messages.clone();
            Box::pin(async move { Ok(messages) })
        });
    deps.message_store
        .expect_mark_all_read()
        .returning(|_, _| Box::pin(async { Ok(()) }));
}

fn expect_detached_typing(deps: &mut MockAppDependencies) {
    deps.typing_transport
        .expect_subscribe_typing()
        .returning(|_, _| TypingSubscription::detached());
}

#[tokio::test(start_paused = true)]
async fn test_open_loads_messages_and_marks_them_read() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    let mut store_seq = Sequence::new();
    let mut event_seq = Sequence::new();

    deps.message_store
        .expect_list_messages()
        .once()
        .in_sequence(&mut store_seq)
        .with(predicate::eq(mock_data::conversation_id()))
        .return_once(|_| {
            Box::pin(async {
                Ok(vec![
                    MessageBuilder::new_with_index(2).build(),
                    MessageBuilder::new_with_index(1).build(),
                ])
            })
        });
    deps.message_store
        .expect_mark_all_read()
        .once()
        .in_sequence(&mut store_seq)
        .with(
            predicate::eq(mock_data::conversation_id()),
            predicate::eq(SenderRole::Organization),
        )
        .return_once(|_, _| Box::pin(async { Ok(()) }));
    deps.message_store
        .expect_list_messages()
        .once()
        .in_sequence(&mut store_seq)
        .return_once(|_| {
            Box::pin(async {
                Ok(vec![
                    MessageBuilder::new_with_index(1).set_read().build(),
                    MessageBuilder::new_with_index(2).set_read().build(),
                ])
            })
        });

    deps.typing_transport
        .expect_subscribe_typing()
        .once()
        .return_once(|_, _| TypingSubscription::detached());

    let mut delegate = MockChatDelegate::new();
    for event in [
        ChatEvent::PhaseChanged {
            phase: ConversationPhase::Loading,
        },
        ChatEvent::PhaseChanged {
            phase: ConversationPhase::Ready,
        },
        ChatEvent::MessagesChanged,
        ChatEvent::MessagesChanged,
    ] {
        delegate
            .expect_handle_event()
            .once()
            .in_sequence(&mut event_seq)
            .with(
                predicate::eq(mock_data::conversation_id()),
                predicate::eq(event),
            )
            .return_const(());
    }
    deps.delegate = Some(Box::new(delegate));

    let controller = ConversationController::new(mock_data::conversation(), &deps.into_deps());
    controller.open().await?;
    settle().await;

    assert_eq!(controller.phase(), ConversationPhase::Ready);
    assert_eq!(
        controller
            .messages()
            .into_iter()
            .map(|message| (message.id.to_string(), message.read_at.is_some()))
            .collect::<Vec<_>>(),
        vec![("msg-1".to_string(), true), ("msg-2".to_string(), true)]
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_send_passes_mentions_and_reply_to_store() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    expect_open(&mut deps, vec![MessageBuilder::new_with_index(1).build()]);
    expect_detached_typing(&mut deps);

    deps.message_store
        .expect_send()
        .once()
        .with(predicate::eq(SendMessageRequest {
            conversation_id: mock_data::conversation_id(),
            sender_id: mock_data::organization_id(),
            sender_role: SenderRole::Organization,
            content: "Thanks <@cand-1>, see <@cand-1>!".to_string(),
            reply_to_id: Some(MessageId::from("msg-1")),
            mentions: vec![mock_data::counterpart_id()],
        }))
        .return_once(|request| {
            Box::pin(async move {
                Ok(MessageBuilder::new_with_id("sent-1")
                    .set_sender(&request.sender_id, request.sender_role)
                    .set_content(request.content)
                    .set_reply_to("msg-1")
                    .set_sent_at(mock_data::reference_date() + chrono::Duration::hours(1))
                    .build())
            })
        });

    let delegate = RecordingDelegate::default();
    deps.delegate = Some(Box::new(delegate.clone()));

    let controller = ConversationController::new(mock_data::conversation(), &deps.into_deps());
    controller.open().await?;
    settle().await;
    delegate.take_events();

    let message = controller
        .request_send(SendDraft {
            content: "  Thanks <@cand-1>, see <@cand-1>!\n".to_string(),
            reply_to_id: Some("msg-1".into()),
            has_attachments: false,
        })
        .await?;

    assert_eq!(
        controller.messages().last().map(|m| m.id.clone()),
        Some(message.id)
    );
    assert_eq!(
        delegate.take_events(),
        vec![
            ChatEvent::SendingChanged { is_sending: true },
            ChatEvent::MessagesChanged,
            ChatEvent::SendingChanged { is_sending: false },
        ]
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_ignores_failing_mark_as_read() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    deps.message_store
        .expect_list_messages()
        .once()
        .return_once(|_| Box::pin(async { Ok(vec![MessageBuilder::new_with_index(1).build()]) }));
    deps.message_store
        .expect_mark_all_read()
        .once()
        .return_once(|_, _| {
            Box::pin(async { Err(StoreError::Network("timeout".to_string())) })
        });
    deps.typing_transport
        .expect_subscribe_typing()
        .return_once(|_, _| TypingSubscription::detached());

    let controller = ConversationController::new(mock_data::conversation(), &deps.into_deps());
    controller.open().await?;
    settle().await;

    assert_eq!(controller.phase(), ConversationPhase::Ready);
    assert_eq!(controller.messages().len(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_archive_is_reported_and_final() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    expect_open(&mut deps, vec![]);

    let unsubscribed = Arc::new(Mutex::new(false));
    deps.typing_transport.expect_subscribe_typing().once().return_once({
        let unsubscribed = unsubscribed.clone();
        move |_, _| TypingSubscription::new(move || *unsubscribed.lock() = true)
    });

    deps.archive_service
        .expect_archive_conversation()
        .once()
        .with(predicate::eq(mock_data::conversation_id()))
        .return_once(|_| Box::pin(async { Ok(()) }));

    let delegate = RecordingDelegate::default();
    deps.delegate = Some(Box::new(delegate.clone()));

    let controller = ConversationController::new(mock_data::conversation(), &deps.into_deps());
    controller.open().await?;
    settle().await;
    delegate.take_events();

    controller.archive().await?;

    assert!(*unsubscribed.lock());
    assert!(controller.is_archived());
    assert_eq!(controller.phase(), ConversationPhase::Closed);
    assert_eq!(
        delegate.take_events(),
        vec![
            ChatEvent::PhaseChanged {
                phase: ConversationPhase::Closed
            },
            ChatEvent::ConversationClosed { archived: true },
        ]
    );

    assert_eq!(controller.archive().await, Err(ConversationError::Closed));
    assert_eq!(controller.open().await, Err(ConversationError::Closed));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_shows_counterpart_typing_from_transport() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    expect_open(&mut deps, vec![]);

    let listener = Arc::new(Mutex::new(None::<TypingListener>));
    deps.typing_transport.expect_subscribe_typing().once().return_once({
        let listener = listener.clone();
        move |_, callback| {
            *listener.lock() = Some(callback);
            TypingSubscription::detached()
        }
    });

    let delegate = RecordingDelegate::default();
    deps.delegate = Some(Box::new(delegate.clone()));

    let controller = ConversationController::new(mock_data::conversation(), &deps.into_deps());
    controller.open().await?;
    settle().await;
    delegate.take_events();

    let signal = |user_id, is_typing| TypingSignal {
        conversation_id: mock_data::conversation_id(),
        user_id,
        is_typing,
    };
    let notify = |signal: TypingSignal| {
        let listener = listener.lock();
        (listener.as_ref().expect("Expected typing listener"))(signal)
    };

    // The viewer's own signal is not shown.
    notify(signal(mock_data::organization_id(), true));
    assert!(!controller.is_counterpart_typing());

    notify(signal(mock_data::counterpart_id(), true));
    assert!(controller.is_counterpart_typing());

    notify(signal(mock_data::counterpart_id(), false));
    assert!(!controller.is_counterpart_typing());

    assert_eq!(
        delegate.take_events(),
        vec![
            ChatEvent::CounterpartTypingChanged { is_typing: true },
            ChatEvent::CounterpartTypingChanged { is_typing: false },
        ]
    );

    Ok(())
}

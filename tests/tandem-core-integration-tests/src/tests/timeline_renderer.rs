// tandem-core-client/tandem-core-integration-tests
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mockall::{predicate, Sequence};
use pretty_assertions::assert_eq;

use tandem_core_client::dtos::{MessageId, RenderHandle, ScrollBehavior};
use tandem_core_client::services::mocks::MockScrollTarget;
use tandem_core_client::services::{MessageScroller, SendDraft};
use tandem_core_client::test::{mock_data, InMemoryEnvironment, MessageBuilder};
use tandem_core_client::{ChatEvent, OpenConversation};

use super::settle;

#[tokio::test(start_paused = true)]
async fn test_scrolls_to_new_content_and_quoted_messages() -> Result<()> {
    let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
    env.seed([
        MessageBuilder::new_with_index(1).build(),
        MessageBuilder::new_with_index(2).build(),
    ]);
    let OpenConversation {
        controller,
        timeline,
        ..
    } = env.client().open_conversation(mock_data::conversation()).await?;
    settle().await;

    let mut scroll_target = MockScrollTarget::new();
    let mut seq = Sequence::new();
    scroll_target
        .expect_scroll_to_bottom()
        .once()
        .in_sequence(&mut seq)
        .with(predicate::eq(ScrollBehavior::Instant))
        .return_const(());
    scroll_target
        .expect_scroll_to_bottom()
        .once()
        .in_sequence(&mut seq)
        .with(predicate::eq(ScrollBehavior::Smooth))
        .return_const(());
    scroll_target
        .expect_scroll_to()
        .once()
        .in_sequence(&mut seq)
        .with(
            predicate::eq(RenderHandle(1)),
            predicate::eq(ScrollBehavior::Smooth),
        )
        .return_const(());
    timeline.attach_scroll_target(Arc::new(scroll_target));

    for item in timeline.render().bubbles() {
        timeline.mount(&item.message_id);
    }
    assert!(timeline.handle_content_change());

    controller
        .request_send(SendDraft {
            content: "Sounds good".to_string(),
            reply_to_id: Some("msg-1".into()),
            has_attachments: false,
        })
        .await?;
    assert!(timeline.handle_content_change());

    let scroller: &dyn MessageScroller = &timeline;
    let msg_1 = MessageId::from("msg-1");
    assert!(scroller.scroll_to_message(&msg_1));
    assert!(!scroller.scroll_to_message(&"msg-99".into()));

    // Scrolled into history, so new content no longer moves the view.
    controller
        .request_send(SendDraft {
            content: "Talk soon".to_string(),
            reply_to_id: None,
            has_attachments: false,
        })
        .await?;
    assert!(!timeline.handle_content_change());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(!timeline.is_highlighted(&msg_1));
    assert_eq!(
        env.delegate
            .events()
            .into_iter()
            .filter(|event| matches!(event, ChatEvent::HighlightChanged { .. }))
            .collect::<Vec<_>>(),
        vec![
            ChatEvent::HighlightChanged {
                message_id: Some(msg_1)
            },
            ChatEvent::HighlightChanged { message_id: None },
        ]
    );

    Ok(())
}

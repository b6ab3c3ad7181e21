// tandem-core-client/tandem-core-integration-tests
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use pretty_assertions::assert_eq;

use tandem_core_client::dtos::{
    BubbleBody, ComposerKey, ConversationPhase, KeyAction, MessageId, ReplyQuote,
};
use tandem_core_client::services::{ConversationError, ReactionToggle, SubmitOutcome};
use tandem_core_client::test::{mock_data, InMemoryEnvironment, MessageBuilder};
use tandem_core_client::{ChatEvent, OpenConversation};

use super::settle;

#[tokio::test(start_paused = true)]
async fn test_reply_react_and_archive() -> Result<()> {
    let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
    env.seed([MessageBuilder::new_with_index(1)
        .set_content("Hi, I applied for the backend role.")
        .build()]);
    let client = env.client();

    let OpenConversation {
        controller,
        composer,
        timeline,
    } = client.open_conversation(mock_data::conversation()).await?;
    settle().await;

    let msg_1 = MessageId::from("msg-1");
    assert!(env
        .message_store
        .message(&msg_1)
        .is_some_and(|message| message.read_at.is_some()));

    controller.set_reply_target(&msg_1)?;
    composer.update_text("Thanks @ja", 10);
    assert_eq!(composer.handle_key(ComposerKey::Tab), KeyAction::Consumed);
    let text = format!("{}we'll be in touch.", composer.text());
    composer.update_text(text.as_str(), text.len());
    assert_eq!(
        composer.handle_key(ComposerKey::Enter { shift: false }),
        KeyAction::Submit
    );

    let SubmitOutcome::Sent { message, .. } = composer.submit().await? else {
        panic!("Expected message to be sent");
    };
    assert_eq!(message.content, "Thanks <@cand-1> we'll be in touch.");

    let ReactionToggle::Added(reaction) = controller.toggle_reaction(&msg_1, "👍".into()).await?
    else {
        panic!("Expected reaction to be added");
    };

    let rendered = timeline.render();
    let reply = rendered.bubble(&message.id).expect("Expected sent message");
    assert_eq!(
        reply.body,
        BubbleBody::Text {
            text: "Thanks @Jane Doe we'll be in touch.".to_string(),
            mentions: vec![mock_data::counterpart_id()],
        }
    );
    assert_eq!(
        reply.reply,
        Some(ReplyQuote::Resolved {
            message_id: msg_1.clone(),
            snippet: "Hi, I applied for the backend role.".to_string(),
            sender_name: "Jane Doe".to_string(),
        })
    );
    let reactions = &rendered.bubble(&msg_1).expect("Expected msg-1").reactions;
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].viewer_reaction_id, Some(reaction.id));

    controller.archive().await?;

    assert!(env.archive_service.is_archived(&mock_data::conversation_id()));
    assert!(!composer.is_enabled());
    assert_eq!(controller.phase(), ConversationPhase::Closed);
    assert_eq!(
        env.delegate.events().last(),
        Some(&ChatEvent::ConversationClosed { archived: true })
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cannot_open_archived_conversation() -> Result<()> {
    let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
    let client = env.client();

    let mut conversation = mock_data::conversation();
    conversation.archived_at = Some(mock_data::reference_date());

    let result = client.open_conversation(conversation).await;
    assert!(matches!(result, Err(ConversationError::Closed)));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_without_viewer_conversation_is_read_only() -> Result<()> {
    let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
    env.seed([MessageBuilder::new_with_index(1).build()]);
    let client = env.client();
    client.set_viewer(None);

    let OpenConversation {
        controller,
        composer,
        ..
    } = client.open_conversation(mock_data::conversation()).await?;
    settle().await;

    assert_eq!(controller.phase(), ConversationPhase::Ready);
    assert!(!composer.is_enabled());
    assert!(env
        .message_store
        .message(&"msg-1".into())
        .is_some_and(|message| message.read_at.is_none()));

    composer.update_text("Hello", 5);
    assert!(matches!(
        composer.submit().await,
        Err(ConversationError::NoViewer)
    ));

    Ok(())
}

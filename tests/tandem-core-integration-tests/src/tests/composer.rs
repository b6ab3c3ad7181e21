// tandem-core-client/tandem-core-integration-tests
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use anyhow::Result;
use pretty_assertions::assert_eq;

use tandem_core_client::domain::uploads::models::UploadError;
use tandem_core_client::dtos::LocalFile;
use tandem_core_client::services::SubmitOutcome;
use tandem_core_client::test::{mock_data, InMemoryEnvironment};
use tandem_core_client::{ChatEvent, OpenConversation};

use super::settle;

#[tokio::test(start_paused = true)]
async fn test_cancelled_and_failed_uploads_do_not_affect_siblings() -> Result<()> {
    let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
    let OpenConversation {
        controller,
        composer,
        ..
    } = env.client().open_conversation(mock_data::conversation()).await?;
    settle().await;

    env.attachment_service
        .fail_link("cv.pdf", UploadError::Rejected("quota exceeded".to_string()));
    env.attachment_service
        .set_upload_latency(Some(Duration::from_millis(500)));

    let report = composer.stage_files(vec![
        LocalFile::new("/tmp/portfolio.png", 4096),
        LocalFile::new("/tmp/cv.pdf", 2048),
        LocalFile::new("/tmp/references.txt", 512),
    ]);
    assert_eq!(report.staged.len(), 3);
    let references_id = report.staged[2].clone();

    composer.update_text("My documents", 12);

    let (outcome, _) = tokio::join!(composer.submit(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        composer.cancel_upload(&references_id);
    });

    let SubmitOutcome::Sent {
        message,
        attachments,
    } = outcome?
    else {
        panic!("Expected message to be sent");
    };

    assert_eq!(
        attachments
            .iter()
            .map(|outcome| (outcome.file_name(), outcome.result.clone().err()))
            .collect::<Vec<_>>(),
        vec![
            ("portfolio.png", None),
            (
                "cv.pdf",
                Some(UploadError::Rejected("quota exceeded".to_string()))
            ),
            ("references.txt", Some(UploadError::Cancelled)),
        ]
    );

    let linked = controller
        .message(&message.id)
        .expect("Expected sent message")
        .attachments;
    assert_eq!(
        linked
            .iter()
            .map(|attachment| attachment.file_name.as_str())
            .collect::<Vec<_>>(),
        vec!["portfolio.png"]
    );
    assert!(linked[0].thumbnail_path.is_some());
    assert_eq!(composer.failed_uploads().len(), 2);
    assert_eq!(
        env.delegate
            .count(&ChatEvent::AttachmentsProcessed {
                message_id: message.id.clone(),
                outcomes: attachments,
            }),
        1
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_sends_are_delivered_in_submission_order() -> Result<()> {
    let env = InMemoryEnvironment::new(Some(mock_data::organization_viewer()));
    let OpenConversation {
        controller,
        composer,
        ..
    } = env.client().open_conversation(mock_data::conversation()).await?;
    settle().await;

    env.message_store.set_latency(
        tandem_core_client::infra::messaging::StoreOperation::Send,
        Duration::from_millis(200),
    );

    composer.update_text("One", 3);
    let (first, second) = tokio::join!(composer.submit(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        composer.update_text("Two", 3);
        composer.submit().await
    });

    assert!(matches!(first, Ok(SubmitOutcome::Sent { .. })));
    assert!(matches!(second, Ok(SubmitOutcome::Sent { .. })));
    assert_eq!(
        controller
            .messages()
            .iter()
            .map(|message| message.content.clone())
            .collect::<Vec<_>>(),
        vec!["One", "Two"]
    );
    assert_eq!(composer.text(), "");
    assert_eq!(
        env.delegate
            .count(&ChatEvent::SendingChanged { is_sending: true }),
        1
    );
    assert!(!controller.is_sending());

    Ok(())
}

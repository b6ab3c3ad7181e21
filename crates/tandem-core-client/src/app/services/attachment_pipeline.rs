// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::{HashMap, HashSet};

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::app::deps::{AppDependencies, DynAttachmentService, DynIdProvider};
use crate::domain::shared::models::{MessageId, StagedFileId};
use crate::domain::uploads::models::{
    Attachment, AttachmentPolicy, AttachmentValidationError, LocalFile, StagedAttachment,
    StagedAttachments, StagingError, UploadError, UploadHandle,
};
use crate::util::join_all;

/// Result of uploading and linking one staged file.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentOutcome {
    pub staged: StagedAttachment,
    pub result: Result<Attachment, UploadError>,
}

impl AttachmentOutcome {
    pub fn file_name(&self) -> &str {
        &self.staged.file.file_name
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Files accepted and refused by a single `stage` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StagingReport {
    pub staged: Vec<StagedFileId>,
    pub rejected: Vec<StagingError>,
}

pub struct AttachmentPipeline {
    policy: AttachmentPolicy,
    attachment_service: DynAttachmentService,
    id_provider: DynIdProvider,
    in_flight: Mutex<HashMap<StagedFileId, AbortHandle>>,
    cancelled: Mutex<HashSet<StagedFileId>>,
}

impl From<&AppDependencies> for AttachmentPipeline {
    fn from(deps: &AppDependencies) -> Self {
        Self::new(
            deps.ctx.config.attachment_policy.clone(),
            deps.attachment_service.clone(),
            deps.id_provider.clone(),
        )
    }
}

impl AttachmentPipeline {
    pub fn new(
        policy: AttachmentPolicy,
        attachment_service: DynAttachmentService,
        id_provider: DynIdProvider,
    ) -> Self {
        Self {
            policy,
            attachment_service,
            id_provider,
            in_flight: Default::default(),
            cancelled: Default::default(),
        }
    }

    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    pub fn validate(&self, file: &LocalFile) -> Result<(), AttachmentValidationError> {
        self.policy.validate(file)
    }

    /// Validates `file` and assigns it a staging id.
    pub fn prepare(&self, file: LocalFile) -> Result<StagedAttachment, AttachmentValidationError> {
        self.validate(&file)?;
        Ok(StagedAttachment {
            id: self.id_provider.new_id().into(),
            file,
        })
    }

    /// Stages `files` in order. Invalid files and files beyond the staging limit are
    /// refused individually; the remaining files are staged regardless.
    pub fn stage(&self, staged: &mut StagedAttachments, files: Vec<LocalFile>) -> StagingReport {
        let mut report = StagingReport::default();

        for file in files {
            let result = self
                .prepare(file)
                .map_err(StagingError::from)
                .and_then(|attachment| {
                    let id = attachment.id.clone();
                    staged.stage(attachment).map(|_| id)
                });

            match result {
                Ok(id) => report.staged.push(id),
                Err(err) => {
                    info!("Refused to stage file. {err}");
                    report.rejected.push(err)
                }
            }
        }

        report
    }

    pub async fn upload(&self, attachment: &StagedAttachment) -> Result<UploadHandle, UploadError> {
        if self.cancelled.lock().contains(&attachment.id) {
            return Err(UploadError::Cancelled);
        }

        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        self.in_flight
            .lock()
            .insert(attachment.id.clone(), abort_handle);

        debug!("Uploading {}…", attachment.file.file_name);
        let result = Abortable::new(
            self.attachment_service.upload_file(&attachment.file),
            abort_registration,
        )
        .await;

        self.in_flight.lock().remove(&attachment.id);

        match result {
            Ok(result) => result,
            Err(_aborted) => Err(UploadError::Cancelled),
        }
    }

    /// Cancels the upload of a staged file, whether it is in flight or still pending.
    /// A cancelled file is never linked to a message.
    pub fn cancel(&self, id: &StagedFileId) {
        self.cancelled.lock().insert(id.clone());
        if let Some(handle) = self.in_flight.lock().remove(id) {
            handle.abort();
        }
    }

    pub fn is_uploading(&self, id: &StagedFileId) -> bool {
        self.in_flight.lock().contains_key(id)
    }

    pub async fn link_to_message(
        &self,
        message_id: &MessageId,
        handle: &UploadHandle,
    ) -> Result<Attachment, UploadError> {
        self.attachment_service
            .link_attachment(message_id, handle)
            .await
    }

    pub async fn upload_and_link(
        &self,
        message_id: &MessageId,
        attachment: StagedAttachment,
    ) -> AttachmentOutcome {
        let result = async {
            let handle = self.upload(&attachment).await?;
            // The upload might have been cancelled while it was completing.
            if self.cancelled.lock().contains(&attachment.id) {
                return Err(UploadError::Cancelled);
            }
            self.link_to_message(message_id, &handle).await
        }
        .await;

        // The cancellation applied to this attempt only.
        self.cancelled.lock().remove(&attachment.id);

        if let Err(err) = &result {
            warn!(
                "Failed to attach {} to message {message_id}. {err}",
                attachment.file.file_name
            );
        }

        AttachmentOutcome {
            staged: attachment,
            result,
        }
    }

    /// Uploads and links every file independently. A failing file does not affect its
    /// siblings.
    pub async fn process(
        &self,
        message_id: &MessageId,
        attachments: Vec<StagedAttachment>,
    ) -> Vec<AttachmentOutcome> {
        join_all(
            attachments
                .into_iter()
                .map(|attachment| self.upload_and_link(message_id, attachment)),
        )
        .await
    }

    /// Attempts a failed or cancelled file again.
    pub async fn retry(
        &self,
        message_id: &MessageId,
        attachment: StagedAttachment,
    ) -> AttachmentOutcome {
        self.cancelled.lock().remove(&attachment.id);
        self.upload_and_link(message_id, attachment).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use crate::infra::uploads::InMemoryAttachmentService;
    use crate::test::IncrementingIdProvider;

    use super::*;

    fn pipeline() -> (AttachmentPipeline, Arc<InMemoryAttachmentService>) {
        let service = Arc::new(InMemoryAttachmentService::new(Arc::new(
            IncrementingIdProvider::new("upload"),
        )));
        let pipeline = AttachmentPipeline::new(
            AttachmentPolicy::default(),
            service.clone(),
            Arc::new(IncrementingIdProvider::new("staged")),
        );
        (pipeline, service)
    }

    #[test]
    fn test_stage_refuses_invalid_and_excess_files() {
        let (pipeline, _) = pipeline();
        let mut staged = StagedAttachments::new(5);

        let mut files = (1..=4)
            .map(|idx| LocalFile::new(format!("photo-{idx}.png"), 100))
            .collect::<Vec<_>>();
        files.insert(1, LocalFile::new("huge.pdf", 50 * 1024 * 1024));
        files.push(LocalFile::new("notes.txt", 10));
        files.push(LocalFile::new("photo-5.png", 100));

        let report = pipeline.stage(&mut staged, files);

        assert_eq!(staged.len(), 5);
        assert_eq!(report.staged.len(), 5);
        assert_eq!(
            report.rejected,
            vec![
                StagingError::Invalid(AttachmentValidationError::FileTooLarge {
                    file_name: "huge.pdf".to_string(),
                    file_size: 50 * 1024 * 1024,
                    max_file_size: 10 * 1024 * 1024,
                }),
                StagingError::LimitReached {
                    limit: 5,
                    file_name: "photo-5.png".to_string()
                }
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_siblings() {
        let (pipeline, service) = pipeline();
        service.fail_upload("b.png", UploadError::Network("reset".to_string()));

        let attachments = ["a.png", "b.png", "c.pdf"]
            .into_iter()
            .map(|name| pipeline.prepare(LocalFile::new(name, 100)).unwrap())
            .collect::<Vec<_>>();

        let outcomes = pipeline.process(&"msg-1".into(), attachments).await;

        assert_eq!(
            outcomes
                .iter()
                .map(|o| (o.file_name(), o.is_success()))
                .collect::<Vec<_>>(),
            vec![("a.png", true), ("b.png", false), ("c.pdf", true)]
        );
        assert_eq!(service.attachments_for_message(&"msg-1".into()).len(), 2);

        let retried = pipeline
            .retry(&"msg-1".into(), outcomes[1].staged.clone())
            .await;
        assert_eq!(retried.result.unwrap().message_id, MessageId::from("msg-1"));
        assert_eq!(service.attachments_for_message(&"msg-1".into()).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_upload_is_not_linked() {
        let (pipeline, service) = pipeline();
        service.set_upload_latency(Some(Duration::from_secs(5)));
        let pipeline = Arc::new(pipeline);

        let attachment = pipeline
            .prepare(LocalFile::new("photo.jpg", 100))
            .unwrap();
        let staged_id = attachment.id.clone();

        let task = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.upload_and_link(&"msg-1".into(), attachment).await }
        });

        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(pipeline.is_uploading(&staged_id));

        pipeline.cancel(&staged_id);
        let outcome = task.await.unwrap();

        assert_eq!(outcome.result, Err(UploadError::Cancelled));
        assert!(service.attachments().is_empty());
        assert!(!pipeline.is_uploading(&staged_id));
    }

    #[tokio::test]
    async fn test_cancellation_is_released_with_the_outcome() {
        let (pipeline, service) = pipeline();

        let attachment = pipeline
            .prepare(LocalFile::new("photo.jpg", 100))
            .unwrap();
        pipeline.cancel(&attachment.id);

        let cancelled = pipeline
            .upload_and_link(&"msg-1".into(), attachment.clone())
            .await;
        assert_eq!(cancelled.result, Err(UploadError::Cancelled));
        assert!(service.attachments().is_empty());

        let uploaded = pipeline.upload_and_link(&"msg-1".into(), attachment).await;
        assert!(uploaded.is_success());
        assert_eq!(service.attachments_for_message(&"msg-1".into()).len(), 1);
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::app::deps::AppDependencies;
use crate::app::dtos::{ComposerKey, KeyAction, MentionSuggestions};
use crate::domain::messaging::models::Message;
use crate::domain::shared::models::{MessageId, StagedFileId};
use crate::domain::uploads::models::{LocalFile, StagedAttachment, StagedAttachments};

use super::{
    AttachmentOutcome, AttachmentPipeline, ConversationController, ConversationError,
    MentionAutocomplete, SendDraft, StagingReport, TypingSignalChannel,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Neither text nor attachments were present.
    NothingToSend,
    /// The same draft is already being sent.
    AlreadySubmitting,
    Sent {
        message: Message,
        attachments: Vec<AttachmentOutcome>,
    },
    Edited {
        message: Message,
    },
}

/// Turns user input into send and edit requests.
///
/// Caret positions are byte offsets into the draft text.
pub struct Composer {
    controller: ConversationController,
    pipeline: Arc<AttachmentPipeline>,
    typing: Option<TypingSignalChannel>,
    state: Mutex<ComposerState>,
}

struct ComposerState {
    text: String,
    caret: usize,
    /// Incremented on every change of the draft text.
    revision: u64,
    staged: StagedAttachments,
    mentions: MentionAutocomplete,
    /// Revisions of drafts whose send has not settled yet.
    submitting_revisions: HashSet<u64>,
    /// Staged files that belong to a send that has not settled yet.
    submitting_files: HashSet<StagedFileId>,
    /// The draft that was replaced when entering edit mode.
    stashed_draft: Option<String>,
    failed_uploads: Vec<(MessageId, AttachmentOutcome)>,
}

impl Composer {
    pub fn new(
        controller: ConversationController,
        pipeline: Arc<AttachmentPipeline>,
        deps: &AppDependencies,
    ) -> Self {
        let typing = deps.ctx.viewer().map(|viewer| {
            TypingSignalChannel::new(
                controller.conversation_id().clone(),
                viewer.id,
                deps.ctx.config.typing_idle_timeout(),
                deps.typing_transport.clone(),
                deps.time_provider.clone(),
            )
        });

        let state = ComposerState {
            text: String::new(),
            caret: 0,
            revision: 0,
            staged: StagedAttachments::new(deps.ctx.config.max_staged_attachments),
            mentions: MentionAutocomplete::new(controller.mention_users()),
            submitting_revisions: Default::default(),
            submitting_files: Default::default(),
            stashed_draft: None,
            failed_uploads: vec![],
        };

        Self {
            controller,
            pipeline,
            typing,
            state: Mutex::new(state),
        }
    }
}

impl Composer {
    pub fn text(&self) -> String {
        self.state.lock().text.clone()
    }

    pub fn caret(&self) -> usize {
        self.state.lock().caret
    }

    /// False if the viewer may not write into the conversation (yet).
    pub fn is_enabled(&self) -> bool {
        self.controller.can_compose()
    }

    pub fn is_typing(&self) -> bool {
        self.typing.as_ref().is_some_and(|typing| typing.is_typing())
    }

    pub fn staged_attachments(&self) -> Vec<StagedAttachment> {
        self.state.lock().staged.items().to_vec()
    }

    pub fn mention_suggestions(&self) -> Option<MentionSuggestions> {
        self.state.lock().mentions.suggestions()
    }

    /// Uploads that failed after their message was sent, ready to be retried.
    pub fn failed_uploads(&self) -> Vec<(MessageId, AttachmentOutcome)> {
        self.state.lock().failed_uploads.clone()
    }
}

impl Composer {
    pub fn update_text(&self, text: impl Into<String>, caret: usize) {
        let text = text.into();
        let text_changed = {
            let mut state = self.state.lock();
            let text_changed = state.text != text;
            if text_changed {
                state.text = text;
                state.revision += 1;
            }
            state.caret = caret.min(state.text.len());
            state.mentions.set_users(self.controller.mention_users());
            let (text, caret) = (state.text.clone(), state.caret);
            state.mentions.update(&text, caret);
            text_changed
        };

        if text_changed {
            self.handle_typing_input();
        }
    }

    pub fn move_caret(&self, caret: usize) {
        let mut state = self.state.lock();
        state.caret = caret.min(state.text.len());
        let (text, caret) = (state.text.clone(), state.caret);
        state.mentions.update(&text, caret);
    }

    /// Applies the keybindings of the composer. While mention suggestions are shown,
    /// navigation keys, Enter, Tab and Escape act on the suggestions.
    pub fn handle_key(&self, key: ComposerKey) -> KeyAction {
        let mut state = self.state.lock();

        if state.mentions.is_open() {
            match key {
                ComposerKey::ArrowUp => state.mentions.select_previous(),
                ComposerKey::ArrowDown => state.mentions.select_next(),
                ComposerKey::Escape => state.mentions.dismiss(),
                ComposerKey::Enter { .. } | ComposerKey::Tab => {
                    let text = state.text.clone();
                    if let Some(accepted) = state.mentions.accept(&text) {
                        debug!("Inserted mention of {}", accepted.user.id);
                        state.text = accepted.text;
                        state.caret = accepted.caret;
                        state.revision += 1;
                        drop(state);
                        self.handle_typing_input();
                        return KeyAction::Consumed;
                    }
                }
            }
            return KeyAction::Consumed;
        }

        match key {
            ComposerKey::Enter { shift: false } => KeyAction::Submit,
            ComposerKey::Enter { shift: true } => {
                let caret = if state.text.is_char_boundary(state.caret) {
                    state.caret
                } else {
                    state.text.len()
                };
                state.text.insert(caret, '\n');
                state.caret = caret + 1;
                state.revision += 1;
                drop(state);
                self.handle_typing_input();
                KeyAction::InsertedNewline
            }
            ComposerKey::Escape if self.controller.edit_target().is_some() => {
                drop(state);
                self.cancel_edit();
                KeyAction::Consumed
            }
            _ => KeyAction::Ignored,
        }
    }

    /// Validates and stages `files`. Files that are invalid or exceed the staging limit are
    /// reported as rejected; all others are staged.
    pub fn stage_files(&self, files: Vec<LocalFile>) -> StagingReport {
        let mut state = self.state.lock();
        self.pipeline.stage(&mut state.staged, files)
    }

    pub fn unstage(&self, id: &StagedFileId) -> Option<StagedAttachment> {
        let mut state = self.state.lock();
        if state.submitting_files.contains(id) {
            return None;
        }
        state.staged.remove(id)
    }

    /// Cancels the upload of a file of a sent message. A cancelled file is not linked.
    pub fn cancel_upload(&self, id: &StagedFileId) {
        self.pipeline.cancel(id)
    }

    /// Loads the content of one of the viewer's messages into the composer.
    pub fn begin_edit(&self, message_id: &MessageId) -> Result<(), ConversationError> {
        let target = self.controller.begin_edit(message_id)?;

        let mut state = self.state.lock();
        if state.stashed_draft.is_none() {
            state.stashed_draft = Some(state.text.clone());
        }
        state.caret = target.original_content.len();
        state.text = target.original_content;
        state.revision += 1;
        state.mentions.update("", 0);
        Ok(())
    }

    /// Leaves edit mode and restores the draft that was being written before.
    pub fn cancel_edit(&self) {
        self.controller.cancel_edit();
        self.restore_stashed_draft();
    }

    /// Clears text and staged files and stops typing.
    pub fn discard_draft(&self) {
        {
            let mut state = self.state.lock();
            state.text.clear();
            state.caret = 0;
            state.revision += 1;
            let submitting_files = state.submitting_files.clone();
            let remaining = state
                .staged
                .items()
                .iter()
                .map(|item| item.id.clone())
                .filter(|id| !submitting_files.contains(id))
                .collect::<Vec<_>>();
            state.staged.remove_all(&remaining);
            state.mentions.update("", 0);
        }
        self.stop_typing();
    }

    /// Sends the draft, or saves the edit if a message is being edited.
    ///
    /// On failure nothing is cleared so that the user can try again. Once the message is
    /// sent, the staged files are uploaded and linked to it one by one; failed files are
    /// reported in the outcome and kept for `retry_upload`.
    pub async fn submit(&self) -> Result<SubmitOutcome, ConversationError> {
        if let Some(edit_target) = self.controller.edit_target() {
            return self.submit_edit(edit_target.message_id).await;
        }

        let (content, revision, attachments) = {
            let mut state = self.state.lock();
            let content = state.text.trim().to_string();
            let attachments = state
                .staged
                .items()
                .iter()
                .filter(|item| !state.submitting_files.contains(&item.id))
                .cloned()
                .collect::<Vec<_>>();

            if content.is_empty() && attachments.is_empty() {
                return Ok(SubmitOutcome::NothingToSend);
            }
            if state.submitting_revisions.contains(&state.revision) {
                return Ok(SubmitOutcome::AlreadySubmitting);
            }

            let revision = state.revision;
            state.submitting_revisions.insert(revision);
            state
                .submitting_files
                .extend(attachments.iter().map(|item| item.id.clone()));
            (content, revision, attachments)
        };

        let reply_to_id = self
            .controller
            .reply_target()
            .map(|target| target.message_id);

        let result = self
            .controller
            .request_send(SendDraft {
                content,
                reply_to_id: reply_to_id.clone(),
                has_attachments: !attachments.is_empty(),
            })
            .await;

        let staged_ids = attachments
            .iter()
            .map(|item| item.id.clone())
            .collect::<Vec<_>>();

        let message = {
            let mut state = self.state.lock();
            state.submitting_revisions.remove(&revision);
            for id in staged_ids.iter() {
                state.submitting_files.remove(id);
            }

            let message = result?;

            // Only the send of the current draft may clear it. Text typed in the meantime
            // is kept.
            if state.revision == revision {
                state.text.clear();
                state.caret = 0;
                state.revision += 1;
                state.mentions.update("", 0);
            }
            state.staged.remove_all(&staged_ids);
            message
        };

        if let Some(reply_to_id) = reply_to_id {
            self.controller.clear_reply_target_if(&reply_to_id);
        }
        self.stop_typing();

        info!(
            "Sent message {} with {} attachment(s)",
            message.id,
            attachments.len()
        );

        let outcomes = if attachments.is_empty() {
            vec![]
        } else {
            let outcomes = self.pipeline.process(&message.id, attachments).await;
            self.handle_attachment_outcomes(&message.id, &outcomes);
            outcomes
        };

        Ok(SubmitOutcome::Sent {
            message,
            attachments: outcomes,
        })
    }

    /// Uploads and links a file that failed after its message was sent.
    pub async fn retry_upload(&self, id: &StagedFileId) -> Option<AttachmentOutcome> {
        let (message_id, staged) = {
            let mut state = self.state.lock();
            let idx = state
                .failed_uploads
                .iter()
                .position(|(_, outcome)| &outcome.staged.id == id)?;
            let (message_id, outcome) = state.failed_uploads.remove(idx);
            (message_id, outcome.staged)
        };

        let outcome = self.pipeline.retry(&message_id, staged).await;
        self.handle_attachment_outcomes(&message_id, std::slice::from_ref(&outcome));
        Some(outcome)
    }
}

impl Composer {
    async fn submit_edit(&self, message_id: MessageId) -> Result<SubmitOutcome, ConversationError> {
        let (content, revision) = {
            let mut state = self.state.lock();
            if state.submitting_revisions.contains(&state.revision) {
                return Ok(SubmitOutcome::AlreadySubmitting);
            }
            let revision = state.revision;
            state.submitting_revisions.insert(revision);
            (state.text.clone(), revision)
        };

        let result = self.controller.request_edit(&message_id, content).await;

        {
            let mut state = self.state.lock();
            state.submitting_revisions.remove(&revision);
        }

        let message = result?;
        self.restore_stashed_draft();
        self.stop_typing();

        Ok(SubmitOutcome::Edited { message })
    }

    fn restore_stashed_draft(&self) {
        let mut state = self.state.lock();
        let Some(draft) = state.stashed_draft.take() else {
            return;
        };
        state.caret = draft.len();
        state.text = draft;
        state.revision += 1;
        state.mentions.update("", 0);
    }

    fn handle_attachment_outcomes(&self, message_id: &MessageId, outcomes: &[AttachmentOutcome]) {
        {
            let mut state = self.state.lock();
            for outcome in outcomes {
                state
                    .failed_uploads
                    .retain(|(_, failed)| failed.staged.id != outcome.staged.id);
                if !outcome.is_success() {
                    state
                        .failed_uploads
                        .push((message_id.clone(), outcome.clone()));
                }
            }
        }
        self.controller
            .apply_attachment_outcomes(message_id, outcomes);
    }

    fn handle_typing_input(&self) {
        if !self.controller.can_compose() {
            return;
        }
        if let Some(typing) = &self.typing {
            typing.handle_input()
        }
    }

    fn stop_typing(&self) {
        if let Some(typing) = &self.typing {
            typing.stop()
        }
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::ops::Deref;
use std::sync::Arc;

use tracing::info;

use crate::app::deps::{AppConfig, AppDependencies};
use crate::app::services::{
    AttachmentPipeline, Composer, ConversationController, ConversationError, TimelineRenderer,
};
use crate::client_builder::{
    ChatClientBuilder, UndefinedArchiveService, UndefinedAttachmentService, UndefinedMessageStore,
    UndefinedTypingTransport,
};
use crate::domain::conversations::models::Conversation;
use crate::domain::shared::models::{ConversationId, Viewer};
use crate::ChatEvent;

#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<ChatClientInner>,
}

#[cfg_attr(feature = "test", mockall::automock)]
pub trait ChatDelegate: Send + Sync {
    fn handle_event(&self, conversation_id: ConversationId, event: ChatEvent);
}

impl ChatClient {
    pub fn builder() -> ChatClientBuilder<
        UndefinedMessageStore,
        UndefinedAttachmentService,
        UndefinedTypingTransport,
        UndefinedArchiveService,
    > {
        ChatClientBuilder::new()
    }
}

pub struct ChatClientInner {
    pub(crate) deps: AppDependencies,
    pub attachments: Arc<AttachmentPipeline>,
}

impl From<Arc<ChatClientInner>> for ChatClient {
    fn from(inner: Arc<ChatClientInner>) -> Self {
        ChatClient { inner }
    }
}

impl Deref for ChatClient {
    type Target = ChatClientInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The three parts a host needs to display one conversation. They share the same
/// controller.
pub struct OpenConversation {
    pub controller: ConversationController,
    pub composer: Composer,
    pub timeline: TimelineRenderer,
}

impl ChatClient {
    pub fn config(&self) -> &AppConfig {
        &self.deps.ctx.config
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.deps.ctx.viewer()
    }

    /// Sets the signed-in user. Conversations opened afterwards act on their behalf.
    pub fn set_viewer(&self, viewer: Option<Viewer>) {
        info!(
            "Viewer changed to {}",
            viewer
                .as_ref()
                .map(|viewer| viewer.id.to_string())
                .unwrap_or_else(|| "<none>".to_string())
        );
        self.deps.ctx.set_viewer(viewer)
    }

    /// Wires up controller, composer and timeline for `conversation` and loads its messages.
    pub async fn open_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<OpenConversation, ConversationError> {
        let controller = ConversationController::new(conversation, &self.deps);
        let composer = Composer::new(controller.clone(), self.attachments.clone(), &self.deps);
        let timeline = TimelineRenderer::new(controller.clone(), &self.deps);

        controller.open().await?;

        Ok(OpenConversation {
            controller,
            composer,
            timeline,
        })
    }
}

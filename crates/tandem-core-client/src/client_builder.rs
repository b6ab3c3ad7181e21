// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use crate::app::deps::{
    AppConfig, AppContext, AppDependencies, DynAttachmentService, DynConversationArchiveService,
    DynIdProvider, DynMessageStore, DynTimeProvider, DynTypingTransport,
};
use crate::app::event_handlers::ChatEventDispatcher;
use crate::app::services::AttachmentPipeline;
use crate::client::ChatClientInner;
use crate::domain::general::services::{IdProvider, TimeProvider};
use crate::domain::shared::models::Viewer;
use crate::infra::general::{SystemTimeProvider, UuidProvider};
use crate::{ChatClient, ChatDelegate};

pub struct UndefinedMessageStore;
pub struct UndefinedAttachmentService;
pub struct UndefinedTypingTransport;
pub struct UndefinedArchiveService;

pub struct ChatClientBuilder<S, A, T, R> {
    app_config: AppConfig,
    archive_service: R,
    attachment_service: A,
    delegate: Option<Box<dyn ChatDelegate>>,
    id_provider: DynIdProvider,
    message_store: S,
    time_provider: DynTimeProvider,
    typing_transport: T,
    viewer: Option<Viewer>,
}

impl
    ChatClientBuilder<
        UndefinedMessageStore,
        UndefinedAttachmentService,
        UndefinedTypingTransport,
        UndefinedArchiveService,
    >
{
    pub(crate) fn new() -> Self {
        ChatClientBuilder {
            app_config: Default::default(),
            archive_service: UndefinedArchiveService,
            attachment_service: UndefinedAttachmentService,
            delegate: None,
            id_provider: Arc::new(UuidProvider::default()),
            message_store: UndefinedMessageStore,
            time_provider: Arc::new(SystemTimeProvider::default()),
            typing_transport: UndefinedTypingTransport,
            viewer: None,
        }
    }
}

impl<A, T, R> ChatClientBuilder<UndefinedMessageStore, A, T, R> {
    pub fn set_message_store(
        self,
        message_store: DynMessageStore,
    ) -> ChatClientBuilder<DynMessageStore, A, T, R> {
        ChatClientBuilder {
            app_config: self.app_config,
            archive_service: self.archive_service,
            attachment_service: self.attachment_service,
            delegate: self.delegate,
            id_provider: self.id_provider,
            message_store,
            time_provider: self.time_provider,
            typing_transport: self.typing_transport,
            viewer: self.viewer,
        }
    }
}

impl<S, T, R> ChatClientBuilder<S, UndefinedAttachmentService, T, R> {
    pub fn set_attachment_service(
        self,
        attachment_service: DynAttachmentService,
    ) -> ChatClientBuilder<S, DynAttachmentService, T, R> {
        ChatClientBuilder {
            app_config: self.app_config,
            archive_service: self.archive_service,
            attachment_service,
            delegate: self.delegate,
            id_provider: self.id_provider,
            message_store: self.message_store,
            time_provider: self.time_provider,
            typing_transport: self.typing_transport,
            viewer: self.viewer,
        }
    }
}

impl<S, A, R> ChatClientBuilder<S, A, UndefinedTypingTransport, R> {
    pub fn set_typing_transport(
        self,
        typing_transport: DynTypingTransport,
    ) -> ChatClientBuilder<S, A, DynTypingTransport, R> {
        ChatClientBuilder {
            app_config: self.app_config,
            archive_service: self.archive_service,
            attachment_service: self.attachment_service,
            delegate: self.delegate,
            id_provider: self.id_provider,
            message_store: self.message_store,
            time_provider: self.time_provider,
            typing_transport,
            viewer: self.viewer,
        }
    }
}

impl<S, A, T> ChatClientBuilder<S, A, T, UndefinedArchiveService> {
    pub fn set_archive_service(
        self,
        archive_service: DynConversationArchiveService,
    ) -> ChatClientBuilder<S, A, T, DynConversationArchiveService> {
        ChatClientBuilder {
            app_config: self.app_config,
            archive_service,
            attachment_service: self.attachment_service,
            delegate: self.delegate,
            id_provider: self.id_provider,
            message_store: self.message_store,
            time_provider: self.time_provider,
            typing_transport: self.typing_transport,
            viewer: self.viewer,
        }
    }
}

impl<S, A, T, R> ChatClientBuilder<S, A, T, R> {
    pub fn set_id_provider<P: IdProvider + 'static>(mut self, id_provider: P) -> Self {
        self.id_provider = Arc::new(id_provider);
        self
    }

    pub fn set_time_provider<P: TimeProvider + 'static>(mut self, time_provider: P) -> Self {
        self.time_provider = Arc::new(time_provider);
        self
    }

    pub fn set_config(mut self, config: AppConfig) -> Self {
        self.app_config = config;
        self
    }

    pub fn set_delegate(mut self, delegate: Option<Box<dyn ChatDelegate>>) -> Self {
        self.delegate = delegate;
        self
    }

    pub fn set_viewer(mut self, viewer: Option<Viewer>) -> Self {
        self.viewer = viewer;
        self
    }
}

impl
    ChatClientBuilder<
        DynMessageStore,
        DynAttachmentService,
        DynTypingTransport,
        DynConversationArchiveService,
    >
{
    pub fn build(self) -> ChatClient {
        let ctx = AppContext::new(self.app_config);
        ctx.set_viewer(self.viewer);

        let dependencies = AppDependencies {
            archive_service: self.archive_service,
            attachment_service: self.attachment_service,
            ctx: Arc::new(ctx),
            event_dispatcher: Arc::new(ChatEventDispatcher::new(self.delegate)),
            id_provider: self.id_provider,
            message_store: self.message_store,
            time_provider: self.time_provider,
            typing_transport: self.typing_transport,
        };

        let client_inner = Arc::new(ChatClientInner {
            attachments: Arc::new(AttachmentPipeline::from(&dependencies)),
            deps: dependencies,
        });

        ChatClient::from(client_inner)
    }
}

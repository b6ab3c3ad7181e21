// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use crate::app::deps::app_context::AppContext;
use crate::app::event_handlers::ChatEventDispatcher;
use crate::domain::conversations::services::ConversationArchiveService;
use crate::domain::general::services::{IdProvider, TimeProvider};
use crate::domain::messaging::services::MessageStore;
use crate::domain::typing::services::TypingTransport;
use crate::domain::uploads::services::AttachmentService;

pub type DynAppContext = Arc<AppContext>;
pub type DynAttachmentService = Arc<dyn AttachmentService>;
pub type DynChatEventDispatcher = Arc<ChatEventDispatcher>;
pub type DynConversationArchiveService = Arc<dyn ConversationArchiveService>;
pub type DynIdProvider = Arc<dyn IdProvider>;
pub type DynMessageStore = Arc<dyn MessageStore>;
pub type DynTimeProvider = Arc<dyn TimeProvider>;
pub type DynTypingTransport = Arc<dyn TypingTransport>;

#[derive(Clone)]
pub struct AppDependencies {
    pub archive_service: DynConversationArchiveService,
    pub attachment_service: DynAttachmentService,
    pub ctx: DynAppContext,
    pub event_dispatcher: DynChatEventDispatcher,
    pub id_provider: DynIdProvider,
    pub message_store: DynMessageStore,
    pub time_provider: DynTimeProvider,
    pub typing_transport: DynTypingTransport,
}

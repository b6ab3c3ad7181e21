// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

/// Lifecycle of an open conversation. `Ready` covers both the idle and the sending
/// sub-state; see `ConversationController::is_sending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationPhase {
    #[default]
    Closed,
    Loading,
    Ready,
}

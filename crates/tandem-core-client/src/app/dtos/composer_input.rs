// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::messaging::models::MentionUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerKey {
    Enter { shift: bool },
    Tab,
    ArrowUp,
    ArrowDown,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// The host should call `Composer::submit`.
    Submit,
    InsertedNewline,
    /// The key was handled by the mention suggestion list.
    Consumed,
    /// The key has no meaning to the composer.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSuggestions {
    pub query: String,
    pub users: Vec<MentionUser>,
    pub selected_index: usize,
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::UserId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SenderRole {
    Organization,
    Counterpart,
    System,
}

/// The user the conversation is being displayed for, as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
    pub id: UserId,
    pub role: SenderRole,
}

impl Viewer {
    pub fn new(id: impl Into<UserId>, role: SenderRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

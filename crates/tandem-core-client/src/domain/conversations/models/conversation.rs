// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::messaging::models::MentionUser;
use crate::domain::shared::models::{ConversationId, SenderRole, TopicId, UserId, Viewer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub display_name: String,
    pub avatar: Option<Url>,
}

/// External context a conversation was started from, e.g. a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedTopic {
    pub id: TopicId,
    pub title: String,
}

/// A two-party thread between an organization-side user and a counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub organization: Participant,
    pub counterpart: Participant,
    /// Until this is set the counterpart can read but not write.
    pub counterpart_can_reply: bool,
    pub topic: Option<LinkedTopic>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn participant(&self, user_id: &UserId) -> Option<&Participant> {
        [&self.organization, &self.counterpart]
            .into_iter()
            .find(|participant| &participant.id == user_id)
    }

    /// Returns the participant on the other side of `viewer`.
    pub fn other_participant(&self, viewer: &Viewer) -> &Participant {
        if viewer.id == self.organization.id {
            &self.counterpart
        } else {
            &self.organization
        }
    }

    pub fn can_compose(&self, viewer: &Viewer) -> bool {
        if self.is_archived() {
            return false;
        }

        match viewer.role {
            SenderRole::Organization => true,
            SenderRole::Counterpart => self.counterpart_can_reply,
            SenderRole::System => false,
        }
    }

    /// Display name of a message sender. Falls back to the raw id for users that are not
    /// part of the conversation.
    pub fn display_name(&self, user_id: &UserId, role: SenderRole) -> String {
        if let Some(participant) = self.participant(user_id) {
            return participant.display_name.clone();
        }

        match role {
            SenderRole::System => "System".to_string(),
            SenderRole::Organization | SenderRole::Counterpart => user_id.to_string(),
        }
    }

    /// Like `display_name` but refers to `viewer_id` as "You".
    pub fn display_name_for_viewer(
        &self,
        viewer_id: &UserId,
        user_id: &UserId,
        role: SenderRole,
    ) -> String {
        if user_id == viewer_id {
            return "You".to_string();
        }
        self.display_name(user_id, role)
    }

    /// Participants that `viewer` can mention, i.e. everybody but themselves.
    pub fn mention_users(&self, viewer: &Viewer) -> Vec<MentionUser> {
        [&self.organization, &self.counterpart]
            .into_iter()
            .filter(|participant| participant.id != viewer.id)
            .map(|participant| MentionUser {
                id: participant.id.clone(),
                display_name: participant.display_name.clone(),
                avatar: participant.avatar.clone(),
            })
            .collect()
    }
}

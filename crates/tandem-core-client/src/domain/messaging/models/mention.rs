// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::ops::Range;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::shared::models::UserId;

const MENTION_PREFIX: &str = "<@";
const MENTION_SUFFIX: char = '>';

/// Read-only projection of a participant, used for mention autocompletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionUser {
    pub id: UserId,
    pub display_name: String,
    pub avatar: Option<Url>,
}

/// A canonical mention token found in a message body. `range` is a byte range into the
/// body and covers the whole token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSpan {
    pub user_id: UserId,
    pub range: Range<usize>,
}

/// Returns the canonical token that is stored in a message body for a mention of `user_id`.
pub fn format_mention(user_id: &UserId) -> String {
    format!("{MENTION_PREFIX}{user_id}{MENTION_SUFFIX}")
}

/// Finds all canonical mention tokens in `body`.
pub fn parse_mentions(body: &str) -> Vec<MentionSpan> {
    let mut spans = vec![];
    let mut offset = 0;

    while let Some(start) = body[offset..].find(MENTION_PREFIX) {
        let start = offset + start;
        let id_start = start + MENTION_PREFIX.len();

        let Some(id_len) = body[id_start..].find(MENTION_SUFFIX) else {
            break;
        };
        let id = &body[id_start..id_start + id_len];

        if id.is_empty() || id.contains(char::is_whitespace) || id.contains(MENTION_PREFIX) {
            offset = id_start;
            continue;
        }

        let end = id_start + id_len + MENTION_SUFFIX.len_utf8();
        spans.push(MentionSpan {
            user_id: UserId::from(id),
            range: start..end,
        });
        offset = end;
    }

    spans
}

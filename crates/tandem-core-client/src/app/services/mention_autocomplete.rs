// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::ops::Range;

use crate::app::dtos::MentionSuggestions;
use crate::domain::messaging::models::{format_mention, MentionUser};

#[derive(Debug, Clone, PartialEq)]
struct ActiveMention {
    /// Byte range of `@query` in the draft, ending at the caret.
    range: Range<usize>,
    query: String,
    matches: Vec<MentionUser>,
    selected_index: usize,
}

/// Draft text and caret after accepting a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedMention {
    pub text: String,
    pub caret: usize,
    pub user: MentionUser,
}

#[derive(Debug, Clone)]
pub struct MentionAutocomplete {
    users: Vec<MentionUser>,
    active: Option<ActiveMention>,
    /// Start of the `@query` the user dismissed. Stays dismissed while it is being typed.
    dismissed_start: Option<usize>,
}

impl MentionAutocomplete {
    pub fn new(users: Vec<MentionUser>) -> Self {
        Self {
            users,
            active: None,
            dismissed_start: None,
        }
    }

    pub fn set_users(&mut self, users: Vec<MentionUser>) {
        if self.users != users {
            self.users = users;
            self.active = None;
        }
    }

    /// Re-evaluates the draft after the text or the caret changed.
    pub fn update(&mut self, text: &str, caret: usize) {
        let Some((start, query)) = detect_mention_query(text, caret) else {
            self.active = None;
            self.dismissed_start = None;
            return;
        };

        if self.dismissed_start == Some(start) {
            self.active = None;
            return;
        }
        self.dismissed_start = None;

        let query_lowercase = query.to_lowercase();
        let matches = self
            .users
            .iter()
            .filter(|user| user.display_name.to_lowercase().starts_with(&query_lowercase))
            .cloned()
            .collect::<Vec<_>>();

        if matches.is_empty() {
            self.active = None;
            return;
        }

        let selected_index = match &self.active {
            Some(active) if active.range.start == start => {
                active.selected_index.min(matches.len() - 1)
            }
            _ => 0,
        };

        self.active = Some(ActiveMention {
            range: start..caret,
            query: query.to_string(),
            matches,
            selected_index,
        })
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn suggestions(&self) -> Option<MentionSuggestions> {
        self.active.as_ref().map(|active| MentionSuggestions {
            query: active.query.clone(),
            users: active.matches.clone(),
            selected_index: active.selected_index,
        })
    }

    pub fn select_next(&mut self) {
        if let Some(active) = &mut self.active {
            active.selected_index = (active.selected_index + 1) % active.matches.len();
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(active) = &mut self.active {
            let count = active.matches.len();
            active.selected_index = (active.selected_index + count - 1) % count;
        }
    }

    pub fn dismiss(&mut self) {
        if let Some(active) = self.active.take() {
            self.dismissed_start = Some(active.range.start);
        }
    }

    /// Replaces the `@query` with the canonical mention token of the selected user,
    /// followed by a space, and closes the suggestions.
    pub fn accept(&mut self, text: &str) -> Option<AcceptedMention> {
        let active = self.active.take()?;
        let user = active.matches.get(active.selected_index)?.clone();

        if text.get(active.range.clone()).is_none() {
            return None;
        }

        let token = format!("{} ", format_mention(&user.id));
        let mut text = text.to_string();
        text.replace_range(active.range.clone(), &token);

        Some(AcceptedMention {
            caret: active.range.start + token.len(),
            text,
            user,
        })
    }
}

/// Finds an unterminated `@query` that ends at the caret. The `@` must start the text or
/// follow whitespace and the query must not contain whitespace.
fn detect_mention_query(text: &str, caret: usize) -> Option<(usize, &str)> {
    let before_caret = text.get(..caret)?;
    let start = before_caret.rfind('@')?;
    let query = &before_caret[start + 1..];

    if query.contains(char::is_whitespace) {
        return None;
    }

    let preceded_by_whitespace = before_caret[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);

    preceded_by_whitespace.then_some((start, query))
}

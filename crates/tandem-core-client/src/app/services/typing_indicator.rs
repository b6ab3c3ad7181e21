// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, Duration, Utc};

use crate::domain::shared::models::UserId;
use crate::domain::typing::models::TypingSignal;

/// Tracks whether the counterpart is typing.
///
/// The publisher's `false` signal hides the indicator. In case that signal gets lost the
/// indicator hides itself after `max_display`.
#[derive(Debug, Clone)]
pub struct TypingIndicator {
    watched_user_id: UserId,
    max_display: Duration,
    typing_since: Option<DateTime<Utc>>,
    generation: u64,
}

impl TypingIndicator {
    pub fn new(watched_user_id: UserId, max_display: Duration) -> Self {
        Self {
            watched_user_id,
            max_display,
            typing_since: None,
            generation: 0,
        }
    }

    pub fn watched_user_id(&self) -> &UserId {
        &self.watched_user_id
    }

    pub fn max_display(&self) -> Duration {
        self.max_display
    }

    /// Applies a signal and returns the generation of the indicator if the signal started
    /// or restarted it. Signals of other users are ignored.
    pub fn handle_signal(&mut self, signal: &TypingSignal, now: DateTime<Utc>) -> Option<u64> {
        if signal.user_id != self.watched_user_id {
            return None;
        }

        self.generation += 1;

        if signal.is_typing {
            self.typing_since = Some(now);
            Some(self.generation)
        } else {
            self.typing_since = None;
            None
        }
    }

    /// Hides the indicator if it was not touched since `generation`. Returns true if it
    /// was hidden by this call.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.typing_since.is_none() {
            return false;
        }
        self.typing_since = None;
        true
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.typing_since
            .is_some_and(|since| now - since < self.max_display)
    }

    pub fn reset(&mut self) {
        self.typing_since = None;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::test::mock_data;

    use super::*;

    fn signal(user_id: UserId, is_typing: bool) -> TypingSignal {
        TypingSignal {
            conversation_id: mock_data::conversation_id(),
            user_id,
            is_typing,
        }
    }

    #[test]
    fn test_ignores_own_signals() {
        let now = mock_data::reference_date();
        let mut indicator =
            TypingIndicator::new(mock_data::counterpart_id(), Duration::seconds(10));

        assert_eq!(
            indicator.handle_signal(&signal(mock_data::organization_id(), true), now),
            None
        );
        assert!(!indicator.is_visible(now));

        assert!(indicator
            .handle_signal(&signal(mock_data::counterpart_id(), true), now)
            .is_some());
        assert!(indicator.is_visible(now));

        indicator.handle_signal(&signal(mock_data::counterpart_id(), false), now);
        assert!(!indicator.is_visible(now));
    }

    #[test]
    fn test_hides_after_max_display() {
        let now = mock_data::reference_date();
        let mut indicator =
            TypingIndicator::new(mock_data::counterpart_id(), Duration::seconds(10));

        indicator.handle_signal(&signal(mock_data::counterpart_id(), true), now);

        assert!(indicator.is_visible(now + Duration::seconds(9)));
        assert!(!indicator.is_visible(now + Duration::seconds(10)));
    }

    #[test]
    fn test_expire_ignores_outdated_generations() {
        let now = mock_data::reference_date();
        let mut indicator =
            TypingIndicator::new(mock_data::counterpart_id(), Duration::seconds(10));

        let first = indicator
            .handle_signal(&signal(mock_data::counterpart_id(), true), now)
            .unwrap();
        let second = indicator
            .handle_signal(&signal(mock_data::counterpart_id(), true), now)
            .unwrap();

        assert!(!indicator.expire(first));
        assert!(indicator.is_visible(now));
        assert!(indicator.expire(second));
        assert!(!indicator.is_visible(now));
        assert!(!indicator.expire(second));
    }
}

// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// A transition that must be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingEdge {
    Started,
    Stopped,
}

impl TypingEdge {
    pub fn is_typing(self) -> bool {
        self == TypingEdge::Started
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOutcome {
    /// `Some(Started)` on the Idle → Typing edge only.
    pub edge: Option<TypingEdge>,
    /// The token of the silence timer that was (re)started by this input.
    pub token: TimerToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Typing {
        token: TimerToken,
        deadline: DateTime<Utc>,
    },
}

/// Idle → Typing → Idle state machine of the local user's typing signal.
///
/// Every input restarts the silence timer by issuing a new token. A timer that fires with a
/// token that has since been replaced does nothing.
#[derive(Debug, Clone)]
pub struct TypingStateMachine {
    state: State,
    last_token: u64,
    idle_timeout: Duration,
}

impl TypingStateMachine {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            state: State::Idle,
            last_token: 0,
            idle_timeout,
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.state, State::Typing { .. })
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn handle_input(&mut self, now: DateTime<Utc>) -> InputOutcome {
        let edge = (!self.is_typing()).then_some(TypingEdge::Started);
        let token = self.next_token();

        self.state = State::Typing {
            token,
            deadline: now + self.idle_timeout,
        };

        InputOutcome { edge, token }
    }

    /// Called when the silence timer identified by `token` fires.
    pub fn expire(&mut self, token: TimerToken) -> Option<TypingEdge> {
        match self.state {
            State::Typing { token: current, .. } if current == token => self.stop(),
            _ => None,
        }
    }

    /// Expires the silence timer if its deadline has passed. For hosts that drive the
    /// timer from their own event loop instead of a spawned task.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<TypingEdge> {
        match self.state {
            State::Typing { deadline, .. } if now >= deadline => self.stop(),
            _ => None,
        }
    }

    /// Forces the transition to Idle, e.g. after a send or an explicit cancel.
    pub fn stop(&mut self) -> Option<TypingEdge> {
        if !self.is_typing() {
            return None;
        }
        self.state = State::Idle;
        // Invalidates any pending timer.
        self.next_token();
        Some(TypingEdge::Stopped)
    }

    fn next_token(&mut self) -> TimerToken {
        self.last_token += 1;
        TimerToken(self.last_token)
    }
}

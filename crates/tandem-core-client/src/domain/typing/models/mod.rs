// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use typing_signal::TypingSignal;
pub use typing_state_machine::{InputOutcome, TimerToken, TypingEdge, TypingStateMachine};

mod typing_signal;
mod typing_state_machine;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of one turn. `Awaiting`, `Dispatched`, and `Composing` are the
/// busy states: while one of them is active the conversation refuses new
/// submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    Awaiting,
    Rejected,
    Dispatched,
    Composing,
    Settled,
}

impl TurnState {
    pub fn accepts_submission(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Awaiting | Self::Dispatched | Self::Composing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    SubmissionReceived,
    GuardrailRejected,
    GuardrailAllowed,
    ToolRoundStarted,
    CompletionReceived,
    TurnFailed,
    TurnClosed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnTransition {
    pub from: TurnState,
    pub to: TurnState,
    pub event: TurnEvent,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid turn transition from {state:?} using event {event:?}")]
pub struct TurnTransitionError {
    pub state: TurnState,
    pub event: TurnEvent,
}

pub fn transition(
    current: TurnState,
    event: TurnEvent,
) -> Result<TurnTransition, TurnTransitionError> {
    use TurnEvent::{
        CompletionReceived, GuardrailAllowed, GuardrailRejected, SubmissionReceived,
        ToolRoundStarted, TurnClosed, TurnFailed,
    };
    use TurnState::{Awaiting, Composing, Dispatched, Idle, Rejected, Settled};

    let to = match (current, event) {
        (Idle, SubmissionReceived) => Awaiting,
        (Awaiting, GuardrailRejected) => Rejected,
        (Awaiting, GuardrailAllowed) => Dispatched,
        (Dispatched, ToolRoundStarted) | (Composing, ToolRoundStarted) => Composing,
        (Dispatched, CompletionReceived) | (Composing, CompletionReceived) => Settled,
        (Awaiting, TurnFailed) | (Dispatched, TurnFailed) | (Composing, TurnFailed) => Settled,
        (Rejected, TurnClosed) | (Settled, TurnClosed) => Idle,
        _ => return Err(TurnTransitionError { state: current, event }),
    };

    Ok(TurnTransition { from: current, to, event })
}

#[cfg(test)]
mod tests {
    use super::{transition, TurnEvent, TurnState, TurnTransitionError};

    fn run(events: &[TurnEvent]) -> TurnState {
        let mut state = TurnState::Idle;
        for event in events {
            state = transition(state, *event).expect("valid transition").to;
        }
        state
    }

    #[test]
    fn plain_answer_path_returns_to_idle() {
        let state = run(&[
            TurnEvent::SubmissionReceived,
            TurnEvent::GuardrailAllowed,
            TurnEvent::CompletionReceived,
            TurnEvent::TurnClosed,
        ]);
        assert_eq!(state, TurnState::Idle);
    }

    #[test]
    fn tool_rounds_stay_in_composing_until_the_final_answer() {
        let mut state = run(&[TurnEvent::SubmissionReceived, TurnEvent::GuardrailAllowed]);
        assert_eq!(state, TurnState::Dispatched);

        state = transition(state, TurnEvent::ToolRoundStarted).expect("first round").to;
        assert_eq!(state, TurnState::Composing);
        state = transition(state, TurnEvent::ToolRoundStarted).expect("second round").to;
        assert_eq!(state, TurnState::Composing);

        state = transition(state, TurnEvent::CompletionReceived).expect("final answer").to;
        assert_eq!(state, TurnState::Settled);
    }

    #[test]
    fn rejection_path_returns_to_idle() {
        let state = run(&[
            TurnEvent::SubmissionReceived,
            TurnEvent::GuardrailRejected,
            TurnEvent::TurnClosed,
        ]);
        assert_eq!(state, TurnState::Idle);
    }

    #[test]
    fn failure_is_reachable_from_every_open_state() {
        for prefix in [
            vec![TurnEvent::SubmissionReceived],
            vec![TurnEvent::SubmissionReceived, TurnEvent::GuardrailAllowed],
            vec![
                TurnEvent::SubmissionReceived,
                TurnEvent::GuardrailAllowed,
                TurnEvent::ToolRoundStarted,
            ],
        ] {
            let mut state = run(&prefix);
            state = transition(state, TurnEvent::TurnFailed).expect("failure transition").to;
            assert_eq!(state, TurnState::Settled);
        }
    }

    #[test]
    fn busy_states_refuse_submissions() {
        assert!(TurnState::Idle.accepts_submission());
        for state in [TurnState::Awaiting, TurnState::Dispatched, TurnState::Composing] {
            assert!(state.is_busy());
            assert!(!state.accepts_submission());
            assert_eq!(
                transition(state, TurnEvent::SubmissionReceived),
                Err(TurnTransitionError { state, event: TurnEvent::SubmissionReceived }),
            );
        }
    }

    #[test]
    fn settled_only_accepts_close() {
        assert!(transition(TurnState::Settled, TurnEvent::CompletionReceived).is_err());
        assert!(transition(TurnState::Settled, TurnEvent::TurnFailed).is_err());
        let closed = transition(TurnState::Settled, TurnEvent::TurnClosed).expect("close");
        assert_eq!(closed.to, TurnState::Idle);
    }
}

use crate::error::StateMachineError;

/// Run loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Running,
    Stopped,
}

/// Validates a run loop transition.
///
/// `Stopped` is terminal; operation failures never drive a transition, only
/// the stop signal or an exhausted request budget does.
pub fn validate_transition(from: RunState, to: RunState) -> Result<(), StateMachineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: RunState) -> &'static [RunState] {
    use RunState::*;
    match from {
        Running => &[Running, Stopped],
        Stopped => &[],
    }
}

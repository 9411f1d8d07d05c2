use chaos_core::state_machine::{allowed_transitions, validate_transition, RunState};
use chaos_core::StateMachineError;
use proptest::prelude::*;

#[test]
fn test_running_transitions() {
    assert!(validate_transition(RunState::Running, RunState::Running).is_ok());
    assert!(validate_transition(RunState::Running, RunState::Stopped).is_ok());
}

#[test]
fn test_stopped_is_terminal() {
    assert!(allowed_transitions(RunState::Stopped).is_empty());
    assert_eq!(
        validate_transition(RunState::Stopped, RunState::Running),
        Err(StateMachineError::IllegalTransition {
            from: RunState::Stopped,
            to: RunState::Running,
        })
    );
    assert!(validate_transition(RunState::Stopped, RunState::Stopped).is_err());
}

proptest! {
    #[test]
    fn prop_all_transitions_are_subset_of_allowed(
        from in prop_oneof![Just(RunState::Running), Just(RunState::Stopped)],
        to in prop_oneof![Just(RunState::Running), Just(RunState::Stopped)],
    ) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        prop_assert_eq!(res.is_ok(), allowed.contains(&to));
    }
}

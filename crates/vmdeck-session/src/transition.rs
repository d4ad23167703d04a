use serde::{Deserialize, Serialize};

use vmdeck_types::SessionState;

use crate::error::{SessionError, NO_GUEST};

/// Operator actions that move the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Select,
    Start,
    Pause,
    Reset,
    Stop,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Select => write!(f, "select"),
            Action::Start => write!(f, "start"),
            Action::Pause => write!(f, "pause"),
            Action::Reset => write!(f, "reset"),
            Action::Stop => write!(f, "stop"),
        }
    }
}

/// The lifecycle transition table.
///
/// `has_guest` is whether a guest is selected before the action; `Select`
/// always supplies one.
pub fn transition(state: SessionState, action: Action, has_guest: bool) -> Result<SessionState, SessionError> {
    use SessionState::*;

    match action {
        Action::Select => Ok(Selected),
        Action::Start => match state {
            _ if !has_guest => Err(SessionError::invalid(action, state, NO_GUEST)),
            Selected | Paused | Stopped => Ok(Running),
            Running => Err(SessionError::invalid(action, state, "session is already running")),
            Idle => Err(SessionError::invalid(action, state, NO_GUEST)),
        },
        Action::Pause => match state {
            Running => Ok(Paused),
            _ => Err(SessionError::invalid(action, state, "only a running session can be paused")),
        },
        Action::Reset => {
            if has_guest {
                Ok(Running)
            } else {
                Err(SessionError::invalid(action, state, NO_GUEST))
            }
        }
        Action::Stop => match state {
            Running | Paused => Ok(Stopped),
            _ => Err(SessionError::invalid(action, state, "session is not running or paused")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    #[test]
    fn test_happy_path() {
        assert_eq!(transition(Idle, Action::Select, false), Ok(Selected));
        assert_eq!(transition(Selected, Action::Start, true), Ok(Running));
        assert_eq!(transition(Running, Action::Pause, true), Ok(Paused));
        assert_eq!(transition(Paused, Action::Start, true), Ok(Running));
        assert_eq!(transition(Running, Action::Stop, true), Ok(Stopped));
        assert_eq!(transition(Stopped, Action::Start, true), Ok(Running));
        assert_eq!(transition(Stopped, Action::Select, true), Ok(Selected));
    }

    #[test]
    fn test_start_without_guest() {
        let err = transition(Idle, Action::Start, false).unwrap_err();
        assert!(err.is_missing_guest());
        assert_eq!(err.to_string(), "cannot start while idle: no operating system selected");
    }

    #[test]
    fn test_rejections() {
        assert!(transition(Idle, Action::Pause, false).is_err());
        assert!(transition(Paused, Action::Pause, true).is_err());
        assert!(transition(Running, Action::Start, true).is_err());
        assert!(transition(Selected, Action::Stop, true).is_err());
        assert!(transition(Stopped, Action::Stop, true).is_err());
        assert!(transition(Idle, Action::Reset, false).unwrap_err().is_missing_guest());
    }

    #[test]
    fn test_reset_from_any_state_with_guest() {
        for state in [Selected, Running, Paused, Stopped] {
            assert_eq!(transition(state, Action::Reset, true), Ok(Running));
        }
    }
}

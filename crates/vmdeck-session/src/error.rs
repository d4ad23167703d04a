use thiserror::Error;

use vmdeck_types::SessionState;

use crate::transition::Action;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {state}: {reason}")]
    InvalidTransition {
        action: Action,
        state: SessionState,
        reason: &'static str,
    },
}

impl SessionError {
    pub(crate) fn invalid(action: Action, state: SessionState, reason: &'static str) -> Self {
        SessionError::InvalidTransition { action, state, reason }
    }

    /// The rejection was caused by a missing guest rather than the state
    pub fn is_missing_guest(&self) -> bool {
        matches!(self, SessionError::InvalidTransition { reason, .. } if *reason == NO_GUEST)
    }
}

pub(crate) const NO_GUEST: &str = "no operating system selected";

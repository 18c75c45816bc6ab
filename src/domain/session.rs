use std::error::Error;
use std::fmt;

use serde::Serialize;

/// Lifecycle of the per-user "current workout".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoActiveSession,
    InProgress,
    Completed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::NoActiveSession => "no_active_session",
            SessionState::InProgress => "in_progress",
            SessionState::Completed => "completed",
        }
    }

    /// State of a stored session, derived from its end duration.
    pub fn of_session(duration: Option<i64>) -> Self {
        match duration {
            Some(_) => SessionState::Completed,
            None => SessionState::InProgress,
        }
    }

    /// State of a user given the open session, if any.
    pub fn of_user(active_session: Option<i64>) -> Self {
        match active_session {
            Some(_) => SessionState::InProgress,
            None => SessionState::NoActiveSession,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed)
    }

    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::NoActiveSession, SessionState::InProgress)
                | (SessionState::InProgress, SessionState::Completed)
                // Ending twice re-stamps the duration.
                | (SessionState::Completed, SessionState::Completed)
                | (SessionState::InProgress, SessionState::NoActiveSession)
                | (SessionState::Completed, SessionState::NoActiveSession)
        )
    }

    pub fn validate_transition(self, next: SessionState) -> Result<(), InvalidSessionTransition> {
        if self.can_transition_to(next) {
            return Ok(());
        }

        Err(InvalidSessionTransition {
            from: self,
            to: next,
        })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSessionTransition {
    pub from: SessionState,
    pub to: SessionState,
}

impl fmt::Display for InvalidSessionTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid session transition: {} -> {}", self.from, self.to)
    }
}

impl Error for InvalidSessionTransition {}

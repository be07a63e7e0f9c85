//! Handle lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};

/// Lifecycle state of a [`LibraryHandle`](crate::LibraryHandle).
///
/// `Unopened` only exists during construction; a handle observable by a
/// caller is either `Open` or `Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    /// Pre-open state used while a handle is being constructed.
    Unopened,
    /// The underlying mapping is live; resolution is valid.
    Open,
    /// The mapping has been released. Terminal.
    Closed,
}

impl HandleState {
    /// Convert to string representation.
    pub fn as_str(&self) -> &str {
        match self {
            HandleState::Unopened => "unopened",
            HandleState::Open => "open",
            HandleState::Closed => "closed",
        }
    }

    /// Whether no transition can leave this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandleState::Closed)
    }

    /// Validate and perform a state transition.
    ///
    /// The only legal transitions are `Unopened -> Open` and
    /// `Open -> Closed`. Every rejected transition reachable at runtime
    /// involves a closed handle, so rejections surface as
    /// [`LoaderError::UseAfterClose`].
    pub(crate) fn transition(self, to: HandleState) -> Result<HandleState> {
        match (self, to) {
            (HandleState::Unopened, HandleState::Open) => Ok(to),
            (HandleState::Open, HandleState::Closed) => Ok(to),
            (from, to) => Err(LoaderError::UseAfterClose(format!(
                "invalid handle state transition: {} -> {}",
                from, to
            ))),
        }
    }
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

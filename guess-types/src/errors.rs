use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Why a submitted guess was refused. A rejected guess consumes no attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RejectionReason {
    /// Input is not a number / not all digits.
    Malformed { input: String },
    /// Numeric guess outside `[low, high]`.
    OutOfRange { low: u32, high: u32 },
    /// Code guess with the wrong number of digits.
    WrongLength { expected: u32, actual: u32 },
    /// The round already ended; start a new one first.
    RoundOver,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::Malformed { input } => write!(f, "not a valid guess: {:?}", input),
            RejectionReason::OutOfRange { low, high } => {
                write!(f, "enter a valid number between {} and {}", low, high)
            }
            RejectionReason::WrongLength { expected, actual } => {
                write!(f, "expected {} digits, got {}", expected, actual)
            }
            RejectionReason::RoundOver => f.write_str("round is over, start a new one"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SessionError {
    InvalidCallsign { callsign: String },
    SessionNotFound { session_id: String },
    RoundInProgress,
    RevealDisabled,
    InternalError { message: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidCallsign { callsign } => {
                write!(f, "invalid callsign {:?}: use three letters", callsign)
            }
            SessionError::SessionNotFound { session_id } => {
                write!(f, "session not found: {}", session_id)
            }
            SessionError::RoundInProgress => f.write_str("current round still in progress"),
            SessionError::RevealDisabled => f.write_str("secret reveal is disabled"),
            SessionError::InternalError { message } => write!(f, "internal error: {}", message),
        }
    }
}

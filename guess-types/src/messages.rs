use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameMode, PlayerStats, RoundStart, RoundView, SessionId};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSessionRequest {
    pub callsign: String,
    pub mode: GameMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmitGuessRequest {
    pub input: String,
}

/// What the browser sees of a session. Never carries the secret.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionView {
    pub session_id: SessionId,
    pub callsign: String,
    pub round: RoundView,
    pub stats: PlayerStats,
}

/// Reply to session creation: the session plus the opening round's lines
/// and cues.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionCreated {
    pub session: SessionView,
    pub start: RoundStart,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevealResponse {
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

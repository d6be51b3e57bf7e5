use guess_core::EngineError;
use guess_types::{ErrorResponse, SessionError};
use thiserror::Error;
use warp::http::StatusCode;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Session(SessionError),
    #[error("unknown game mode: {0}")]
    InvalidMode(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::RoundInProgress => ApiError::Session(SessionError::RoundInProgress),
            EngineError::Scoring(e) => ApiError::Session(SessionError::InternalError {
                message: e.to_string(),
            }),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidMode(_) => StatusCode::BAD_REQUEST,
            ApiError::Session(err) => match err {
                SessionError::InvalidCallsign { .. } => StatusCode::BAD_REQUEST,
                SessionError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
                SessionError::RoundInProgress => StatusCode::CONFLICT,
                SessionError::RevealDisabled => StatusCode::FORBIDDEN,
                SessionError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_reply(&self) -> warp::reply::WithStatus<warp::reply::Json> {
        warp::reply::with_status(
            warp::reply::json(&ErrorResponse {
                error: self.to_string(),
            }),
            self.status(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_statuses() {
        let err = ApiError::from(EngineError::RoundInProgress);
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::from(EngineError::Scoring(guess_core::ScoringError::ShapeMismatch {
            expected: "a number".to_string(),
            actual: "a 3-digit code".to_string(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("shape mismatch"));
    }

    #[test]
    fn test_session_errors_map_to_statuses() {
        let not_found = ApiError::from(SessionError::SessionNotFound {
            session_id: "abc".to_string(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(SessionError::RevealDisabled).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::InvalidMode("roulette".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}

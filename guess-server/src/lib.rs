use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Filter;

use crate::error::ApiError;
use crate::session_manager::SessionManager;
use guess_types::{CreateSessionRequest, GameMode, SubmitGuessRequest};

pub mod config;
pub mod error;
pub mod session_manager;

#[derive(Deserialize)]
struct StatsQuery {
    mode: Option<String>,
}

const MAX_BODY_BYTES: u64 = 4 * 1024;

fn json_reply<T: Serialize>(
    result: Result<T, ApiError>,
    success: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), success),
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!("Request failed: {}", err);
            }
            err.to_reply()
        }
    }
}

pub fn create_routes(
    session_manager: Arc<SessionManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let manager_filter = warp::any().map({
        let session_manager = session_manager.clone();
        move || session_manager.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let create_session = warp::path("sessions")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<CreateSessionRequest>())
        .and(manager_filter.clone())
        .and_then(handle_create_session);

    let get_session = warp::path!("sessions" / Uuid)
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_get_session);

    let submit_guess = warp::path!("sessions" / Uuid / "guesses")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json::<SubmitGuessRequest>())
        .and(manager_filter.clone())
        .and_then(handle_submit_guess);

    let new_round = warp::path!("sessions" / Uuid / "rounds")
        .and(warp::post())
        .and(manager_filter.clone())
        .and_then(handle_new_round);

    let reveal = warp::path!("sessions" / Uuid / "reveal")
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_reveal);

    let player_stats = warp::path!("players" / String / "stats")
        .and(warp::get())
        .and(warp::query::<StatsQuery>())
        .and(manager_filter.clone())
        .and_then(handle_player_stats);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(create_session)
        .or(get_session)
        .or(submit_guess)
        .or(new_round)
        .or(reveal)
        .or(player_stats)
        .with(cors)
        .with(warp::log("guess_arena"))
}

async fn handle_create_session(
    request: CreateSessionRequest,
    session_manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = session_manager
        .create_session(&request.callsign, request.mode)
        .await;
    Ok(json_reply(result, StatusCode::CREATED))
}

async fn handle_get_session(
    session_id: Uuid,
    session_manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = session_manager.get_session(session_id).await;
    Ok(json_reply(result, StatusCode::OK))
}

async fn handle_submit_guess(
    session_id: Uuid,
    request: SubmitGuessRequest,
    session_manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = session_manager.submit_guess(session_id, &request.input).await;
    Ok(json_reply(result, StatusCode::OK))
}

async fn handle_new_round(
    session_id: Uuid,
    session_manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = session_manager.start_round(session_id).await;
    Ok(json_reply(result, StatusCode::OK))
}

async fn handle_reveal(
    session_id: Uuid,
    session_manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let result = session_manager.reveal(session_id).await;
    Ok(json_reply(result, StatusCode::OK))
}

async fn handle_player_stats(
    callsign: String,
    query: StatsQuery,
    session_manager: Arc<SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mode = match query.mode.as_deref() {
        None => Ok(GameMode::Numeric),
        Some(raw) => raw.parse::<GameMode>().map_err(|_| ApiError::InvalidMode(raw.to_string())),
    };
    let result = match mode {
        Ok(mode) => session_manager.player_stats(&callsign, mode).await,
        Err(err) => Err(err),
    };
    Ok(json_reply(result, StatusCode::OK))
}

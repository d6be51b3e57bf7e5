
use guess_server::config::Config;
use guess_server::create_routes;
use guess_types::{
    CounterKey, ErrorResponse, GameMode, GuessOutcome, PlayerProfile, PlayerStats, RejectionReason,
    RevealResponse, RoundStart, RoundStatus, SessionCreated, SessionView,
};
use serde_json::json;
use test_helpers::*;
use uuid::Uuid;
use warp::http::StatusCode;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(Config::default()).await;

    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&app)
        .await;

    assert_status(&response, StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"OK");
}

#[tokio::test]
async fn test_create_session_endpoint() {
    let setup = TestServerSetup::new().await;
    let app = create_routes(setup.session_manager.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/sessions")
        .json(&json!({ "callsign": "bob", "mode": "numeric" }))
        .reply(&app)
        .await;

    assert_status(&response, StatusCode::CREATED);
    let created: SessionCreated = parse_body(&response);
    assert_eq!(created.session.callsign, "BOB");
    assert_eq!(created.session.round.mode, GameMode::Numeric);
    assert_eq!(created.session.round.attempts_allowed, 7);
    assert_eq!(created.session.stats.lives, 3);
    assert!(created.start.lines.is_empty());
    assert_eq!(created.start.cues.generation, 1);
}

#[tokio::test]
async fn test_create_session_rejects_invalid_callsign() {
    let app = create_test_app(Config::default()).await;

    for callsign in ["", "BO", "BOBBY", "B0B"] {
        let response = warp::test::request()
            .method("POST")
            .path("/sessions")
            .json(&json!({ "callsign": callsign, "mode": "code" }))
            .reply(&app)
            .await;

        assert_status(&response, StatusCode::BAD_REQUEST);
        let body: ErrorResponse = parse_body(&response);
        assert!(body.error.contains("callsign"), "error was {}", body.error);
    }
}

#[tokio::test]
async fn test_get_session_endpoint() {
    let setup = TestServerSetup::new().await;
    let app = create_routes(setup.session_manager.clone());
    let created = setup.create_session("ABC", GameMode::Code).await;
    let session_id = created.session.session_id;

    let response = warp::test::request()
        .method("GET")
        .path(&session_path(session_id, ""))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::OK);
    let view: SessionView = parse_body(&response);
    assert_eq!(view.session_id, session_id);
    assert_eq!(view.round.code_length, Some(3));
    assert_eq!(view.round.bounds, None);

    let response = warp::test::request()
        .method("GET")
        .path(&session_path(Uuid::new_v4(), ""))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guess_flow_to_win() {
    let setup = TestServerSetup::new().await;
    let app = create_routes(setup.session_manager.clone());
    let created = setup.create_session("ABC", GameMode::Numeric).await;
    let session_id = created.session.session_id;

    let response = warp::test::request()
        .method("GET")
        .path(&session_path(session_id, "reveal"))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::OK);
    let reveal: RevealResponse = parse_body(&response);

    let response = warp::test::request()
        .method("POST")
        .path(&session_path(session_id, "guesses"))
        .json(&json!({ "input": reveal.secret }))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::OK);
    let outcome: GuessOutcome = parse_body(&response);
    assert!(outcome.accepted);
    assert_eq!(outcome.status, RoundStatus::Won);
    let summary = outcome.summary.unwrap();
    assert_eq!(summary.secret.to_string(), reveal.secret);
    assert!(summary.jackpot);

    // A finished round can be replaced
    let response = warp::test::request()
        .method("POST")
        .path(&session_path(session_id, "rounds"))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::OK);
    let start: RoundStart = parse_body(&response);
    assert_eq!(start.round.generation, 2);
    assert_eq!(start.round.bounds.map(|b| b.high), Some(125));
}

#[tokio::test]
async fn test_rejected_guess_is_not_an_http_error() {
    let setup = TestServerSetup::new().await;
    let app = create_routes(setup.session_manager.clone());
    let created = setup.create_session("ABC", GameMode::Numeric).await;
    let session_id = created.session.session_id;

    let response = warp::test::request()
        .method("POST")
        .path(&session_path(session_id, "guesses"))
        .json(&json!({ "input": "fifty" }))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::OK);
    let outcome: GuessOutcome = parse_body(&response);
    assert!(!outcome.accepted);
    assert_eq!(
        outcome.rejection,
        Some(RejectionReason::Malformed {
            input: "fifty".to_string()
        })
    );
    assert_eq!(outcome.attempts_used, 0);

    let response = warp::test::request()
        .method("POST")
        .path(&session_path(session_id, "guesses"))
        .json(&json!({ "input": "101" }))
        .reply(&app)
        .await;
    let outcome: GuessOutcome = parse_body(&response);
    assert_eq!(
        outcome.rejection,
        Some(RejectionReason::OutOfRange { low: 1, high: 100 })
    );
}

#[tokio::test]
async fn test_new_round_mid_round_conflicts() {
    let setup = TestServerSetup::new().await;
    let app = create_routes(setup.session_manager.clone());
    let created = setup.create_session("ABC", GameMode::Numeric).await;
    let session_id = created.session.session_id;

    let response = warp::test::request()
        .method("POST")
        .path(&session_path(session_id, "rounds"))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::CONFLICT);

    let secret: u32 = setup.secret(session_id).await.parse().unwrap();
    let miss = if secret == 1 { "100" } else { "1" };
    setup.guess(session_id, miss).await;

    let response = warp::test::request()
        .method("POST")
        .path(&session_path(session_id, "rounds"))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reveal_forbidden_by_default() {
    let setup = TestServerSetup::with_config(Config::default()).await;
    let app = create_routes(setup.session_manager.clone());
    let created = setup.create_session("ABC", GameMode::Code).await;

    let response = warp::test::request()
        .method("GET")
        .path(&session_path(created.session.session_id, "reveal"))
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_player_stats_endpoint() {
    let setup = TestServerSetup::new().await;
    let app = create_routes(setup.session_manager.clone());
    let created = setup.create_session("ABC", GameMode::Code).await;
    setup.lose_code_round(created.session.session_id).await;

    let response = warp::test::request()
        .method("GET")
        .path("/players/abc/stats?mode=code")
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::OK);
    let stats: PlayerStats = parse_body(&response);
    assert_eq!(stats.callsign, "ABC");
    assert_eq!(stats.mode, GameMode::Code);
    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.lives, 2);

    // Mode defaults to numeric, which this player has never played
    let response = warp::test::request()
        .method("GET")
        .path("/players/ABC/stats")
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::OK);
    let stats: PlayerStats = parse_body(&response);
    assert_eq!(stats.mode, GameMode::Numeric);
    assert_eq!(stats.games_played, 0);
    assert_eq!(stats.range_ceiling, Some(100));

    let response = warp::test::request()
        .method("GET")
        .path("/players/ABC/stats?mode=roulette")
        .reply(&app)
        .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_counters_written_through_api() {
    let setup = TestServerSetup::new().await;
    let app = create_routes(setup.session_manager.clone());

    let response = warp::test::request()
        .method("POST")
        .path("/sessions")
        .json(&json!({ "callsign": "QRS", "mode": "code" }))
        .reply(&app)
        .await;
    let created: SessionCreated = parse_body(&response);
    let session_id = created.session.session_id;
    setup.lose_code_round(session_id).await;

    let profile = PlayerProfile::new("QRS", GameMode::Code);
    assert_eq!(
        setup
            .counters
            .get(&profile, CounterKey::GamesPlayed)
            .await
            .unwrap(),
        Some(1)
    );
    assert_eq!(
        setup
            .counters
            .get(&profile, CounterKey::LivesRemaining)
            .await
            .unwrap(),
        Some(2)
    );
    assert_eq!(
        setup
            .counters
            .get(&profile, CounterKey::Wins)
            .await
            .unwrap(),
        None
    );
}

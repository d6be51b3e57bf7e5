use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use guess_persistence::DatabaseManager;
use guess_server::{config::Config, create_routes, session_manager::SessionManager};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting guess server...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let dialogue = match config.load_dialogue() {
        Ok(book) => Arc::new(book),
        Err(e) => {
            error!("Failed to load dialogue: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize database connection and run migrations
    let database = match DatabaseManager::connect(&config.database_url).await {
        Ok(database) => database,
        Err(e) => {
            error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let addr = match config.host.parse::<std::net::IpAddr>() {
        Ok(ip) => (ip, config.port),
        Err(e) => {
            error!("Invalid HOST {:?}: {}", config.host, e);
            std::process::exit(1);
        }
    };

    if config.enable_reveal {
        info!("Secret reveal endpoint enabled");
    }

    let session_manager = Arc::new(SessionManager::new(
        config.clone(),
        database.counters(),
        dialogue,
    ));
    let routes = create_routes(session_manager.clone());

    // Start cleanup task
    let cleanup_manager = session_manager.clone();
    let session_timeout = Duration::from_secs(config.session_timeout_minutes * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let removed = cleanup_manager.cleanup_idle_sessions(session_timeout).await;
            if removed > 0 {
                info!("Cleaned up {} idle sessions", removed);
            }
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, shutdown_signal());

    info!("Server started successfully on {}. Press Ctrl+C to stop.", addr);
    server.await;

    session_manager.flush_all().await;
    info!("Server shutdown complete.");
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
                return;
            }
            _ => error!("Failed to install signal handlers, falling back to Ctrl+C"),
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}

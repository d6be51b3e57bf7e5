use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use guess_core::{DialogueBook, DialogueSelector, GuessEngine, ProgressionTracker};
use guess_persistence::{CachedProgressionStore, CounterRepository};
use guess_types::{
    GameMode, GuessOutcome, PlayerProfile, PlayerStats, RevealResponse, RoundStart, SessionCreated,
    SessionError, SessionId, SessionView,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;

pub type SessionEngine = GuessEngine<CachedProgressionStore, StdRng>;

struct Session {
    callsign: String,
    engine: SessionEngine,
    last_activity: Instant,
}

impl Session {
    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }

    fn view(&self, session_id: SessionId) -> SessionView {
        SessionView {
            session_id,
            callsign: self.callsign.clone(),
            round: self.engine.round_view(),
            stats: self.engine.stats(),
        }
    }
}

static CALLSIGN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("callsign pattern is a valid regex"));

/// Upper-cases and checks a callsign: exactly three ASCII letters.
pub fn normalize_callsign(raw: &str) -> Result<String, SessionError> {
    let callsign = raw.trim().to_ascii_uppercase();
    if CALLSIGN_PATTERN.is_match(&callsign) {
        Ok(callsign)
    } else {
        Err(SessionError::InvalidCallsign {
            callsign: raw.to_string(),
        })
    }
}

/// Owns every live game session. Each session has its own lock so slow
/// database flushes only block that session.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    counters: CounterRepository,
    config: Config,
    dialogue: Arc<DialogueBook>,
}

impl SessionManager {
    pub fn new(config: Config, counters: CounterRepository, dialogue: Arc<DialogueBook>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            counters,
            config,
            dialogue,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn session(&self, session_id: SessionId) -> Result<Arc<Mutex<Session>>, ApiError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or_else(|| {
                SessionError::SessionNotFound {
                    session_id: session_id.to_string(),
                }
                .into()
            })
    }

    /// Write queued counters; failures are logged and left queued.
    async fn flush(&self, session: &mut Session) {
        if session.engine.store().pending_writes() == 0 {
            return;
        }
        let profile = session.engine.profile().clone();
        if let Err(e) = session.engine.store_mut().flush(&self.counters).await {
            warn!(profile = %profile, error = %e, "Failed to persist counters");
        }
    }

    pub async fn create_session(&self, callsign: &str, mode: GameMode) -> Result<SessionCreated, ApiError> {
        let callsign = normalize_callsign(callsign)?;
        let profile = PlayerProfile::new(callsign.clone(), mode);
        let store = CachedProgressionStore::load(&self.counters, &profile).await;
        let selector = DialogueSelector::new(self.dialogue.clone(), self.config.engine_config(mode).dialogue);

        let (engine, start) = GuessEngine::start(
            profile,
            self.config.engine_config(mode),
            store,
            selector,
            StdRng::from_entropy(),
        );
        let mut session = Session {
            callsign,
            engine,
            last_activity: Instant::now(),
        };
        self.flush(&mut session).await;

        let session_id = Uuid::new_v4();
        let view = session.view(session_id);
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(session)));

        info!(%session_id, callsign = %view.callsign, %mode, "Session created");
        Ok(SessionCreated {
            session: view,
            start,
        })
    }

    pub async fn get_session(&self, session_id: SessionId) -> Result<SessionView, ApiError> {
        let session = self.session(session_id).await?;
        let session = session.lock().await;
        Ok(session.view(session_id))
    }

    pub async fn submit_guess(&self, session_id: SessionId, input: &str) -> Result<GuessOutcome, ApiError> {
        let session = self.session(session_id).await?;
        let mut session = session.lock().await;
        session.touch();

        let outcome = session.engine.submit_guess(input)?;
        if !outcome.accepted {
            warn!(%session_id, input, reason = ?outcome.rejection, "Guess rejected");
        }
        self.flush(&mut session).await;
        Ok(outcome)
    }

    pub async fn start_round(&self, session_id: SessionId) -> Result<RoundStart, ApiError> {
        let session = self.session(session_id).await?;
        let mut session = session.lock().await;
        session.touch();

        let start = session.engine.start_new_round()?;
        self.flush(&mut session).await;
        Ok(start)
    }

    pub async fn reveal(&self, session_id: SessionId) -> Result<RevealResponse, ApiError> {
        if !self.config.enable_reveal {
            return Err(SessionError::RevealDisabled.into());
        }
        let session = self.session(session_id).await?;
        let session = session.lock().await;
        warn!(%session_id, "Secret revealed");
        Ok(RevealResponse {
            secret: session.engine.reveal_secret().to_string(),
        })
    }

    /// Stats as stored, with the same load clamping the engine applies.
    pub async fn player_stats(&self, callsign: &str, mode: GameMode) -> Result<PlayerStats, ApiError> {
        let callsign = normalize_callsign(callsign)?;
        let profile = PlayerProfile::new(callsign, mode);
        let store = CachedProgressionStore::load(&self.counters, &profile).await;
        let tracker = ProgressionTracker::load(profile, store, &self.config.engine_config(mode));
        Ok(PlayerStats::from_progression(tracker.profile(), tracker.state()))
    }

    /// Drop sessions idle for longer than `timeout`, flushing them first.
    pub async fn cleanup_idle_sessions(&self, timeout: Duration) -> usize {
        let mut expired = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (session_id, session) in sessions.iter() {
                if session.lock().await.is_expired(timeout) {
                    expired.push(*session_id);
                }
            }
        }

        let mut removed = 0;
        for session_id in expired {
            if self.remove_if_expired(session_id, timeout).await {
                removed += 1;
            }
        }
        removed
    }

    /// Expiry is checked again under the write lock: the session may have
    /// been used since it was collected.
    async fn remove_if_expired(&self, session_id: SessionId, timeout: Duration) -> bool {
        let session = {
            let mut sessions = self.sessions.write().await;
            let still_expired = match sessions.get(&session_id) {
                Some(session) => session.lock().await.is_expired(timeout),
                None => false,
            };
            if !still_expired {
                return false;
            }
            sessions.remove(&session_id)
        };

        match session {
            Some(session) => {
                self.flush(&mut *session.lock().await).await;
                info!(%session_id, "Session expired");
                true
            }
            None => false,
        }
    }

    /// Final flush of every session, used on shutdown.
    pub async fn flush_all(&self) {
        let sessions: Vec<_> = self.sessions.read().await.values().cloned().collect();
        for session in sessions {
            self.flush(&mut *session.lock().await).await;
        }
    }
}

use std::collections::HashMap;

use anyhow::Result;
use guess_types::{CounterKey, PlayerProfile, ProgressionState};
use tracing::{debug, warn};

use crate::config::EngineConfig;

/// Durable per-profile counters. Single-key reads and writes only; callers
/// sequence related updates themselves.
pub trait ProgressionStore {
    fn get(&self, profile: &PlayerProfile, key: CounterKey) -> Result<Option<i64>>;
    fn set(&mut self, profile: &PlayerProfile, key: CounterKey, value: i64) -> Result<()>;
}

impl<S: ProgressionStore + ?Sized> ProgressionStore for Box<S> {
    fn get(&self, profile: &PlayerProfile, key: CounterKey) -> Result<Option<i64>> {
        (**self).get(profile, key)
    }

    fn set(&mut self, profile: &PlayerProfile, key: CounterKey, value: i64) -> Result<()> {
        (**self).set(profile, key, value)
    }
}

/// Process-local store, used by tests and as the no-database fallback.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    counters: HashMap<(String, CounterKey), i64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressionStore for InMemoryStore {
    fn get(&self, profile: &PlayerProfile, key: CounterKey) -> Result<Option<i64>> {
        Ok(self.counters.get(&(profile.storage_key(), key)).copied())
    }

    fn set(&mut self, profile: &PlayerProfile, key: CounterKey, value: i64) -> Result<()> {
        self.counters.insert((profile.storage_key(), key), value);
        Ok(())
    }
}

/// What a win did to progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinEffects {
    pub jackpot: bool,
    pub new_best: bool,
    pub lives_before: u32,
    pub lives_after: u32,
    /// `(from, to)` when the numeric ceiling grew.
    pub range_expanded: Option<(u32, u32)>,
}

/// What a loss did to progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LossEffects {
    pub lives_before: u32,
    pub lives_after: u32,
    /// `(from, to)` when total depletion reset the numeric ceiling.
    pub range_reset: Option<(u32, u32)>,
}

/// Owns the in-memory progression snapshot and writes every change through
/// to the store. A failing store is logged and otherwise ignored: the
/// snapshot stays authoritative for the rest of the session.
#[derive(Debug)]
pub struct ProgressionTracker<S> {
    profile: PlayerProfile,
    store: S,
    state: ProgressionState,
}

impl<S: ProgressionStore> ProgressionTracker<S> {
    /// Read every counter, falling back to defaults for missing, invalid or
    /// unreadable values.
    pub fn load(profile: PlayerProfile, store: S, config: &EngineConfig) -> Self {
        let read = |key: CounterKey| -> Option<i64> {
            match store.get(&profile, key) {
                Ok(value) => value,
                Err(e) => {
                    warn!(profile = %profile, %key, error = %e, "Failed to read counter, using default");
                    None
                }
            }
        };
        let count = |key: CounterKey| -> u32 {
            read(key)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0)
        };

        let best_score = read(CounterKey::BestScore)
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0);
        let lives = read(CounterKey::LivesRemaining)
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v <= config.max_lives())
            .unwrap_or(config.full_lives);
        let range_ceiling = read(CounterKey::RangeCeiling)
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(config.base_range);
        let peak_range_ceiling = read(CounterKey::PeakRangeCeiling)
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(config.base_range)
            .max(range_ceiling);

        let state = ProgressionState {
            best_score,
            games_played: count(CounterKey::GamesPlayed),
            wins: count(CounterKey::Wins),
            current_streak: count(CounterKey::CurrentStreak),
            best_streak: count(CounterKey::BestStreak),
            lives,
            range_ceiling,
            peak_range_ceiling,
        };
        debug!(profile = %profile, ?state, "Loaded progression");

        Self {
            profile,
            store,
            state,
        }
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn write(&mut self, key: CounterKey, value: i64) {
        if let Err(e) = self.store.set(&self.profile, key, value) {
            warn!(profile = %self.profile, %key, value, error = %e, "Failed to persist counter");
        }
    }

    pub fn record_round_started(&mut self) {
        self.state.games_played = self.state.games_played.saturating_add(1);
        self.write(CounterKey::GamesPlayed, i64::from(self.state.games_played));
    }

    /// Refill lives from zero before a new round begins scoring. Returns the
    /// new value when a recharge happened.
    pub fn recharge_if_depleted(&mut self, config: &EngineConfig) -> Option<u32> {
        if self.state.lives != 0 {
            return None;
        }
        self.state.lives = config.full_lives;
        self.write(CounterKey::LivesRemaining, i64::from(self.state.lives));
        Some(self.state.lives)
    }

    pub fn record_win(&mut self, attempts: u32, jackpot: bool, config: &EngineConfig) -> WinEffects {
        let new_best = self.state.best_score.is_none_or(|best| attempts < best);
        if new_best {
            self.state.best_score = Some(attempts);
            self.write(CounterKey::BestScore, i64::from(attempts));
        }

        let range_expanded = if config.mode.has_range() {
            let from = self.state.range_ceiling;
            let to = from.saturating_add(config.range_increment);
            self.state.range_ceiling = to;
            self.write(CounterKey::RangeCeiling, i64::from(to));
            if to > self.state.peak_range_ceiling {
                self.state.peak_range_ceiling = to;
                self.write(CounterKey::PeakRangeCeiling, i64::from(to));
            }
            Some((from, to))
        } else {
            None
        };

        self.state.wins = self.state.wins.saturating_add(1);
        self.write(CounterKey::Wins, i64::from(self.state.wins));
        self.state.current_streak = self.state.current_streak.saturating_add(1);
        self.write(CounterKey::CurrentStreak, i64::from(self.state.current_streak));
        if self.state.current_streak > self.state.best_streak {
            self.state.best_streak = self.state.current_streak;
            self.write(CounterKey::BestStreak, i64::from(self.state.best_streak));
        }

        let lives_before = self.state.lives;
        let lives_after = if jackpot {
            config.jackpot_lives
        } else if lives_before >= config.full_lives {
            lives_before
        } else {
            (lives_before + 1).min(config.full_lives)
        };
        if lives_after != lives_before {
            self.state.lives = lives_after;
            self.write(CounterKey::LivesRemaining, i64::from(lives_after));
        }

        WinEffects {
            jackpot,
            new_best,
            lives_before,
            lives_after,
            range_expanded,
        }
    }

    pub fn record_loss(&mut self, config: &EngineConfig) -> LossEffects {
        let lives_before = self.state.lives;
        let lives_after = lives_before.saturating_sub(1);
        self.state.lives = lives_after;
        self.write(CounterKey::LivesRemaining, i64::from(lives_after));

        self.state.current_streak = 0;
        self.write(CounterKey::CurrentStreak, 0);

        let range_reset = if lives_after == 0 && config.mode.has_range() {
            let from = self.state.range_ceiling;
            self.state.range_ceiling = config.base_range;
            self.write(CounterKey::RangeCeiling, i64::from(config.base_range));
            Some((from, config.base_range))
        } else {
            None
        };

        LossEffects {
            lives_before,
            lives_after,
            range_reset,
        }
    }
}

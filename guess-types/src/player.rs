use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::GameMode;

/// Durable counters kept per player profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CounterKey {
    BestScore,
    GamesPlayed,
    Wins,
    CurrentStreak,
    BestStreak,
    LivesRemaining,
    RangeCeiling,
    PeakRangeCeiling,
}

impl CounterKey {
    pub const ALL: [CounterKey; 8] = [
        CounterKey::BestScore,
        CounterKey::GamesPlayed,
        CounterKey::Wins,
        CounterKey::CurrentStreak,
        CounterKey::BestStreak,
        CounterKey::LivesRemaining,
        CounterKey::RangeCeiling,
        CounterKey::PeakRangeCeiling,
    ];

    /// Storage name of the counter.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKey::BestScore => "bestScore",
            CounterKey::GamesPlayed => "gamesPlayed",
            CounterKey::Wins => "wins",
            CounterKey::CurrentStreak => "currentStreak",
            CounterKey::BestStreak => "bestStreak",
            CounterKey::LivesRemaining => "livesRemaining",
            CounterKey::RangeCeiling => "rangeCeiling",
            CounterKey::PeakRangeCeiling => "peakRangeCeiling",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies whose counters are read and written: a callsign plus the mode,
/// so numeric and code progress never mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerProfile {
    pub callsign: String,
    pub mode: GameMode,
}

impl PlayerProfile {
    pub fn new(callsign: impl Into<String>, mode: GameMode) -> Self {
        Self {
            callsign: callsign.into(),
            mode,
        }
    }

    /// Flat key used by storage backends, e.g. `ABC:numeric`.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.callsign, self.mode.as_str())
    }
}

impl fmt::Display for PlayerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// In-memory view of a profile's durable counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProgressionState {
    pub best_score: Option<u32>,
    pub games_played: u32,
    pub wins: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub lives: u32,
    pub range_ceiling: u32,
    pub peak_range_ceiling: u32,
}

/// Stats panel projection of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerStats {
    pub callsign: String,
    pub mode: GameMode,
    pub best_score: Option<u32>,
    pub games_played: u32,
    pub wins: u32,
    pub win_rate_percent: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub lives: u32,
    pub range_ceiling: Option<u32>,
    pub peak_range_ceiling: Option<u32>,
}

impl PlayerStats {
    pub fn from_progression(profile: &PlayerProfile, state: &ProgressionState) -> Self {
        let has_range = profile.mode.has_range();
        Self {
            callsign: profile.callsign.clone(),
            mode: profile.mode,
            best_score: state.best_score,
            games_played: state.games_played,
            wins: state.wins,
            win_rate_percent: win_rate_percent(state.wins, state.games_played),
            current_streak: state.current_streak,
            best_streak: state.best_streak,
            lives: state.lives,
            range_ceiling: has_range.then_some(state.range_ceiling),
            peak_range_ceiling: has_range.then_some(state.peak_range_ceiling),
        }
    }
}

/// Rounded percentage of games won; 0 when nothing has been played.
pub fn win_rate_percent(wins: u32, played: u32) -> u32 {
    if played == 0 {
        return 0;
    }
    ((wins as f64 / played as f64) * 100.0).round() as u32
}

use guess_types::GameMode;
use serde::{Deserialize, Serialize};

/// Codes use distinct decimal digits, so at most ten of them.
pub const CODE_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 1..=10;

/// Tunables of the engine. Everything here is a difficulty or presentation
/// choice; none of it changes scoring correctness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: GameMode,
    /// Attempts allowed per round.
    pub max_attempts: u32,
    /// Numeric mode starting ceiling, and where it resets on total depletion.
    pub base_range: u32,
    /// Added to the numeric ceiling on every win.
    pub range_increment: u32,
    /// Digits per code in code mode.
    pub code_length: usize,
    /// Lives after a normal win are capped here.
    pub full_lives: u32,
    /// Lives awarded by a first-attempt win.
    pub jackpot_lives: u32,
    pub feedback: FeedbackConfig,
    pub dialogue: SelectionConfig,
}

impl EngineConfig {
    pub fn numeric() -> Self {
        Self::for_mode(GameMode::Numeric)
    }

    pub fn code() -> Self {
        Self::for_mode(GameMode::Code)
    }

    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            mode,
            max_attempts: 7,
            base_range: 100,
            range_increment: 25,
            code_length: 3,
            full_lives: 3,
            jackpot_lives: 4,
            feedback: FeedbackConfig::default(),
            dialogue: SelectionConfig::default(),
        }
    }

    /// `code_length` clamped to what a code of distinct digits can hold.
    /// Generation and validation both go through this so they always agree.
    pub fn effective_code_length(&self) -> usize {
        self.code_length
            .clamp(*CODE_LENGTH_RANGE.start(), *CODE_LENGTH_RANGE.end())
    }

    /// Upper bound on lives at any time.
    pub fn max_lives(&self) -> u32 {
        self.jackpot_lives.max(self.full_lives)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::numeric()
    }
}

/// Thresholds and weights used by the feedback classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Distance upper bounds for burning, hot, warm and cool. Anything beyond
    /// the last one is cold.
    pub numeric_thresholds: [u32; 4],
    /// Weight of one exact position in the code-mode quality score.
    pub exact_weight: i64,
    /// Weight of one present digit in the code-mode quality score.
    pub present_weight: i64,
    /// Quality changes with magnitude at or below this count as unchanged.
    pub numeric_tolerance: i64,
    pub code_tolerance: i64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            numeric_thresholds: [3, 10, 25, 50],
            exact_weight: 2,
            present_weight: 1,
            numeric_tolerance: 2,
            code_tolerance: 0,
        }
    }
}

/// Trigger conditions of the supplementary dialogue lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub comparison_probability: f64,
    pub streak_probability: f64,
    /// Minimum |streak| before streak commentary can fire.
    pub streak_threshold: u32,
    /// Remaining-attempt counts that always add a pressure line.
    pub pressure_at: Vec<u32>,
    /// Numeric ceilings at or above this always announce the extended range.
    pub extended_range_at: u32,
    /// Numeric ceilings at or above this sometimes announce a widening range.
    pub widening_range_at: u32,
    pub widening_probability: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            comparison_probability: 0.7,
            streak_probability: 0.3,
            streak_threshold: 3,
            pressure_at: vec![3, 2, 1],
            extended_range_at: 200,
            widening_range_at: 150,
            widening_probability: 0.5,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::errors::RejectionReason;
use crate::RoundId;

/// Which scoring strategy a session plays with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum GameMode {
    /// Higher/lower search for a single integer in `[1, range ceiling]`.
    Numeric,
    /// Fixed-length digit code with no repeated digits and no leading zero.
    Code,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Numeric => "numeric",
            GameMode::Code => "code",
        }
    }

    /// Only numeric mode narrows a bounding interval and grows its range.
    pub fn has_range(&self) -> bool {
        matches!(self, GameMode::Numeric)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" | "number" => Ok(GameMode::Numeric),
            "code" | "digits" => Ok(GameMode::Code),
            other => Err(format!("unknown game mode: {}", other)),
        }
    }
}

/// The hidden value of a round. Never serialized to clients while the round
/// is still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Secret {
    Number(u32),
    Code(Vec<u8>),
}

/// A validated player guess, same shape as [`Secret`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Guess {
    Number(u32),
    Code(Vec<u8>),
}

impl Guess {
    /// True when the guess is exactly the secret.
    pub fn matches(&self, secret: &Secret) -> bool {
        match (self, secret) {
            (Guess::Number(g), Secret::Number(s)) => g == s,
            (Guess::Code(g), Secret::Code(s)) => g == s,
            _ => false,
        }
    }
}

fn write_digits(f: &mut fmt::Formatter<'_>, digits: &[u8]) -> fmt::Result {
    for d in digits {
        write!(f, "{}", d)?;
    }
    Ok(())
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Number(n) => write!(f, "{}", n),
            Secret::Code(digits) => write_digits(f, digits),
        }
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guess::Number(n) => write!(f, "{}", n),
            Guess::Code(digits) => write_digits(f, digits),
        }
    }
}

/// Side of the secret a numeric guess landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Direction {
    /// Guess was lower than the secret; search higher.
    Below,
    /// Guess was not lower than the secret; search lower.
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PositionMark {
    Exact,   // right digit, right slot
    Present, // right digit, wrong slot
    Absent,  // digit not left over in the secret
}

/// Output of comparing a guess to the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ScoreResult {
    Distance {
        distance: u32,
        direction: Direction,
    },
    Positional {
        marks: Vec<PositionMark>,
        exact: u32,
        present: u32,
        absent: u32,
    },
}

impl ScoreResult {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            ScoreResult::Distance { direction, .. } => Some(*direction),
            ScoreResult::Positional { .. } => None,
        }
    }
}

/// Feedback quality bucket, best first.
///
/// Numeric mode uses all five tiers; code mode uses `Hot` through `Cold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Tier {
    Burning,
    Hot,
    Warm,
    Cool,
    Cold,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::Burning, Tier::Hot, Tier::Warm, Tier::Cool, Tier::Cold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Burning => "burning",
            Tier::Hot => "hot",
            Tier::Warm => "warm",
            Tier::Cool => "cool",
            Tier::Cold => "cold",
        }
    }

    /// Whether the presentation layer should flash a "close" rather than "far" signal.
    pub fn is_close(&self) -> bool {
        matches!(self, Tier::Burning | Tier::Hot | Tier::Warm)
    }
}

/// Turn-over-turn change in guess quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Comparison {
    Improved,
    Regressed,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoundStatus {
    AwaitingGuess,
    Won,
    Lost,
}

impl RoundStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoundStatus::AwaitingGuess)
    }
}

/// Inclusive interval that still contains the secret (numeric mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bounds {
    pub low: u32,
    pub high: u32,
}

impl Bounds {
    pub fn full(ceiling: u32) -> Self {
        Self { low: 1, high: ceiling }
    }

    pub fn is_collapsed(&self) -> bool {
        self.low == self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LineCategory {
    Tier,
    Comparison,
    Streak,
    Pressure,
    System,
}

/// One line of flavor text chosen by the dialogue selector. Plain text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DialogueLine {
    pub category: LineCategory,
    pub text: String,
}

/// Presentation cues. The engine has already decided the outcome when these
/// are emitted; they only describe what to animate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameCue {
    RoundStarted { range_ceiling: Option<u32> },
    LivesChanged { from: u32, to: u32 },
    LivesRecharged { to: u32 },
    LivesAlreadyFull,
    Jackpot,
    NewBestScore { attempts: u32 },
    RangeExpanded { from: u32, to: u32 },
    /// Total depletion sent the numeric ceiling back to base.
    RangeReset { from: u32, to: u32 },
    BoundsNarrowed { low: u32, high: u32 },
    /// Bounds pinned a single candidate; the round ended on its own.
    AutoResolved { value: u32 },
    /// Few attempts left; drives the low-battery warning.
    PressureWarning { attempts_remaining: u32 },
}

/// Cues of one engine call, tagged with the round generation they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CueBatch {
    pub round_id: RoundId,
    pub generation: u64,
    pub cues: Vec<GameCue>,
}

/// Terminal summary of a round, fed to progression and shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundSummary {
    pub mode: GameMode,
    pub won: bool,
    pub attempts: u32,
    pub secret: Secret,
    pub jackpot: bool,
    pub auto_resolved: bool,
    pub new_best: bool,
    pub lives_remaining: u32,
    pub range_ceiling: Option<u32>,
}

/// Result object returned for every guess submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessOutcome {
    pub accepted: bool,
    pub rejection: Option<RejectionReason>,
    pub status: RoundStatus,
    pub guess: Option<Guess>,
    pub score: Option<ScoreResult>,
    pub tier: Option<Tier>,
    pub comparison: Option<Comparison>,
    pub streak: i32,
    pub attempts_used: u32,
    pub attempts_remaining: u32,
    pub bounds: Option<Bounds>,
    pub lines: Vec<DialogueLine>,
    pub summary: Option<RoundSummary>,
    pub cues: CueBatch,
}

impl GuessOutcome {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Client-safe snapshot of the current round: no secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundView {
    pub round_id: RoundId,
    pub generation: u64,
    pub mode: GameMode,
    pub status: RoundStatus,
    pub attempts_used: u32,
    pub attempts_allowed: u32,
    pub bounds: Option<Bounds>,
    pub code_length: Option<u32>,
    pub streak: i32,
}

/// Result of starting a new round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoundStart {
    pub round: RoundView,
    pub lines: Vec<DialogueLine>,
    pub cues: CueBatch,
}

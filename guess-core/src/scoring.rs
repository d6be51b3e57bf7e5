use guess_types::{Direction, GameMode, Guess, PositionMark, ScoreResult, Secret};
use thiserror::Error;

/// Guess and secret do not have the same shape. This is an integration bug,
/// never a player mistake: validated input cannot produce it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("guess/secret shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

/// Compares a guess to the secret.
pub trait Scorer: Send + Sync {
    fn score(&self, guess: &Guess, secret: &Secret) -> Result<ScoreResult, ScoringError>;
}

/// Numeric mode: absolute distance plus which side of the secret the guess is on.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistanceScorer;

impl Scorer for DistanceScorer {
    fn score(&self, guess: &Guess, secret: &Secret) -> Result<ScoreResult, ScoringError> {
        match (guess, secret) {
            (Guess::Number(g), Secret::Number(s)) => Ok(ScoreResult::Distance {
                distance: g.abs_diff(*s),
                direction: if g < s { Direction::Below } else { Direction::Above },
            }),
            _ => Err(mismatch("a number", guess)),
        }
    }
}

/// Code mode: exact / present / absent per position.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionalScorer;

impl PositionalScorer {
    /// Two-pass marking.
    ///
    /// Pass one marks positional matches and consumes both sides. Pass two
    /// walks the remaining guess positions and takes the lowest unconsumed
    /// secret position holding the same digit, if any. A consumed secret
    /// position is never matched twice, so repeated guess digits are not
    /// double counted.
    pub fn mark(guess: &[u8], secret: &[u8]) -> Vec<PositionMark> {
        let len = guess.len();
        let mut marks = vec![PositionMark::Absent; len];
        let mut secret_used = vec![false; secret.len()];
        let mut guess_used = vec![false; len];

        // First pass: exact positions
        for i in 0..len.min(secret.len()) {
            if guess[i] == secret[i] {
                marks[i] = PositionMark::Exact;
                secret_used[i] = true;
                guess_used[i] = true;
            }
        }

        // Second pass: present elsewhere, ascending secret index
        for i in 0..len {
            if guess_used[i] {
                continue;
            }
            for j in 0..secret.len() {
                if !secret_used[j] && guess[i] == secret[j] {
                    marks[i] = PositionMark::Present;
                    secret_used[j] = true;
                    break;
                }
            }
        }

        marks
    }
}

impl Scorer for PositionalScorer {
    fn score(&self, guess: &Guess, secret: &Secret) -> Result<ScoreResult, ScoringError> {
        let (Guess::Code(g), Secret::Code(s)) = (guess, secret) else {
            return Err(mismatch("a digit code", guess));
        };
        if g.len() != s.len() {
            return Err(ScoringError::ShapeMismatch {
                expected: format!("{} digits", s.len()),
                actual: format!("{} digits", g.len()),
            });
        }

        let marks = Self::mark(g, s);
        let count = |wanted: PositionMark| marks.iter().filter(|m| **m == wanted).count() as u32;
        let exact = count(PositionMark::Exact);
        let present = count(PositionMark::Present);
        let absent = count(PositionMark::Absent);

        Ok(ScoreResult::Positional {
            marks,
            exact,
            present,
            absent,
        })
    }
}

fn mismatch(expected: &str, guess: &Guess) -> ScoringError {
    let actual = match guess {
        Guess::Number(_) => "a number".to_string(),
        Guess::Code(digits) => format!("a {}-digit code", digits.len()),
    };
    ScoringError::ShapeMismatch {
        expected: expected.to_string(),
        actual,
    }
}

/// Strategy for a mode.
pub fn scorer_for(mode: GameMode) -> Box<dyn Scorer> {
    match mode {
        GameMode::Numeric => Box::new(DistanceScorer),
        GameMode::Code => Box::new(PositionalScorer),
    }
}

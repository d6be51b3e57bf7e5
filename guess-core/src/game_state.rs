use guess_types::{
    Bounds, CueBatch, DialogueLine, GameCue, GuessOutcome, PlayerProfile, PlayerStats,
    ProgressionState, RejectionReason, RoundId, RoundStart, RoundStatus, RoundSummary, RoundView,
    ScoreResult, Secret,
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dialogue::{DialogueSelector, SelectionContext};
use crate::feedback::FeedbackClassifier;
use crate::game_events::{EngineEvent, EngineEventBus, EngineEventHandler};
use crate::guess_validation::GuessValidator;
use crate::progression::{ProgressionStore, ProgressionTracker};
use crate::scoring::{scorer_for, Scorer, ScoringError};
use crate::target::TargetGenerator;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("current round is still in progress")]
    RoundInProgress,
}

/// Per-round aggregate. Created at round start and replaced by the next one.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub round_id: RoundId,
    pub generation: u64,
    secret: Secret,
    /// Numeric ceiling the secret was drawn under.
    pub range_ceiling: u32,
    pub attempts: u32,
    pub bounds: Option<Bounds>,
    pub previous: Option<ScoreResult>,
    pub streak: i32,
    pub status: RoundStatus,
}

impl RoundState {
    fn new(generation: u64, secret: Secret, range_ceiling: u32, config: &EngineConfig) -> Self {
        Self {
            round_id: Uuid::new_v4(),
            generation,
            secret,
            range_ceiling,
            attempts: 0,
            bounds: config.mode.has_range().then(|| Bounds::full(range_ceiling)),
            previous: None,
            streak: 0,
            status: RoundStatus::AwaitingGuess,
        }
    }

    fn cue_batch(&self, cues: Vec<GameCue>) -> CueBatch {
        CueBatch {
            round_id: self.round_id,
            generation: self.generation,
            cues,
        }
    }

    /// Shrink the interval around the secret after a miss.
    fn narrow(&mut self, guess: u32, score: &ScoreResult) {
        let (Some(bounds), Some(direction)) = (self.bounds.as_mut(), score.direction()) else {
            return;
        };
        match direction {
            guess_types::Direction::Below => bounds.low = bounds.low.max(guess.saturating_add(1)),
            guess_types::Direction::Above => bounds.high = bounds.high.min(guess.saturating_sub(1)),
        }
    }
}

/// Round state machine for one player profile.
///
/// Owns the current round, the progression snapshot and every strategy
/// object. All calls are synchronous; the outcome is fully decided before
/// anything is returned to the presentation layer.
pub struct GuessEngine<S, R> {
    config: EngineConfig,
    validator: GuessValidator,
    scorer: Box<dyn Scorer>,
    classifier: FeedbackClassifier,
    selector: DialogueSelector,
    progression: ProgressionTracker<S>,
    round: RoundState,
    rng: R,
    event_bus: EngineEventBus,
}

impl<S: ProgressionStore, R: Rng> GuessEngine<S, R> {
    /// Load progression for `profile` and start the session's first round.
    pub fn start(
        profile: PlayerProfile,
        config: EngineConfig,
        store: S,
        selector: DialogueSelector,
        rng: R,
    ) -> (Self, RoundStart) {
        let mut rng = rng;
        let progression = ProgressionTracker::load(profile, store, &config);
        let ceiling = progression.state().range_ceiling;
        let secret =
            TargetGenerator::generate(config.mode, ceiling, config.effective_code_length(), &mut rng);

        let mut engine = Self {
            validator: GuessValidator::new(config.mode, config.effective_code_length()),
            scorer: scorer_for(config.mode),
            classifier: FeedbackClassifier::new(config.feedback.clone()),
            selector,
            progression,
            round: RoundState::new(1, secret, ceiling, &config),
            rng,
            event_bus: EngineEventBus::new(),
            config,
        };
        let start = engine.open_round(Vec::new());
        (engine, start)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> &PlayerProfile {
        self.progression.profile()
    }

    pub fn progression(&self) -> &ProgressionState {
        self.progression.state()
    }

    pub fn store(&self) -> &S {
        self.progression.store()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.progression.store_mut()
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn subscribe(&mut self, handler: Box<dyn EngineEventHandler>) {
        self.event_bus.add_handler(handler);
    }

    /// Debug-only peek at the hidden value.
    pub fn reveal_secret(&self) -> &Secret {
        &self.round.secret
    }

    pub fn round_view(&self) -> RoundView {
        RoundView {
            round_id: self.round.round_id,
            generation: self.round.generation,
            mode: self.config.mode,
            status: self.round.status,
            attempts_used: self.round.attempts,
            attempts_allowed: self.config.max_attempts,
            bounds: self.round.bounds,
            code_length: match self.config.mode {
                guess_types::GameMode::Code => Some(self.config.effective_code_length() as u32),
                guess_types::GameMode::Numeric => None,
            },
            streak: self.round.streak,
        }
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats::from_progression(self.progression.profile(), self.progression.state())
    }

    fn attempts_remaining(&self) -> u32 {
        self.config.max_attempts.saturating_sub(self.round.attempts)
    }

    /// Begin a fresh round. Refused until the current one is won or lost.
    pub fn start_new_round(&mut self) -> Result<RoundStart, EngineError> {
        if !self.round.status.is_terminal() {
            return Err(EngineError::RoundInProgress);
        }

        let mut cues = Vec::new();
        if let Some(lives) = self.progression.recharge_if_depleted(&self.config) {
            info!(profile = %self.profile(), lives, "Lives recharged");
            cues.push(GameCue::LivesRecharged { to: lives });
            self.event_bus.publish(EngineEvent::LivesRecharged {
                profile: self.profile().clone(),
                lives,
            });
        }

        let ceiling = self.progression.state().range_ceiling;
        let secret = TargetGenerator::generate(
            self.config.mode,
            ceiling,
            self.config.effective_code_length(),
            &mut self.rng,
        );
        self.round = RoundState::new(self.round.generation + 1, secret, ceiling, &self.config);
        Ok(self.open_round(cues))
    }

    fn open_round(&mut self, mut cues: Vec<GameCue>) -> RoundStart {
        self.progression.record_round_started();

        let range_ceiling = self.config.mode.has_range().then_some(self.round.range_ceiling);
        cues.push(GameCue::RoundStarted { range_ceiling });
        let lines = self
            .selector
            .round_start(self.config.mode, self.round.range_ceiling, &mut self.rng);

        info!(
            profile = %self.profile(),
            round_id = %self.round.round_id,
            generation = self.round.generation,
            ?range_ceiling,
            "Round started"
        );
        self.event_bus.publish(EngineEvent::RoundStarted {
            round_id: self.round.round_id,
            generation: self.round.generation,
            profile: self.profile().clone(),
            range_ceiling,
        });

        RoundStart {
            round: self.round_view(),
            lines,
            cues: self.round.cue_batch(cues),
        }
    }

    fn rejected(&mut self, raw: &str, reason: RejectionReason) -> GuessOutcome {
        debug!(round_id = %self.round.round_id, input = raw, %reason, "Guess rejected");
        self.event_bus.publish(EngineEvent::GuessRejected {
            round_id: self.round.round_id,
            input: raw.to_string(),
        });

        GuessOutcome {
            accepted: false,
            rejection: Some(reason),
            status: self.round.status,
            guess: None,
            score: None,
            tier: None,
            comparison: None,
            streak: self.round.streak,
            attempts_used: self.round.attempts,
            attempts_remaining: self.attempts_remaining(),
            bounds: self.round.bounds,
            lines: Vec::new(),
            summary: None,
            cues: self.round.cue_batch(Vec::new()),
        }
    }

    /// Validate, score and classify one guess, then decide continue, win or
    /// loss. Rejections consume no attempt and leave the round untouched.
    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessOutcome, EngineError> {
        if self.round.status.is_terminal() {
            return Ok(self.rejected(raw, RejectionReason::RoundOver));
        }
        let guess = match self.validator.parse(raw, self.round.range_ceiling) {
            Ok(guess) => guess,
            Err(reason) => return Ok(self.rejected(raw, reason)),
        };

        let score = self.scorer.score(&guess, &self.round.secret)?;
        let classification =
            self.classifier
                .classify(&score, self.round.previous.as_ref(), self.round.streak);
        self.round.attempts += 1;
        self.round.streak = classification.streak;
        let attempts = self.round.attempts;

        debug!(
            round_id = %self.round.round_id,
            %guess,
            ?score,
            tier = classification.tier.as_str(),
            comparison = ?classification.comparison,
            streak = classification.streak,
            attempts,
            "Guess scored"
        );
        self.event_bus.publish(EngineEvent::GuessScored {
            round_id: self.round.round_id,
            guess: guess.clone(),
            tier: classification.tier,
            comparison: classification.comparison,
            streak: classification.streak,
            attempts_used: attempts,
        });

        let mut cues = Vec::new();
        let mut lines: Vec<DialogueLine> = Vec::new();
        let summary = if guess.matches(&self.round.secret) {
            Some(self.finish(true, attempts == 1, false, &mut cues))
        } else if attempts >= self.config.max_attempts {
            Some(self.finish(false, false, false, &mut cues))
        } else {
            let remaining = self.attempts_remaining();
            let context = SelectionContext {
                mode: self.config.mode,
                tier: classification.tier,
                direction: score.direction(),
                comparison: classification.comparison,
                streak: classification.streak,
                attempts_remaining: remaining,
            };
            lines = self.selector.select(&context, &mut self.rng);
            if self.config.dialogue.pressure_at.contains(&remaining) {
                cues.push(GameCue::PressureWarning {
                    attempts_remaining: remaining,
                });
            }

            let mut summary = None;
            if let guess_types::Guess::Number(value) = guess {
                self.round.narrow(value, &score);
                if let Some(bounds) = self.round.bounds {
                    cues.push(GameCue::BoundsNarrowed {
                        low: bounds.low,
                        high: bounds.high,
                    });
                    if bounds.is_collapsed() {
                        cues.push(GameCue::AutoResolved { value: bounds.low });
                        let won = self.progression.state().lives > 0;
                        summary = Some(self.finish(won, false, true, &mut cues));
                    }
                }
            }
            self.round.previous = Some(score.clone());
            summary
        };

        Ok(GuessOutcome {
            accepted: true,
            rejection: None,
            status: self.round.status,
            guess: Some(guess),
            score: Some(score),
            tier: Some(classification.tier),
            comparison: classification.comparison,
            streak: self.round.streak,
            attempts_used: attempts,
            attempts_remaining: self.attempts_remaining(),
            bounds: self.round.bounds,
            lines,
            summary,
            cues: self.round.cue_batch(cues),
        })
    }

    /// Terminal transition: update progression, emit cues, build the summary.
    fn finish(
        &mut self,
        won: bool,
        jackpot: bool,
        auto_resolved: bool,
        cues: &mut Vec<GameCue>,
    ) -> RoundSummary {
        let attempts = self.round.attempts;
        let mut new_best = false;

        if won {
            self.round.status = RoundStatus::Won;
            let effects = self.progression.record_win(attempts, jackpot, &self.config);
            new_best = effects.new_best;
            if effects.jackpot {
                cues.push(GameCue::Jackpot);
            }
            if effects.lives_after != effects.lives_before {
                cues.push(GameCue::LivesChanged {
                    from: effects.lives_before,
                    to: effects.lives_after,
                });
            } else if !effects.jackpot {
                cues.push(GameCue::LivesAlreadyFull);
            }
            if effects.new_best {
                cues.push(GameCue::NewBestScore { attempts });
            }
            if let Some((from, to)) = effects.range_expanded {
                cues.push(GameCue::RangeExpanded { from, to });
            }
        } else {
            self.round.status = RoundStatus::Lost;
            let effects = self.progression.record_loss(&self.config);
            if effects.lives_after != effects.lives_before {
                cues.push(GameCue::LivesChanged {
                    from: effects.lives_before,
                    to: effects.lives_after,
                });
            }
            if let Some((from, to)) = effects.range_reset {
                cues.push(GameCue::RangeReset { from, to });
                self.event_bus.publish(EngineEvent::RangeReset {
                    mode: self.config.mode,
                    from,
                    to,
                });
            }
        }

        let state = self.progression.state();
        let summary = RoundSummary {
            mode: self.config.mode,
            won,
            attempts,
            secret: self.round.secret.clone(),
            jackpot,
            auto_resolved,
            new_best,
            lives_remaining: state.lives,
            range_ceiling: self.config.mode.has_range().then_some(state.range_ceiling),
        };

        info!(
            profile = %self.profile(),
            round_id = %self.round.round_id,
            won,
            attempts,
            jackpot,
            auto_resolved,
            lives = summary.lives_remaining,
            "Round finished"
        );
        let round_id = self.round.round_id;
        self.event_bus.publish(if won {
            EngineEvent::RoundWon {
                round_id,
                summary: summary.clone(),
            }
        } else {
            EngineEvent::RoundLost {
                round_id,
                summary: summary.clone(),
            }
        });

        summary
    }
}

impl<S, R> std::fmt::Debug for GuessEngine<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuessEngine")
            .field("mode", &self.config.mode)
            .field("round_id", &self.round.round_id)
            .field("generation", &self.round.generation)
            .field("status", &self.round.status)
            .field("attempts", &self.round.attempts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionConfig;
    use crate::dialogue::DialogueBook;
    use crate::progression::InMemoryStore;
    use guess_types::{CounterKey, GameMode, Guess, Tier};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    type TestEngine = GuessEngine<InMemoryStore, ChaCha8Rng>;

    fn engine_with(mode: GameMode, store: InMemoryStore, seed: u64) -> TestEngine {
        let config = EngineConfig::for_mode(mode);
        let selector = DialogueSelector::new(Arc::new(DialogueBook::builtin()), SelectionConfig::default());
        let profile = PlayerProfile::new("ABC", mode);
        GuessEngine::start(profile, config, store, selector, ChaCha8Rng::seed_from_u64(seed)).0
    }

    fn engine(mode: GameMode) -> TestEngine {
        engine_with(mode, InMemoryStore::new(), 7)
    }

    fn set_secret(engine: &mut TestEngine, secret: Secret) {
        engine.round.secret = secret;
    }

    #[test]
    fn test_start_counts_a_game_and_opens_round() {
        let engine = engine(GameMode::Numeric);
        let view = engine.round_view();
        assert_eq!(view.generation, 1);
        assert_eq!(view.status, RoundStatus::AwaitingGuess);
        assert_eq!(view.bounds, Some(Bounds { low: 1, high: 100 }));
        assert_eq!(view.code_length, None);
        assert_eq!(engine.progression().games_played, 1);
    }

    #[test]
    fn test_numeric_narrowing_sequence() {
        let mut engine = engine(GameMode::Numeric);
        set_secret(&mut engine, Secret::Number(57));

        let outcome = engine.submit_guess("55").unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.tier, Some(Tier::Burning));
        assert_eq!(outcome.bounds, Some(Bounds { low: 56, high: 100 }));
        assert_eq!(outcome.attempts_remaining, 6);
        assert!(!outcome.lines.is_empty());
        assert!(outcome
            .cues
            .cues
            .contains(&GameCue::BoundsNarrowed { low: 56, high: 100 }));
    }

    #[test]
    fn test_code_first_try_jackpot() {
        let mut engine = engine(GameMode::Code);
        set_secret(&mut engine, Secret::Code(vec![4, 8, 2]));

        let outcome = engine.submit_guess("482").unwrap();
        assert_eq!(outcome.status, RoundStatus::Won);
        let summary = outcome.summary.unwrap();
        assert!(summary.jackpot);
        assert_eq!(summary.attempts, 1);
        assert_eq!(summary.lives_remaining, 4);
        assert!(outcome.cues.cues.contains(&GameCue::Jackpot));
        assert!(outcome.lines.is_empty());
    }

    #[test]
    fn test_scoring_happens_before_attempt_is_counted() {
        let mut engine = engine(GameMode::Code);
        // Wrong-shaped secret is an integration bug and must surface as an error
        set_secret(&mut engine, Secret::Number(5));
        let err = engine.submit_guess("482").unwrap_err();
        assert!(matches!(err, EngineError::Scoring(_)));
        assert_eq!(engine.round().attempts, 0);
    }

    #[test]
    fn test_new_round_refused_mid_round() {
        let mut engine = engine(GameMode::Numeric);
        set_secret(&mut engine, Secret::Number(57));
        assert!(matches!(engine.start_new_round(), Err(EngineError::RoundInProgress)));

        engine.submit_guess("10").unwrap();
        assert!(matches!(engine.start_new_round(), Err(EngineError::RoundInProgress)));

        engine.submit_guess("57").unwrap();
        let start = engine.start_new_round().unwrap();
        assert_eq!(start.round.generation, 2);
        assert_eq!(start.cues.generation, 2);
        assert_eq!(start.round.attempts_used, 0);
        assert_eq!(start.round.bounds, Some(Bounds { low: 1, high: 125 }));
    }

    #[test]
    fn test_first_round_does_not_recharge() {
        let profile = PlayerProfile::new("ABC", GameMode::Numeric);
        let mut store = InMemoryStore::new();
        store.set(&profile, CounterKey::LivesRemaining, 0).unwrap();
        let engine = engine_with(GameMode::Numeric, store, 1);
        assert_eq!(engine.progression().lives, 0);
    }

    #[test]
    fn test_guess_shape_follows_mode() {
        let mut engine = engine(GameMode::Code);
        set_secret(&mut engine, Secret::Code(vec![4, 8, 2]));
        let outcome = engine.submit_guess("248").unwrap();
        assert_eq!(outcome.guess, Some(Guess::Code(vec![2, 4, 8])));
        assert_eq!(outcome.tier, Some(Tier::Warm));
        assert_eq!(outcome.bounds, None);
    }
}

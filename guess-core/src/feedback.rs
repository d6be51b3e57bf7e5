use guess_types::{Comparison, ScoreResult, Tier};
use serde::{Deserialize, Serialize};

use crate::config::FeedbackConfig;

/// Everything the classifier derives from one scored guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: Tier,
    /// `None` on the first guess of a round.
    pub comparison: Option<Comparison>,
    /// Signed convergence streak after this guess.
    pub streak: i32,
}

/// Maps score results to tiers and tracks turn-over-turn convergence.
#[derive(Debug, Clone, Default)]
pub struct FeedbackClassifier {
    config: FeedbackConfig,
}

impl FeedbackClassifier {
    pub fn new(config: FeedbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    pub fn tier(&self, score: &ScoreResult) -> Tier {
        match score {
            ScoreResult::Distance { distance, .. } => {
                let [burning, hot, warm, cool] = self.config.numeric_thresholds;
                match *distance {
                    d if d <= burning => Tier::Burning,
                    d if d <= hot => Tier::Hot,
                    d if d <= warm => Tier::Warm,
                    d if d <= cool => Tier::Cool,
                    _ => Tier::Cold,
                }
            }
            ScoreResult::Positional { exact, present, .. } => {
                let (exact, present) = (*exact, *present);
                if exact >= 2 {
                    Tier::Hot
                } else if (exact == 1 && present >= 1) || present >= 2 {
                    Tier::Warm
                } else if exact == 1 || present >= 1 {
                    Tier::Cool
                } else {
                    Tier::Cold
                }
            }
        }
    }

    /// Higher is better. Negated distance in numeric mode, weighted
    /// exact/present counts in code mode.
    pub fn quality(&self, score: &ScoreResult) -> i64 {
        match score {
            ScoreResult::Distance { distance, .. } => -i64::from(*distance),
            ScoreResult::Positional { exact, present, .. } => {
                self.config.exact_weight * i64::from(*exact)
                    + self.config.present_weight * i64::from(*present)
            }
        }
    }

    fn tolerance(&self, score: &ScoreResult) -> i64 {
        match score {
            ScoreResult::Distance { .. } => self.config.numeric_tolerance,
            ScoreResult::Positional { .. } => self.config.code_tolerance,
        }
    }

    pub fn compare(&self, previous: Option<&ScoreResult>, current: &ScoreResult) -> Option<Comparison> {
        let previous = previous?;
        let delta = self.quality(current) - self.quality(previous);
        let tolerance = self.tolerance(current);

        Some(if delta > tolerance {
            Comparison::Improved
        } else if delta < -tolerance {
            Comparison::Regressed
        } else {
            Comparison::Unchanged
        })
    }

    /// Streak grows in magnitude while the sign holds, flips on a reversal and
    /// clears on an unchanged result. No comparison leaves it untouched.
    pub fn next_streak(streak: i32, comparison: Option<Comparison>) -> i32 {
        match comparison {
            None => streak,
            Some(Comparison::Improved) => {
                if streak > 0 {
                    streak.saturating_add(1)
                } else {
                    1
                }
            }
            Some(Comparison::Regressed) => {
                if streak < 0 {
                    streak.saturating_sub(1)
                } else {
                    -1
                }
            }
            Some(Comparison::Unchanged) => 0,
        }
    }

    pub fn classify(
        &self,
        score: &ScoreResult,
        previous: Option<&ScoreResult>,
        streak: i32,
    ) -> Classification {
        let comparison = self.compare(previous, score);
        Classification {
            tier: self.tier(score),
            comparison,
            streak: Self::next_streak(streak, comparison),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guess_types::{Direction, PositionMark};

    fn distance(d: u32) -> ScoreResult {
        ScoreResult::Distance {
            distance: d,
            direction: Direction::Below,
        }
    }

    fn positional(exact: u32, present: u32) -> ScoreResult {
        let absent = 3 - exact - present;
        let mut marks = vec![PositionMark::Exact; exact as usize];
        marks.extend(vec![PositionMark::Present; present as usize]);
        marks.extend(vec![PositionMark::Absent; absent as usize]);
        ScoreResult::Positional {
            marks,
            exact,
            present,
            absent,
        }
    }

    #[test]
    fn test_numeric_tier_thresholds() {
        let classifier = FeedbackClassifier::default();
        assert_eq!(classifier.tier(&distance(0)), Tier::Burning);
        assert_eq!(classifier.tier(&distance(2)), Tier::Burning);
        assert_eq!(classifier.tier(&distance(3)), Tier::Burning);
        assert_eq!(classifier.tier(&distance(4)), Tier::Hot);
        assert_eq!(classifier.tier(&distance(10)), Tier::Hot);
        assert_eq!(classifier.tier(&distance(11)), Tier::Warm);
        assert_eq!(classifier.tier(&distance(25)), Tier::Warm);
        assert_eq!(classifier.tier(&distance(50)), Tier::Cool);
        assert_eq!(classifier.tier(&distance(51)), Tier::Cold);
    }

    #[test]
    fn test_code_tier_thresholds() {
        let classifier = FeedbackClassifier::default();
        assert_eq!(classifier.tier(&positional(3, 0)), Tier::Hot);
        assert_eq!(classifier.tier(&positional(2, 0)), Tier::Hot);
        assert_eq!(classifier.tier(&positional(1, 1)), Tier::Warm);
        assert_eq!(classifier.tier(&positional(0, 3)), Tier::Warm);
        assert_eq!(classifier.tier(&positional(0, 2)), Tier::Warm);
        assert_eq!(classifier.tier(&positional(1, 0)), Tier::Cool);
        assert_eq!(classifier.tier(&positional(0, 1)), Tier::Cool);
        assert_eq!(classifier.tier(&positional(0, 0)), Tier::Cold);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = FeedbackClassifier::new(FeedbackConfig {
            numeric_thresholds: [1, 2, 3, 4],
            ..FeedbackConfig::default()
        });
        assert_eq!(classifier.tier(&distance(2)), Tier::Hot);
        assert_eq!(classifier.tier(&distance(5)), Tier::Cold);
    }

    #[test]
    fn test_numeric_comparison_tolerance_band() {
        let classifier = FeedbackClassifier::default();
        assert_eq!(classifier.compare(None, &distance(10)), None);
        assert_eq!(
            classifier.compare(Some(&distance(20)), &distance(10)),
            Some(Comparison::Improved)
        );
        assert_eq!(
            classifier.compare(Some(&distance(20)), &distance(18)),
            Some(Comparison::Unchanged)
        );
        assert_eq!(
            classifier.compare(Some(&distance(20)), &distance(22)),
            Some(Comparison::Unchanged)
        );
        assert_eq!(
            classifier.compare(Some(&distance(20)), &distance(23)),
            Some(Comparison::Regressed)
        );
    }

    #[test]
    fn test_code_comparison_uses_weights() {
        let classifier = FeedbackClassifier::default();
        // 2*1 + 0 = 2 vs 2*0 + 2 = 2
        assert_eq!(
            classifier.compare(Some(&positional(0, 2)), &positional(1, 0)),
            Some(Comparison::Unchanged)
        );
        assert_eq!(
            classifier.compare(Some(&positional(0, 1)), &positional(1, 1)),
            Some(Comparison::Improved)
        );
        assert_eq!(
            classifier.compare(Some(&positional(2, 0)), &positional(0, 3)),
            Some(Comparison::Regressed)
        );
    }

    #[test]
    fn test_streak_transitions() {
        use Comparison::*;
        assert_eq!(FeedbackClassifier::next_streak(0, None), 0);
        assert_eq!(FeedbackClassifier::next_streak(2, None), 2);
        assert_eq!(FeedbackClassifier::next_streak(0, Some(Improved)), 1);
        assert_eq!(FeedbackClassifier::next_streak(2, Some(Improved)), 3);
        assert_eq!(FeedbackClassifier::next_streak(-2, Some(Improved)), 1);
        assert_eq!(FeedbackClassifier::next_streak(3, Some(Regressed)), -1);
        assert_eq!(FeedbackClassifier::next_streak(-1, Some(Regressed)), -2);
        assert_eq!(FeedbackClassifier::next_streak(-4, Some(Unchanged)), 0);
        assert_eq!(FeedbackClassifier::next_streak(4, Some(Unchanged)), 0);
    }

    #[test]
    fn test_classify_combines_everything() {
        let classifier = FeedbackClassifier::default();
        let result = classifier.classify(&distance(2), Some(&distance(40)), 2);
        assert_eq!(result.tier, Tier::Burning);
        assert_eq!(result.comparison, Some(Comparison::Improved));
        assert_eq!(result.streak, 3);
    }
}

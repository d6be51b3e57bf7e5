//! Flavor text selection.
//!
//! Pool contents come from a [`DialogueBook`] supplied by the presentation
//! layer; this module only decides which pool to draw from and when the
//! supplementary pools fire. Selection never touches game state.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use guess_types::{Comparison, DialogueLine, Direction, GameMode, LineCategory, Tier};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;

/// One pool per tier. Lookups are an exhaustive match, so adding a tier
/// forces a pool for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPools {
    pub burning: Vec<String>,
    pub hot: Vec<String>,
    pub warm: Vec<String>,
    pub cool: Vec<String>,
    pub cold: Vec<String>,
}

impl TierPools {
    pub fn get(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Burning => &self.burning,
            Tier::Hot => &self.hot,
            Tier::Warm => &self.warm,
            Tier::Cool => &self.cool,
            Tier::Cold => &self.cold,
        }
    }
}

/// Numeric hints depend on which way the player has to move.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalPools {
    /// Guess was below the secret.
    pub below: TierPools,
    /// Guess was above the secret.
    pub above: TierPools,
}

impl DirectionalPools {
    pub fn get(&self, tier: Tier, direction: Direction) -> &[String] {
        match direction {
            Direction::Below => self.below.get(tier),
            Direction::Above => self.above.get(tier),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonPools {
    pub improved: Vec<String>,
    pub regressed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl ComparisonPools {
    pub fn get(&self, comparison: Comparison) -> &[String] {
        match comparison {
            Comparison::Improved => &self.improved,
            Comparison::Regressed => &self.regressed,
            Comparison::Unchanged => &self.unchanged,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakPools {
    pub converging: Vec<String>,
    pub diverging: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangePools {
    pub extended: Vec<String>,
    pub widening: Vec<String>,
}

/// All flavor text pools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueBook {
    pub numeric: DirectionalPools,
    pub code: TierPools,
    pub comparison: ComparisonPools,
    pub streak: StreakPools,
    /// Keyed by attempts remaining.
    pub pressure: BTreeMap<u32, Vec<String>>,
    pub range: RangePools,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl DialogueBook {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse dialogue book")
    }

    /// Small default book so the engine works without external content.
    pub fn builtin() -> Self {
        let below = TierPools {
            burning: lines(&["right on top of it. nudge higher.", "signal deafening. go up."]),
            hot: lines(&["close. adjust upward.", "strong read. a little higher."]),
            warm: lines(&["signal detected above you.", "on approach. keep climbing."]),
            cool: lines(&["weak signal. target is higher.", "not close. search well above."]),
            cold: lines(&["nothing down here. much higher.", "signal void. go way up."]),
        };
        let above = TierPools {
            burning: lines(&["right on top of it. nudge lower.", "signal deafening. go down."]),
            hot: lines(&["close. adjust downward.", "strong read. a little lower."]),
            warm: lines(&["signal detected below you.", "on approach. keep descending."]),
            cool: lines(&["weak signal. target is lower.", "not close. search well below."]),
            cold: lines(&["nothing up here. much lower.", "signal void. go way down."]),
        };
        let code = TierPools {
            burning: lines(&["lock imminent."]),
            hot: lines(&["two digits locked. almost there.", "the code is nearly open."]),
            warm: lines(&["good traces. rearrange them.", "the right digits are in play."]),
            cool: lines(&["one trace found.", "faint signal. one digit counts."]),
            cold: lines(&["no traces. try fresh digits.", "nothing matches. rethink."]),
        };

        let mut pressure = BTreeMap::new();
        pressure.insert(3, lines(&["3 guesses left. narrow it down."]));
        pressure.insert(2, lines(&["2 guesses remaining. make them count."]));
        pressure.insert(1, lines(&["final guess. make it matter."]));

        Self {
            numeric: DirectionalPools { below, above },
            code,
            comparison: ComparisonPools {
                improved: lines(&["closer than last time.", "narrowing the gap."]),
                regressed: lines(&["farther than before.", "wrong direction."]),
                unchanged: lines(&["no closer, no farther.", "the signal didn't move."]),
            },
            streak: StreakPools {
                converging: lines(&["you're hunting it down.", "methodical. keep it up."]),
                diverging: lines(&["each guess worse than the last.", "reset your approach."]),
            },
            pressure,
            range: RangePools {
                extended: lines(&["extended range active. precision is everything now."]),
                widening: lines(&["range is expanding. adjust your strategy."]),
            },
        }
    }

    pub fn tier_pool(&self, mode: GameMode, tier: Tier, direction: Option<Direction>) -> &[String] {
        match (mode, direction) {
            (GameMode::Numeric, Some(direction)) => self.numeric.get(tier, direction),
            (GameMode::Numeric, None) => self.numeric.below.get(tier),
            (GameMode::Code, _) => self.code.get(tier),
        }
    }

    pub fn pressure_pool(&self, attempts_remaining: u32) -> &[String] {
        self.pressure
            .get(&attempts_remaining)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Inputs of one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionContext {
    pub mode: GameMode,
    pub tier: Tier,
    pub direction: Option<Direction>,
    pub comparison: Option<Comparison>,
    pub streak: i32,
    pub attempts_remaining: u32,
}

/// Picks lines from a shared [`DialogueBook`].
#[derive(Debug, Clone)]
pub struct DialogueSelector {
    book: Arc<DialogueBook>,
    config: SelectionConfig,
}

impl DialogueSelector {
    pub fn new(book: Arc<DialogueBook>, config: SelectionConfig) -> Self {
        Self { book, config }
    }

    pub fn book(&self) -> &DialogueBook {
        &self.book
    }

    /// Primary tier line, then comparison, streak and pressure lines when
    /// their triggers fire. Empty pools are skipped.
    pub fn select<R: Rng>(&self, ctx: &SelectionContext, rng: &mut R) -> Vec<DialogueLine> {
        let mut out = Vec::new();

        let tier_pool = self.book.tier_pool(ctx.mode, ctx.tier, ctx.direction);
        push_random(&mut out, LineCategory::Tier, tier_pool, rng);

        if let Some(comparison) = ctx.comparison {
            if roll(rng, self.config.comparison_probability) {
                push_random(
                    &mut out,
                    LineCategory::Comparison,
                    self.book.comparison.get(comparison),
                    rng,
                );
            }
        }

        if ctx.streak.unsigned_abs() >= self.config.streak_threshold
            && roll(rng, self.config.streak_probability)
        {
            let pool = if ctx.streak > 0 {
                &self.book.streak.converging
            } else {
                &self.book.streak.diverging
            };
            push_random(&mut out, LineCategory::Streak, pool, rng);
        }

        if self.config.pressure_at.contains(&ctx.attempts_remaining) {
            push_random(
                &mut out,
                LineCategory::Pressure,
                self.book.pressure_pool(ctx.attempts_remaining),
                rng,
            );
        }

        out
    }

    /// System line announcing a large numeric range, if any.
    pub fn round_start<R: Rng>(&self, mode: GameMode, range_ceiling: u32, rng: &mut R) -> Vec<DialogueLine> {
        let mut out = Vec::new();
        if !mode.has_range() {
            return out;
        }

        if range_ceiling >= self.config.extended_range_at {
            push_random(&mut out, LineCategory::System, &self.book.range.extended, rng);
        } else if range_ceiling >= self.config.widening_range_at
            && roll(rng, self.config.widening_probability)
        {
            push_random(&mut out, LineCategory::System, &self.book.range.widening, rng);
        }
        out
    }
}

fn roll<R: Rng>(rng: &mut R, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

fn push_random<R: Rng>(out: &mut Vec<DialogueLine>, category: LineCategory, pool: &[String], rng: &mut R) {
    if let Some(text) = pool.choose(rng) {
        out.push(DialogueLine {
            category,
            text: text.clone(),
        });
    }
}

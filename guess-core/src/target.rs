use guess_types::{GameMode, Secret};
use rand::Rng;
use tracing::debug;

use crate::config::CODE_LENGTH_RANGE;

/// Produces the hidden value at the start of each round.
pub struct TargetGenerator;

impl TargetGenerator {
    /// Uniform integer in `[1, ceiling]`.
    pub fn numeric<R: Rng>(ceiling: u32, rng: &mut R) -> Secret {
        let ceiling = ceiling.max(1);
        Secret::Number(rng.gen_range(1..=ceiling))
    }

    /// `length` distinct digits, the first one non-zero.
    ///
    /// The first digit is drawn from 1-9; the rest come from a partial
    /// Fisher-Yates shuffle of the unused digits, kept in draw order.
    pub fn code<R: Rng>(length: usize, rng: &mut R) -> Secret {
        let length = length.clamp(*CODE_LENGTH_RANGE.start(), *CODE_LENGTH_RANGE.end());
        let first = rng.gen_range(1..=9u8);

        let mut pool: Vec<u8> = (0..=9u8).filter(|d| *d != first).collect();
        let rest = length - 1;
        for i in 0..rest {
            let j = rng.gen_range(i..pool.len());
            pool.swap(i, j);
        }

        let mut digits = Vec::with_capacity(length);
        digits.push(first);
        digits.extend_from_slice(&pool[..rest]);
        Secret::Code(digits)
    }

    pub fn generate<R: Rng>(
        mode: GameMode,
        range_ceiling: u32,
        code_length: usize,
        rng: &mut R,
    ) -> Secret {
        let secret = match mode {
            GameMode::Numeric => Self::numeric(range_ceiling, rng),
            GameMode::Code => Self::code(code_length, rng),
        };
        debug!(%mode, %secret, "Generated secret");
        secret
    }
}

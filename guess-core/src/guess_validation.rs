use guess_types::{GameMode, Guess, RejectionReason};

/// Turns raw player input into a [`Guess`] of the mode's shape.
#[derive(Debug, Clone, Copy)]
pub struct GuessValidator {
    mode: GameMode,
    code_length: usize,
}

impl GuessValidator {
    pub fn new(mode: GameMode, code_length: usize) -> Self {
        Self { mode, code_length }
    }

    /// Validate `raw` against the mode. `range_ceiling` only matters in
    /// numeric mode.
    pub fn parse(&self, raw: &str, range_ceiling: u32) -> Result<Guess, RejectionReason> {
        match self.mode {
            GameMode::Numeric => parse_number(raw, range_ceiling),
            GameMode::Code => parse_code(raw, self.code_length),
        }
    }
}

/// Integer in `[1, ceiling]`.
pub fn parse_number(raw: &str, ceiling: u32) -> Result<Guess, RejectionReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectionReason::Malformed {
            input: raw.to_string(),
        });
    }

    let out_of_range = RejectionReason::OutOfRange {
        low: 1,
        high: ceiling,
    };
    // All digits, so a parse failure can only be overflow
    let value: u32 = trimmed.parse().map_err(|_| out_of_range.clone())?;
    if value < 1 || value > ceiling {
        return Err(out_of_range);
    }
    Ok(Guess::Number(value))
}

/// Exactly `length` ASCII digits. Repeats and a leading zero are accepted.
pub fn parse_code(raw: &str, length: usize) -> Result<Guess, RejectionReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectionReason::Malformed {
            input: raw.to_string(),
        });
    }
    if trimmed.len() != length {
        return Err(RejectionReason::WrongLength {
            expected: length as u32,
            actual: trimmed.len() as u32,
        });
    }
    Ok(Guess::Code(trimmed.bytes().map(|b| b - b'0').collect()))
}

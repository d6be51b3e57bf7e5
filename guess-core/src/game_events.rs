use guess_types::{Comparison, GameMode, Guess, PlayerProfile, RoundId, RoundSummary, Tier};

/// Engine-level notifications, published after each state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RoundStarted {
        round_id: RoundId,
        generation: u64,
        profile: PlayerProfile,
        range_ceiling: Option<u32>,
    },
    GuessRejected {
        round_id: RoundId,
        input: String,
    },
    GuessScored {
        round_id: RoundId,
        guess: Guess,
        tier: Tier,
        comparison: Option<Comparison>,
        streak: i32,
        attempts_used: u32,
    },
    RoundWon {
        round_id: RoundId,
        summary: RoundSummary,
    },
    RoundLost {
        round_id: RoundId,
        summary: RoundSummary,
    },
    LivesRecharged {
        profile: PlayerProfile,
        lives: u32,
    },
    RangeReset {
        mode: GameMode,
        from: u32,
        to: u32,
    },
}

impl EngineEvent {
    pub fn round_id(&self) -> Option<RoundId> {
        match self {
            EngineEvent::RoundStarted { round_id, .. }
            | EngineEvent::GuessRejected { round_id, .. }
            | EngineEvent::GuessScored { round_id, .. }
            | EngineEvent::RoundWon { round_id, .. }
            | EngineEvent::RoundLost { round_id, .. } => Some(*round_id),
            EngineEvent::LivesRecharged { .. } | EngineEvent::RangeReset { .. } => None,
        }
    }
}

/// Event handler trait for processing engine events
pub trait EngineEventHandler: Send {
    fn handle_event(&mut self, event: EngineEvent);
}

/// Simple event bus for distributing engine events
pub struct EngineEventBus {
    handlers: Vec<Box<dyn EngineEventHandler>>,
}

impl EngineEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn EngineEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn publish(&mut self, event: EngineEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(event.clone());
        }
    }
}

impl Default for EngineEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EngineEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

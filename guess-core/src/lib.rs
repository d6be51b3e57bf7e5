pub mod config;
pub mod dialogue;
pub mod feedback;
pub mod game_events;
pub mod game_state;
pub mod guess_validation;
pub mod progression;
pub mod scoring;
pub mod target;

// Re-export main components
pub use config::*;
pub use dialogue::*;
pub use feedback::*;
pub use game_events::*;
pub use game_state::*;
pub use guess_validation::*;
pub use progression::*;
pub use scoring::*;
pub use target::*;

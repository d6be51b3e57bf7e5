pub mod errors;
pub mod game;
pub mod messages;
pub mod player;

pub type RoundId = uuid::Uuid;
pub type SessionId = uuid::Uuid;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use player::*;

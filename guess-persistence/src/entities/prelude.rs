pub use super::player_counters::Entity as PlayerCounters;

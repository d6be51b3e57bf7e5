pub mod prelude;

pub mod player_counters;

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use guess_core::{
    DialogueBook, DialogueSelector, EngineConfig, EngineEvent, EngineEventHandler, GuessEngine,
    InMemoryStore, ProgressionStore, SelectionConfig,
};
use guess_types::{CounterKey, GameMode, PlayerProfile, Secret};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub type TestEngine<S = InMemoryStore> = GuessEngine<S, ChaCha8Rng>;

pub const CALLSIGN: &str = "ABC";

pub fn profile(mode: GameMode) -> PlayerProfile {
    PlayerProfile::new(CALLSIGN, mode)
}

pub fn create_test_selector() -> DialogueSelector {
    DialogueSelector::new(Arc::new(DialogueBook::builtin()), SelectionConfig::default())
}

/// Engine over any store with a fixed seed.
pub fn create_engine_with_store<S: ProgressionStore>(mode: GameMode, store: S, seed: u64) -> TestEngine<S> {
    let (engine, _) = GuessEngine::start(
        profile(mode),
        EngineConfig::for_mode(mode),
        store,
        create_test_selector(),
        ChaCha8Rng::seed_from_u64(seed),
    );
    engine
}

/// Code-mode engine with a custom code length.
pub fn create_code_engine(code_length: usize) -> TestEngine {
    let config = EngineConfig {
        code_length,
        ..EngineConfig::code()
    };
    let (engine, _) = GuessEngine::start(
        profile(GameMode::Code),
        config,
        InMemoryStore::new(),
        create_test_selector(),
        ChaCha8Rng::seed_from_u64(42),
    );
    engine
}

pub fn create_engine(mode: GameMode) -> TestEngine {
    create_engine_with_store(mode, InMemoryStore::new(), 42)
}

/// Store pre-seeded with counters for the default profile.
pub fn seeded_store(mode: GameMode, counters: &[(CounterKey, i64)]) -> InMemoryStore {
    let mut store = InMemoryStore::new();
    let profile = profile(mode);
    for (key, value) in counters {
        store.set(&profile, *key, *value).unwrap();
    }
    store
}

pub fn secret_number<S, R>(engine: &GuessEngine<S, R>) -> u32
where
    S: ProgressionStore,
    R: rand::Rng,
{
    match engine.reveal_secret() {
        Secret::Number(n) => *n,
        other => panic!("expected a numeric secret, got {:?}", other),
    }
}

pub fn secret_code<S, R>(engine: &GuessEngine<S, R>) -> String
where
    S: ProgressionStore,
    R: rand::Rng,
{
    match engine.reveal_secret() {
        Secret::Code(_) => engine.reveal_secret().to_string(),
        other => panic!("expected a code secret, got {:?}", other),
    }
}

/// A numeric guess that misses without ever pinning the secret.
pub fn harmless_miss(secret: u32) -> String {
    if secret == 1 { "100".to_string() } else { "1".to_string() }
}

/// A code guess with no exact position: every digit shifted by one.
pub fn wrong_code(secret: &str) -> String {
    secret
        .chars()
        .filter_map(|c| c.to_digit(10))
        .filter_map(|d| char::from_digit((d + 1) % 10, 10))
        .collect()
}

/// Store that fails every read and write.
#[derive(Debug, Default)]
pub struct FailingStore {
    pub writes_attempted: usize,
}

impl ProgressionStore for FailingStore {
    fn get(&self, _: &PlayerProfile, _: CounterKey) -> anyhow::Result<Option<i64>> {
        Err(anyhow!("disk on fire"))
    }

    fn set(&mut self, _: &PlayerProfile, _: CounterKey, _: i64) -> anyhow::Result<()> {
        self.writes_attempted += 1;
        Err(anyhow!("disk on fire"))
    }
}

/// Event collector for testing event emissions
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn last_event(&self) -> Option<EngineEvent> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn has_event_type(&self, check_fn: impl Fn(&EngineEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(check_fn)
    }
}

impl EngineEventHandler for EventCollector {
    fn handle_event(&mut self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

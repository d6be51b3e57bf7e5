use std::collections::HashMap;

use anyhow::Result;
use guess_core::ProgressionStore;
use guess_types::{CounterKey, PlayerProfile};
use tracing::{debug, warn};

use crate::repositories::CounterRepository;

/// Write-behind progression store.
///
/// The engine is synchronous, so counters are loaded up front and served
/// from memory. Writes land in the cache immediately and queue up until the
/// owner calls [`CachedProgressionStore::flush`] from async code.
#[derive(Debug, Clone, Default)]
pub struct CachedProgressionStore {
    values: HashMap<(PlayerProfile, CounterKey), i64>,
    pending: HashMap<(PlayerProfile, CounterKey), i64>,
}

impl CachedProgressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a profile's counters from the database. A failed read logs and
    /// yields an empty cache so the engine falls back to defaults.
    pub async fn load(repo: &CounterRepository, profile: &PlayerProfile) -> Self {
        let mut store = Self::new();
        match repo.load_profile(profile).await {
            Ok(counters) => {
                debug!(profile = %profile, count = counters.len(), "Loaded counters");
                for (key, value) in counters {
                    store.values.insert((profile.clone(), key), value);
                }
            }
            Err(e) => warn!(profile = %profile, error = %e, "Failed to load counters, using defaults"),
        }
        store
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Push queued writes to the database. On failure the unwritten entries
    /// stay queued for the next flush.
    pub async fn flush(&mut self, repo: &CounterRepository) -> Result<usize> {
        let mut queued: Vec<_> = self.pending.drain().collect();
        let mut written = 0;

        while let Some(((profile, key), value)) = queued.pop() {
            if let Err(e) = repo.upsert(&profile, key, value).await {
                // Keep anything newer that was queued meanwhile
                self.pending.entry((profile, key)).or_insert(value);
                for (entry, value) in queued {
                    self.pending.entry(entry).or_insert(value);
                }
                return Err(e);
            }
            written += 1;
        }
        Ok(written)
    }
}

impl ProgressionStore for CachedProgressionStore {
    fn get(&self, profile: &PlayerProfile, key: CounterKey) -> Result<Option<i64>> {
        Ok(self.values.get(&(profile.clone(), key)).copied())
    }

    fn set(&mut self, profile: &PlayerProfile, key: CounterKey, value: i64) -> Result<()> {
        self.values.insert((profile.clone(), key), value);
        self.pending.insert((profile.clone(), key), value);
        Ok(())
    }
}

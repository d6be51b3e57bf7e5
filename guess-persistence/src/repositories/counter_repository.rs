use std::collections::HashMap;

use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::debug;

use crate::entities::{player_counters, prelude::*};
use guess_types::{CounterKey, PlayerProfile};

#[derive(Debug, Clone)]
pub struct CounterRepository {
    db: DatabaseConnection,
}

impl CounterRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every stored counter of a profile. Rows with unknown key names are
    /// skipped.
    pub async fn load_profile(&self, profile: &PlayerProfile) -> Result<HashMap<CounterKey, i64>> {
        let rows = PlayerCounters::find()
            .filter(player_counters::Column::Profile.eq(profile.storage_key()))
            .all(&self.db)
            .await?;

        let mut counters = HashMap::with_capacity(rows.len());
        for row in rows {
            match CounterKey::from_name(&row.counter_key) {
                Some(key) => {
                    counters.insert(key, row.value);
                }
                None => debug!(profile = %profile, key = %row.counter_key, "Skipping unknown counter"),
            }
        }
        Ok(counters)
    }

    pub async fn get(&self, profile: &PlayerProfile, key: CounterKey) -> Result<Option<i64>> {
        let row = PlayerCounters::find_by_id((profile.storage_key(), key.as_str().to_string()))
            .one(&self.db)
            .await?;
        Ok(row.map(|model| model.value))
    }

    /// Insert or overwrite a single counter.
    pub async fn upsert(&self, profile: &PlayerProfile, key: CounterKey, value: i64) -> Result<()> {
        let model = player_counters::ActiveModel {
            profile: ActiveValue::Set(profile.storage_key()),
            counter_key: ActiveValue::Set(key.as_str().to_string()),
            value: ActiveValue::Set(value),
            updated_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        PlayerCounters::insert(model)
            .on_conflict(
                OnConflict::columns([
                    player_counters::Column::Profile,
                    player_counters::Column::CounterKey,
                ])
                .update_columns([
                    player_counters::Column::Value,
                    player_counters::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}

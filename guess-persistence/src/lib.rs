pub mod cached_store;
pub mod connection;
pub mod entities;
pub mod repositories;

pub use cached_store::CachedProgressionStore;
pub use repositories::CounterRepository;

use sea_orm::{DatabaseConnection, DbErr};

pub struct DatabaseManager {
    connection: DatabaseConnection,
}

impl DatabaseManager {
    /// Connect and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let connection = connection::connect_and_migrate(database_url).await?;
        Ok(Self { connection })
    }

    pub fn counters(&self) -> CounterRepository {
        CounterRepository::new(self.connection.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guess_types::{CounterKey, GameMode, PlayerProfile};

    #[tokio::test]
    async fn test_manager_migrates_before_handing_out_repositories() {
        let manager = DatabaseManager::connect("sqlite::memory:").await.unwrap();
        let counters = manager.counters();
        let profile = PlayerProfile::new("ABC", GameMode::Numeric);

        counters.upsert(&profile, CounterKey::Wins, 3).await.unwrap();
        assert_eq!(counters.get(&profile, CounterKey::Wins).await.unwrap(), Some(3));
    }
}

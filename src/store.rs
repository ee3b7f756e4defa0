use crate::entities;
use crate::errors::GateError;
use crate::settings::Database as DbCfg;
use async_trait::async_trait;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;

/// Read-only preference backend. All three lookups treat absence as a
/// regular answer; only a backend failure is an error.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Category a registered file belongs to. `None` means unregistered.
    async fn category_for_file(&self, filepath: &str) -> Result<Option<i64>, GateError>;

    /// The account's explicit override for a category, if it made one.
    async fn explicit_preference(
        &self,
        sid3: i64,
        categoryid: i64,
    ) -> Result<Option<bool>, GateError>;

    /// The category's default. `None` when the category row is missing.
    async fn category_default(&self, categoryid: i64) -> Result<Option<bool>, GateError>;
}

/// Connect to the configured backend, or fall back to [`DefaultAllowStore`]
/// when no database is configured.
pub async fn init(cfg: &DbCfg) -> Result<Arc<dyn PreferenceStore>, GateError> {
    match &cfg.url {
        Some(url) => {
            let db = Database::connect(url).await?;
            Ok(Arc::new(DbStore::new(db)))
        }
        None => {
            tracing::warn!("No database configured; every download will be allowed");
            Ok(Arc::new(DefaultAllowStore))
        }
    }
}

/// SeaORM-backed store over the `files`/`categories`/`downloadprefs` tables.
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PreferenceStore for DbStore {
    async fn category_for_file(&self, filepath: &str) -> Result<Option<i64>, GateError> {
        use entities::file::{Column, Entity};

        let row = Entity::find()
            .filter(Column::Filepath.eq(filepath))
            .one(&self.db)
            .await?;
        Ok(row.map(|m| m.categoryid))
    }

    async fn explicit_preference(
        &self,
        sid3: i64,
        categoryid: i64,
    ) -> Result<Option<bool>, GateError> {
        let row = entities::Preference::find_by_id((sid3, categoryid))
            .one(&self.db)
            .await?;
        Ok(row.map(|m| m.enabled != 0))
    }

    async fn category_default(&self, categoryid: i64) -> Result<Option<bool>, GateError> {
        let row = entities::Category::find_by_id(categoryid)
            .one(&self.db)
            .await?;
        Ok(row.map(|m| m.enabled != 0))
    }
}

/// Stub store for deployments without a preference database: no file is
/// registered, so resolution always lands on the unregistered-file allow.
pub struct DefaultAllowStore;

#[async_trait]
impl PreferenceStore for DefaultAllowStore {
    async fn category_for_file(&self, _filepath: &str) -> Result<Option<i64>, GateError> {
        Ok(None)
    }

    async fn explicit_preference(
        &self,
        _sid3: i64,
        _categoryid: i64,
    ) -> Result<Option<bool>, GateError> {
        Ok(None)
    }

    async fn category_default(&self, _categoryid: i64) -> Result<Option<bool>, GateError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, Set};

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to test database");
        migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    #[tokio::test]
    async fn test_lookups_return_none_on_empty_tables() {
        let store = DbStore::new(test_db().await);

        assert_eq!(store.category_for_file("maps/b.bsp").await.unwrap(), None);
        assert_eq!(store.explicit_preference(123, 1).await.unwrap(), None);
        assert_eq!(store.category_default(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookups_return_seeded_rows() {
        let db = test_db().await;
        entities::file::ActiveModel {
            filepath: Set("maps/b.bsp".to_string()),
            categoryid: Set(1),
        }
        .insert(&db)
        .await
        .expect("Failed to insert file");
        entities::category::ActiveModel {
            categoryid: Set(1),
            enabled: Set(0),
        }
        .insert(&db)
        .await
        .expect("Failed to insert category");
        entities::preference::ActiveModel {
            sid3: Set(123),
            categoryid: Set(1),
            enabled: Set(1),
        }
        .insert(&db)
        .await
        .expect("Failed to insert preference");

        let store = DbStore::new(db);
        assert_eq!(
            store.category_for_file("maps/b.bsp").await.unwrap(),
            Some(1)
        );
        assert_eq!(
            store.explicit_preference(123, 1).await.unwrap(),
            Some(true)
        );
        assert_eq!(store.category_default(1).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_default_allow_store_registers_nothing() {
        let store = DefaultAllowStore;
        assert_eq!(store.category_for_file("maps/b.bsp").await.unwrap(), None);
        assert_eq!(store.explicit_preference(123, 1).await.unwrap(), None);
        assert_eq!(store.category_default(1).await.unwrap(), None);
    }
}

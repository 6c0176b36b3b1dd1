use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::models::{Video, VideoFields};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("video {0} already exists")]
    AlreadyExists(i64),

    #[error("video {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Storage(#[from] sqlx::Error),
}

/// Keyed persistence for [`Video`] records.
///
/// Each operation is a single statement, so concurrent calls on the same id
/// are ordered one entirely before the other.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Video>, StoreError>;

    /// Fails with [`StoreError::AlreadyExists`] rather than overwriting.
    async fn create(&self, id: i64, fields: VideoFields) -> Result<Video, StoreError>;

    /// Replaces name, views and likes together.
    async fn update(&self, id: i64, fields: VideoFields) -> Result<Video, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

pub struct SqliteVideoStore {
    pool: SqlitePool,
}

impl SqliteVideoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Open the pool, creating the database file if it does not exist yet.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

/// Apply the embedded migrations. Safe to run on every startup.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[async_trait]
impl VideoStore for SqliteVideoStore {
    async fn get(&self, id: i64) -> Result<Option<Video>, StoreError> {
        let video = sqlx::query_as::<_, Video>("SELECT id, name, views, likes FROM video_model WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(video)
    }

    async fn create(&self, id: i64, fields: VideoFields) -> Result<Video, StoreError> {
        let result = sqlx::query(
            "INSERT INTO video_model (id, name, views, likes) VALUES (?, ?, ?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.views)
        .bind(fields.likes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(id));
        }

        Ok(Video::new(id, fields))
    }

    async fn update(&self, id: i64, fields: VideoFields) -> Result<Video, StoreError> {
        let result = sqlx::query("UPDATE video_model SET name = ?, views = ?, likes = ? WHERE id = ?")
            .bind(&fields.name)
            .bind(fields.views)
            .bind(fields.likes)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(Video::new(id, fields))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM video_model WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// In-memory database with the schema applied. One connection keeps the
    /// database alive for the whole test.
    pub(crate) async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    fn fields(name: &str, views: i64, likes: i64) -> VideoFields {
        VideoFields {
            name: name.to_string(),
            views,
            likes,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = SqliteVideoStore::new(memory_pool().await);

        let created = store.create(1, fields("Flask Tutorial", 100, 50)).await.unwrap();
        assert_eq!(
            created,
            Video {
                id: 1,
                name: "Flask Tutorial".to_string(),
                views: 100,
                likes: 50,
            }
        );

        assert_eq!(store.get(1).await.unwrap(), Some(created));
        assert_eq!(store.get(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_does_not_overwrite() {
        let store = SqliteVideoStore::new(memory_pool().await);
        store.create(7, fields("original", 1, 1)).await.unwrap();

        let err = store.create(7, fields("replacement", 2, 2)).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(7)));
        assert_eq!(store.get(7).await.unwrap().unwrap().name, "original");
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let store = SqliteVideoStore::new(memory_pool().await);
        store.create(1, fields("Flask Tutorial", 100, 50)).await.unwrap();

        let updated = store.update(1, fields("Updated Video", 500, 200)).await.unwrap();
        assert_eq!(updated.name, "Updated Video");
        assert_eq!(store.get(1).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_with_same_values_still_succeeds() {
        let store = SqliteVideoStore::new(memory_pool().await);
        store.create(1, fields("same", 1, 1)).await.unwrap();

        assert!(store.update(1, fields("same", 1, 1)).await.is_ok());
    }

    #[tokio::test]
    async fn update_missing_creates_nothing() {
        let store = SqliteVideoStore::new(memory_pool().await);

        let err = store.update(3, fields("ghost", 0, 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(3)));
        assert_eq!(store.get(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let store = SqliteVideoStore::new(memory_pool().await);
        store.create(1, fields("short-lived", 0, 0)).await.unwrap();

        store.delete(1).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), None);
        assert!(matches!(store.delete(1).await, Err(StoreError::NotFound(1))));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = memory_pool().await;
        migrate(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn closed_pool_surfaces_storage_error() {
        let pool = memory_pool().await;
        let store = SqliteVideoStore::new(pool.clone());
        pool.close().await;

        assert!(matches!(store.get(1).await, Err(StoreError::Storage(_))));
        assert!(matches!(
            store.create(1, fields("x", 0, 0)).await,
            Err(StoreError::Storage(_))
        ));
    }

    /// File-backed database shared by several pooled connections.
    async fn file_store(dir: &tempfile::TempDir) -> Arc<SqliteVideoStore> {
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("videos.db").display()),
            max_connections: 8,
        };
        let pool = connect(&config).await.unwrap();
        migrate(&pool).await.unwrap();
        Arc::new(SqliteVideoStore::new(pool))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_admit_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir).await;

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(1, fields(&format!("writer-{i}"), i, i)).await })
            })
            .collect();

        let mut created = Vec::new();
        let mut exists = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(video) => created.push(video),
                Err(StoreError::AlreadyExists(1)) => exists += 1,
                Err(other) => panic!("unexpected store error: {other}"),
            }
        }

        assert_eq!(created.len(), 1);
        assert_eq!(exists, 31);
        assert_eq!(store.get(1).await.unwrap(), Some(created.remove(0)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_create_and_delete_agree_with_final_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir).await;

        for id in 1..=20 {
            let creator = store.clone();
            let deleter = store.clone();
            let create = tokio::spawn(async move { creator.create(id, fields("racer", 0, 0)).await });
            let delete = tokio::spawn(async move { deleter.delete(id).await });

            let created = create.await.unwrap();
            let deleted = delete.await.unwrap();
            let remaining = store.get(id).await.unwrap();

            // The id starts empty, so the create always wins its own race
            assert!(created.is_ok(), "create failed for {id}: {created:?}");
            match deleted {
                Ok(()) => assert_eq!(remaining, None, "deleted {id} but it is still stored"),
                Err(StoreError::NotFound(_)) => {
                    assert!(remaining.is_some(), "delete missed {id} but it is gone")
                }
                Err(other) => panic!("unexpected store error: {other}"),
            }
        }
    }
}

use super::{Item, ItemStore};
use crate::error::StoreError;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

const ITEMS_SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS items_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const ITEMS_SCHEMA_VERSION_KEY: &str = "items_schema_version";
const ITEMS_SCHEMA_VERSION: u32 = 1;

async fn ensure_items_schema_version(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(ITEMS_SCHEMA_META_TABLE).execute(pool).await?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM items_schema_meta WHERE key = $1")
            .bind(ITEMS_SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await?;

    if let Some((value,)) = stored_version {
        let parsed = value
            .parse::<u32>()
            .map_err(|_| StoreError::Schema(format!("invalid schema version value: {value}")))?;
        if parsed != ITEMS_SCHEMA_VERSION {
            return Err(StoreError::Schema(format!(
                "incompatible items schema version: stored={parsed}, expected={ITEMS_SCHEMA_VERSION}"
            )));
        }
        return Ok(());
    }

    sqlx::query("INSERT INTO items_schema_meta (key, value) VALUES ($1, $2)")
        .bind(ITEMS_SCHEMA_VERSION_KEY)
        .bind(ITEMS_SCHEMA_VERSION.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Open (creating if needed) the SQLite file at `db_path`.
pub async fn open_pool(db_path: &Path) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;
    Ok(pool)
}

fn row_to_item(row: &SqliteRow) -> Result<Item, StoreError> {
    Ok(Item {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

/// SQLite-backed item store using an sqlx async pool.
#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Wrap an existing pool, checking the schema version and creating the
    /// table on first use.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        ensure_items_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS items (
                 id          INTEGER PRIMARY KEY AUTOINCREMENT,
                 name        TEXT NOT NULL UNIQUE,
                 description TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        Self::new(open_pool(db_path).await?).await
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_item(&self, name: &str, description: &str) -> Result<Item, StoreError> {
        let result = sqlx::query("INSERT INTO items (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::Duplicate(name.to_string())
                }
                other => StoreError::Sqlx(other),
            })?;

        Ok(Item {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query("SELECT id, name, description FROM items ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_item).collect()
    }

    async fn get_item(&self, id: i64) -> Result<Item, StoreError> {
        let row = sqlx::query("SELECT id, name, description FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_to_item(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn reset_items(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM items").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

impl ItemStore for SqliteItemStore {
    fn create<'a>(
        &'a self,
        name: &'a str,
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Item, StoreError>> + Send + 'a>> {
        Box::pin(self.create_item(name, description))
    }

    fn list(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Item>, StoreError>> + Send + '_>> {
        Box::pin(self.list_items())
    }

    fn get(&self, id: i64) -> Pin<Box<dyn Future<Output = Result<Item, StoreError>> + Send + '_>> {
        Box::pin(self.get_item(id))
    }

    fn reset(&self) -> Pin<Box<dyn Future<Output = Result<u64, StoreError>> + Send + '_>> {
        Box::pin(self.reset_items())
    }
}

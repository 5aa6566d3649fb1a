//! LibsqlCategoryStore - CategoryStore Implementation for libsql
//!
//! Persists categories in a single relational table:
//!
//! ```sql
//! categories(id, name, description, parent_id -> categories(id),
//!            path, level, sort_order, created_at, updated_at)
//! ```
//!
//! with indexes on `path` (descendant prefix scans) and `parent_id` (child
//! lookups).
//!
//! # Connection Pattern
//!
//! Every operation opens its connection through `connect_with_timeout()`, which
//! sets a 5 second busy timeout and enables foreign keys on that connection.
//! Connections are never held across operations.
//!
//! # Examples
//!
//! ```rust,no_run
//! use folio_core::db::{CategoryStore, LibsqlCategoryStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn CategoryStore> =
//!         Arc::new(LibsqlCategoryStore::new(PathBuf::from("./data/folio.db")).await?);
//!     let roots = store.find_by_parent_id(None).await?;
//!     println!("{} root categories", roots.len());
//!     Ok(())
//! }
//! ```

use crate::db::category_store::CategoryStore;
use crate::db::error::DatabaseError;
use crate::models::{CategoryId, CategoryNode};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::{params, Builder, Database, Row};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, name, description, parent_id, path, level, sort_order, created_at, updated_at FROM categories";

const ORDER_CLAUSE: &str = " ORDER BY sort_order ASC, created_at ASC, id ASC";

/// libsql-backed category table
#[derive(Debug, Clone)]
pub struct LibsqlCategoryStore {
    /// libsql database handle (wrapped in Arc for sharing)
    db: Arc<Database>,

    /// Path to the database file
    db_path: PathBuf,
}

impl LibsqlCategoryStore {
    /// Open (or create) the database at `db_path` and make sure the schema exists
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - The parent directory cannot be created
    /// - The database cannot be opened
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let store = Self {
            db: Arc::new(db),
            db_path,
        };
        store.initialize_schema().await?;

        tracing::info!("Category store ready at {}", store.db_path.display());
        Ok(store)
    }

    /// Location of the database file
    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Open a connection with busy timeout and foreign keys enabled
    async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.db.connect().map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to open connection: {}", e))
        })?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        Ok(conn)
    }

    /// PRAGMA statements return rows, so they go through query() instead of execute()
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Create the categories table and its indexes (idempotent)
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                parent_id TEXT REFERENCES categories(id),
                path TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 0,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create categories table: {}",
                e
            ))
        })?;

        for (name, ddl) in [
            (
                "idx_categories_path",
                "CREATE INDEX IF NOT EXISTS idx_categories_path ON categories(path)",
            ),
            (
                "idx_categories_parent",
                "CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id)",
            ),
        ] {
            conn.execute(ddl, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!(
                    "Failed to create index '{}': {}",
                    name, e
                ))
            })?;
        }

        Ok(())
    }

    /// Parse a stored timestamp; accepts RFC3339 and SQLite's `YYYY-MM-DD HH:MM:SS`
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        Err(DatabaseError::invalid_row(format!("unparseable timestamp '{}'", s)).into())
    }

    fn parse_id(s: &str, column: &str) -> Result<CategoryId> {
        Uuid::parse_str(s).map_err(|e| {
            DatabaseError::invalid_row(format!("{} '{}' is not a valid id: {}", column, s, e))
                .into()
        })
    }

    /// Convert a `categories` row (in `SELECT_COLUMNS` order) into a CategoryNode
    fn row_to_category(row: &Row) -> Result<CategoryNode> {
        let id: String = row.get(0).context("Failed to get id")?;
        let name: String = row.get(1).context("Failed to get name")?;
        let description: Option<String> = row.get(2).context("Failed to get description")?;
        let parent_id: Option<String> = row.get(3).context("Failed to get parent_id")?;
        let path: String = row.get(4).context("Failed to get path")?;
        let level: i64 = row.get(5).context("Failed to get level")?;
        let sort_order: i64 = row.get(6).context("Failed to get sort_order")?;
        let created_at: String = row.get(7).context("Failed to get created_at")?;
        let updated_at: String = row.get(8).context("Failed to get updated_at")?;

        Ok(CategoryNode {
            id: Self::parse_id(&id, "id")?,
            name,
            description,
            parent_id: parent_id
                .as_deref()
                .map(|p| Self::parse_id(p, "parent_id"))
                .transpose()?,
            level: u32::try_from(level).context("level out of range")?,
            path,
            sort_order: i32::try_from(sort_order).context("sort_order out of range")?,
            created_at: Self::parse_timestamp(&created_at).context("Failed to parse created_at")?,
            updated_at: Self::parse_timestamp(&updated_at).context("Failed to parse updated_at")?,
        })
    }

    async fn query_categories(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<CategoryNode>> {
        let conn = self.connect_with_timeout().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .with_context(|| format!("Failed to execute query: {}", sql))?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await.context("Failed to read row")? {
            categories.push(Self::row_to_category(&row)?);
        }
        Ok(categories)
    }
}

#[async_trait]
impl CategoryStore for LibsqlCategoryStore {
    async fn save(&self, mut node: CategoryNode) -> Result<CategoryNode> {
        if node.is_unsaved() {
            node.id = Uuid::new_v4();
        }

        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO categories (id, name, description, parent_id, path, level, sort_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                parent_id = excluded.parent_id,
                path = excluded.path,
                level = excluded.level,
                sort_order = excluded.sort_order,
                updated_at = excluded.updated_at",
            params![
                node.id.to_string(),
                node.name.clone(),
                node.description.clone(),
                node.parent_id.map(|p| p.to_string()),
                node.path.clone(),
                i64::from(node.level),
                i64::from(node.sort_order),
                node.created_at.to_rfc3339(),
                node.updated_at.to_rfc3339(),
            ],
        )
        .await
        .with_context(|| format!("Failed to save category {}", node.id))?;

        tracing::trace!("Stored category {} at path '{}'", node.id, node.path);
        Ok(node)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<CategoryNode>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        Ok(self
            .query_categories(&sql, params![id.to_string()])
            .await?
            .into_iter()
            .next())
    }

    async fn find_all(&self) -> Result<Vec<CategoryNode>> {
        let sql = format!("{}{}", SELECT_COLUMNS, ORDER_CLAUSE);
        self.query_categories(&sql, ()).await
    }

    async fn find_by_parent_id(&self, parent_id: Option<CategoryId>) -> Result<Vec<CategoryNode>> {
        match parent_id {
            Some(parent_id) => {
                let sql = format!("{} WHERE parent_id = ?{}", SELECT_COLUMNS, ORDER_CLAUSE);
                self.query_categories(&sql, params![parent_id.to_string()])
                    .await
            }
            None => {
                let sql = format!("{} WHERE parent_id IS NULL{}", SELECT_COLUMNS, ORDER_CLAUSE);
                self.query_categories(&sql, ()).await
            }
        }
    }

    async fn find_by_path_prefix(&self, prefix: &str) -> Result<Vec<CategoryNode>> {
        // substr() instead of LIKE so '%' and '_' in a prefix are never wildcards
        let sql = format!(
            "{} WHERE substr(path, 1, length(?1)) = ?1{}",
            SELECT_COLUMNS, ORDER_CLAUSE
        );
        self.query_categories(&sql, params![prefix.to_string()])
            .await
    }

    async fn delete_by_id(&self, id: CategoryId) -> Result<()> {
        let conn = self.connect_with_timeout().await?;
        conn.execute("DELETE FROM categories WHERE id = ?", params![id.to_string()])
            .await
            .with_context(|| format!("Failed to delete category {}", id))?;
        Ok(())
    }

    async fn exists_by_id(&self, id: CategoryId) -> Result<bool> {
        let conn = self.connect_with_timeout().await?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM categories WHERE id = ? LIMIT 1",
                params![id.to_string()],
            )
            .await
            .context("Failed to check category existence")?;
        Ok(rows.next().await?.is_some())
    }

    async fn has_children(&self, id: CategoryId) -> Result<bool> {
        let conn = self.connect_with_timeout().await?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM categories WHERE parent_id = ? LIMIT 1",
                params![id.to_string()],
            )
            .await
            .context("Failed to check for child categories")?;
        Ok(rows.next().await?.is_some())
    }
}

//! # Fintrack Storage - SQLite Backend
//!
//! SQLite implementation of the identity repository. A file-backed database
//! lives at `{base_path}/fintrack.db`; an in-memory database is available for
//! development and tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use fintrack_storage::{IdentityRecord, IdentityRepository, StorageError};

/// Database file name inside the data directory.
const DB_FILE: &str = "fintrack.db";

/// SQL schema for the identities table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS identities (
    email         TEXT PRIMARY KEY,
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,
    created_at    INTEGER NOT NULL
)
"#;

type IdentityRow = (String, String, String, String, i64);

/// SQLite identity repository.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
    db_path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Opens or creates the database inside `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// connection fails.
    pub async fn open(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base = base_path.as_ref();
        std::fs::create_dir_all(base).map_err(|e| {
            StorageError::ConnectionFailed(format!("failed to create directory: {e}"))
        })?;

        let db_path = base.join(DB_FILE);
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        debug!(path = %db_path.display(), "Opening SQLite database");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let backend = Self {
            pool,
            db_path: Some(db_path),
        };

        backend.migrate().await?;

        info!("SQLite backend ready");

        Ok(backend)
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds exactly one connection that is never recycled, since
    /// every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let backend = Self {
            pool,
            db_path: None,
        };

        backend.migrate().await?;

        info!("In-memory SQLite backend ready");

        Ok(backend)
    }

    /// Path of the database file, `None` for in-memory databases.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Runs database migrations.
    async fn migrate(&self) -> Result<(), StorageError> {
        debug!("Running database migrations");

        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::ConnectionFailed(format!("migration failed: {e}")))?;

        debug!("Migrations complete");

        Ok(())
    }
}

fn into_record((email, display_name, password_hash, role, created_at): IdentityRow) -> IdentityRecord {
    IdentityRecord {
        email,
        display_name,
        password_hash,
        role,
        created_at,
    }
}

#[async_trait]
impl IdentityRepository for SqliteBackend {
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, StorageError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            "SELECT email, display_name, password_hash, role, created_at FROM identities WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(row.map(into_record))
    }

    async fn insert(&self, record: &IdentityRecord) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO identities (email, display_name, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.email)
        .bind(&record.display_name)
        .bind(&record.password_hash)
        .bind(&record.role)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StorageError::AlreadyExists(record.email.clone()),
            _ => StorageError::QueryFailed(e.to_string()),
        })?;

        debug!(email = %record.email, "Identity stored");

        Ok(())
    }
}

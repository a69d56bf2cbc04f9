use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StoreError;
use crate::types::{CheckId, NewCheck, StoreStats, Url, UrlCheck, UrlId, UrlSummary};

use super::UrlStore;
use super::schema;

/// SQLite-backed implementation of [`UrlStore`].
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path) -> crate::error::Result<Self> {
        let conn = Connection::open(path).map_err(StoreError::Sqlite)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> crate::error::Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::Sqlite)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Path of the backing database file, if disk-backed.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> crate::error::Result<()> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");

        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(StoreError::Sqlite)?;

        // Try WAL mode — silently ignored for in-memory
        let _ = conn.execute_batch("PRAGMA journal_mode = WAL;");

        conn.execute_batch(schema::SCHEMA_SQL)
            .map_err(StoreError::Sqlite)?;
        conn.execute_batch(schema::VIEWS_SQL)
            .map_err(StoreError::Sqlite)?;

        // Set schema version if not present
        conn.execute(
            "INSERT OR IGNORE INTO pagecheck_meta (key, value) VALUES ('schema_version', ?1)",
            params![schema::SCHEMA_VERSION],
        )
        .map_err(StoreError::Sqlite)?;

        let stored: String = conn
            .query_row(
                "SELECT value FROM pagecheck_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .map_err(StoreError::Sqlite)?;
        if stored != schema::SCHEMA_VERSION {
            return Err(StoreError::Migration(format!(
                "database has schema version {stored}, expected {}",
                schema::SCHEMA_VERSION
            ))
            .into());
        }

        Ok(())
    }

    /// Helper: parse a persisted RFC 3339 timestamp.
    fn parse_timestamp(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
    }

    /// Helper: read a full URL row.
    fn row_to_url(row: &rusqlite::Row<'_>) -> rusqlite::Result<Url> {
        let created_at_str: String = row.get("created_at")?;
        Ok(Url {
            id: UrlId(row.get("id")?),
            name: row.get("name")?,
            created_at: Self::parse_timestamp(&created_at_str),
        })
    }

    /// Helper: read a full check row.
    fn row_to_check(row: &rusqlite::Row<'_>) -> rusqlite::Result<UrlCheck> {
        let created_at_str: String = row.get("created_at")?;
        Ok(UrlCheck {
            id: CheckId(row.get("id")?),
            url_id: UrlId(row.get("url_id")?),
            status_code: row.get("status_code")?,
            title: row.get("title")?,
            h1: row.get("h1")?,
            description: row.get("description")?,
            created_at: Self::parse_timestamp(&created_at_str),
        })
    }
}

#[async_trait::async_trait]
impl UrlStore for SqliteStore {
    // ── Registry operations ────────────────────────────────────────

    async fn create_url(&self, name: &str) -> crate::error::Result<Url> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        let created_at = Utc::now();

        // A UNIQUE violation here is the authoritative duplicate signal;
        // concurrent writers racing past url_exists still resolve to one row.
        conn.execute(
            "INSERT INTO urls (name, created_at) VALUES (?1, ?2)",
            params![name, created_at.to_rfc3339()],
        )
        .map_err(|e| {
            if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
                StoreError::DuplicateUrl(name.to_string())
            } else {
                StoreError::Sqlite(e)
            }
        })?;

        Ok(Url {
            id: UrlId(conn.last_insert_rowid()),
            name: name.to_string(),
            created_at,
        })
    }

    async fn url_exists(&self, name: &str) -> crate::error::Result<bool> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM urls WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::Sqlite)?;
        Ok(found.is_some())
    }

    async fn get_url(&self, id: UrlId) -> crate::error::Result<Option<Url>> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        conn.query_row(
            "SELECT id, name, created_at FROM urls WHERE id = ?1",
            params![id.0],
            Self::row_to_url,
        )
        .optional()
        .map_err(StoreError::Sqlite)
        .map_err(Into::into)
    }

    async fn find_url_by_name(&self, name: &str) -> crate::error::Result<Option<Url>> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        conn.query_row(
            "SELECT id, name, created_at FROM urls WHERE name = ?1",
            params![name],
            Self::row_to_url,
        )
        .optional()
        .map_err(StoreError::Sqlite)
        .map_err(Into::into)
    }

    async fn list_urls(&self) -> crate::error::Result<Vec<UrlSummary>> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        let mut stmt = conn
            .prepare_cached(
                "SELECT u.id, u.name, u.created_at,
                        lc.created_at AS last_check_at,
                        lc.status_code AS last_status
                 FROM urls u
                 LEFT JOIN latest_checks lc ON lc.url_id = u.id
                 ORDER BY u.id ASC",
            )
            .map_err(StoreError::Sqlite)?;

        let summaries = stmt
            .query_map([], |row| {
                let last_check_at: Option<String> = row.get("last_check_at")?;
                Ok(UrlSummary {
                    url: Self::row_to_url(row)?,
                    last_check_at: last_check_at.as_deref().map(Self::parse_timestamp),
                    last_status: row.get("last_status")?,
                })
            })
            .map_err(StoreError::Sqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sqlite)?;
        Ok(summaries)
    }

    // ── Check history operations ───────────────────────────────────

    async fn append_check(&self, check: &NewCheck) -> crate::error::Result<UrlCheck> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO url_checks (url_id, status_code, title, h1, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                check.url_id.0,
                check.status_code,
                check.title,
                check.h1,
                check.description,
                created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            // The only constraint on url_checks is the FK to urls.
            if e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
                StoreError::UrlNotFound(check.url_id.0)
            } else {
                StoreError::Sqlite(e)
            }
        })?;

        Ok(UrlCheck {
            id: CheckId(conn.last_insert_rowid()),
            url_id: check.url_id,
            status_code: check.status_code,
            title: check.title.clone(),
            h1: check.h1.clone(),
            description: check.description.clone(),
            created_at,
        })
    }

    async fn checks_for_url(&self, url_id: UrlId) -> crate::error::Result<Vec<UrlCheck>> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, url_id, status_code, title, h1, description, created_at
                 FROM url_checks
                 WHERE url_id = ?1
                 ORDER BY id DESC",
            )
            .map_err(StoreError::Sqlite)?;

        let checks = stmt
            .query_map(params![url_id.0], Self::row_to_check)
            .map_err(StoreError::Sqlite)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sqlite)?;
        Ok(checks)
    }

    async fn latest_check(&self, url_id: UrlId) -> crate::error::Result<Option<UrlCheck>> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        conn.query_row(
            "SELECT id, url_id, status_code, title, h1, description, created_at
             FROM latest_checks
             WHERE url_id = ?1",
            params![url_id.0],
            Self::row_to_check,
        )
        .optional()
        .map_err(StoreError::Sqlite)
        .map_err(Into::into)
    }

    // ── Metrics ────────────────────────────────────────────────────

    async fn stats(&self) -> crate::error::Result<StoreStats> {
        let conn = self.conn.lock().expect("pagecheck store mutex poisoned");
        let url_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM urls", [], |row| row.get(0))
            .map_err(StoreError::Sqlite)?;
        let check_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM url_checks", [], |row| row.get(0))
            .map_err(StoreError::Sqlite)?;
        // COUNT(*) is never negative
        #[allow(clippy::cast_sign_loss)]
        let stats = StoreStats {
            url_count: url_count as u64,
            check_count: check_count as u64,
        };
        Ok(stats)
    }
}

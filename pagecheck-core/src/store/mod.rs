//! Persistence layer: the URL registry and the append-only check history.

mod schema;
mod sqlite;

pub use schema::{SCHEMA_SQL, SCHEMA_VERSION, VIEWS_SQL};
pub use sqlite::SqliteStore;

use crate::types::{NewCheck, StoreStats, Url, UrlCheck, UrlId, UrlSummary};

/// The store abstraction. The web layer and the checker read/write
/// through this trait.
#[async_trait::async_trait]
pub trait UrlStore: Send + Sync {
    // ── Registry operations ────────────────────────────────────────

    /// Insert a new URL with the current timestamp.
    ///
    /// Fails with [`StoreError::DuplicateUrl`](crate::error::StoreError)
    /// if the canonical name is already registered — the storage-level
    /// `UNIQUE` constraint is the authoritative duplicate signal.
    async fn create_url(&self, name: &str) -> crate::error::Result<Url>;

    /// True iff a URL with exactly this canonical name exists.
    async fn url_exists(&self, name: &str) -> crate::error::Result<bool>;

    /// Look up a URL by id.
    async fn get_url(&self, id: UrlId) -> crate::error::Result<Option<Url>>;

    /// Look up a URL by its canonical name.
    async fn find_url_by_name(&self, name: &str) -> crate::error::Result<Option<Url>>;

    /// All registered URLs ascending by id, each annotated with the
    /// timestamp and status of its most recent check if one exists.
    async fn list_urls(&self) -> crate::error::Result<Vec<UrlSummary>>;

    // ── Check history operations ───────────────────────────────────

    /// Append a check row. Rows are immutable once written; this never
    /// updates or deletes.
    async fn append_check(&self, check: &NewCheck) -> crate::error::Result<UrlCheck>;

    /// All checks for a URL, descending by id (most recent first).
    async fn checks_for_url(&self, url_id: UrlId) -> crate::error::Result<Vec<UrlCheck>>;

    /// The check with the greatest id for a URL, if any.
    async fn latest_check(&self, url_id: UrlId) -> crate::error::Result<Option<UrlCheck>>;

    // ── Metrics ────────────────────────────────────────────────────

    /// Get summary statistics about the store.
    async fn stats(&self) -> crate::error::Result<StoreStats>;
}

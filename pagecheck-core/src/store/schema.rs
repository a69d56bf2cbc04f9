/// Current schema version.
pub const SCHEMA_VERSION: &str = "1";

/// Full SQL schema for Pagecheck's `SQLite` database.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS pagecheck_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Registered websites, keyed by canonical name (scheme://authority).
-- The UNIQUE constraint is the authoritative duplicate-URL signal.
CREATE TABLE IF NOT EXISTS urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

-- Append-only check history. Rows are never updated or deleted.
CREATE TABLE IF NOT EXISTS url_checks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url_id INTEGER NOT NULL REFERENCES urls(id) ON DELETE CASCADE,
    status_code INTEGER NOT NULL,
    title TEXT,
    h1 TEXT,
    description TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_url_checks_url ON url_checks(url_id);
";

/// Projected views for common query patterns.
pub const VIEWS_SQL: &str = r"
-- Most recent check per URL (greatest id wins). Joined by the list
-- view so 'latest status per URL' is a single query, not N+1 fetches.
CREATE VIEW IF NOT EXISTS latest_checks AS
SELECT c.*
FROM url_checks c
JOIN (
    SELECT url_id, MAX(id) AS latest_id
    FROM url_checks
    GROUP BY url_id
) last ON last.latest_id = c.id;
";

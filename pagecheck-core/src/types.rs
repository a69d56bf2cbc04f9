use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Typed ID wrappers ──────────────────────────────────────────────

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

typed_id!(UrlId);
typed_id!(CheckId);

// ── Registry types ─────────────────────────────────────────────────

/// A registered website, keyed by its canonical name.
///
/// The name is always in canonical form (`scheme://authority`, no path,
/// query, or fragment) and unique across the registry. Rows are never
/// mutated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Url {
    pub id: UrlId,
    /// Canonical URL, e.g. `https://example.com`.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A [`Url`] annotated with its most recent check, for the list view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlSummary {
    pub url: Url,
    /// When the latest check ran, if any check exists.
    pub last_check_at: Option<DateTime<Utc>>,
    /// HTTP status recorded by the latest check, if any check exists.
    pub last_status: Option<u16>,
}

// ── Check types ────────────────────────────────────────────────────

/// One fetch-and-record operation against a registered URL.
///
/// Checks form an append-only sequence per URL; the latest check is the
/// one with the greatest id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCheck {
    pub id: CheckId,
    pub url_id: UrlId,
    /// Numeric HTTP status as returned by the remote server (2xx–5xx).
    pub status_code: u16,
    /// Text of the first `<title>` element, if present.
    pub title: Option<String>,
    /// Text of the first `<h1>` element, if present.
    pub h1: Option<String>,
    /// `content` of the first `<meta name="description">`, if present.
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a check row; the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheck {
    pub url_id: UrlId,
    pub status_code: u16,
    pub title: Option<String>,
    pub h1: Option<String>,
    pub description: Option<String>,
}

/// Summary statistics about the store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub url_count: u64,
    pub check_count: u64,
}

/// Top-level Pagecheck error type.
///
/// All fallible operations in `pagecheck-core` return
/// [`Result<T, PagecheckError>`](Result). Each variant wraps a
/// domain-specific error enum, allowing callers to match on the error
/// source without losing type information.
#[derive(thiserror::Error, Debug)]
pub enum PagecheckError {
    /// Error from the SQLite store layer (registry and check history).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// User input could not be normalized into a canonical URL.
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Network-level failure while fetching a page for a check.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the SQLite-backed URL registry and check history store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Underlying `SQLite` operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Schema setup failed (version mismatch or DDL error).
    #[error("Migration failed: {0}")]
    Migration(String),

    /// The canonical name is already registered. The `UNIQUE` constraint
    /// on `urls.name` is the authoritative signal; a preceding existence
    /// check is advisory only.
    #[error("URL already registered: {0}")]
    DuplicateUrl(String),

    /// A referenced URL id does not exist in the registry.
    #[error("URL not found: {0}")]
    UrlNotFound(i64),
}

/// Errors from URL normalization of user input.
#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    /// Input is not an absolute URL with a scheme and host.
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),
}

/// Network-layer failures during a page check.
///
/// A non-2xx HTTP status is NOT a fetch error — any numeric status is a
/// valid check outcome. These variants cover the cases where no status
/// was obtained at all, in which case no check row is persisted.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// Target URL of the failed request.
        url: String,
    },

    /// Connection-level failure (refused, reset, DNS, broken body read).
    #[error("connection to {url} failed: {message}")]
    ConnectionFailed {
        /// Target URL of the failed request.
        url: String,
        /// Description of the underlying failure.
        message: String,
    },
}

/// Errors in Pagecheck configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An environment value is present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Convenience alias for `Result<T, PagecheckError>`.
pub type Result<T> = std::result::Result<T, PagecheckError>;

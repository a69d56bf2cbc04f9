//! The check pipeline: fetch a registered URL, extract SEO metadata,
//! and persist the result as one immutable check row.

use std::time::Duration;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, FetchError};
use crate::store::UrlStore;
use crate::types::{NewCheck, Url, UrlCheck};

/// SEO metadata extracted from a fetched page body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: Option<String>,
    pub h1: Option<String>,
    pub description: Option<String>,
}

/// Result of a completed fetch, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Numeric HTTP status as returned by the remote (2xx–5xx all count).
    pub status_code: u16,
    pub meta: PageMeta,
}

/// Extract the first `<title>`, first `<h1>`, and the `content` of the
/// first `<meta name="description">` from an HTML body.
///
/// Parsing is tolerant: malformed markup, missing tags, or a non-HTML
/// body yield unset fields, never an error. When an element occurs more
/// than once, the first match wins.
pub fn extract_page_meta(body: &str) -> PageMeta {
    let doc = Html::parse_document(body);
    PageMeta {
        title: first_text(&doc, "title"),
        h1: first_text(&doc, "h1"),
        description: first_attr(&doc, r#"meta[name="description"]"#, "content"),
    }
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let text: String = doc.select(&sel).next()?.text().collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn first_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()?
        .value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Runs user-triggered checks against registered URLs.
///
/// The fetch is the only operation that blocks on an external resource;
/// it runs with a bounded timeout so a slow remote cannot stall the
/// serving task indefinitely. A single failed attempt fails the whole
/// check — there is no retry.
#[derive(Debug, Clone)]
pub struct Checker {
    client: reqwest::Client,
}

impl Checker {
    /// Build a checker whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> crate::error::Result<Self> {
        // reqwest is built with the `-no-provider` rustls feature, so the
        // aws-lc-rs crypto provider must be installed process-wide before
        // a client can be constructed. Ignore the error: it only means a
        // provider is already installed.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch the URL and extract status plus page metadata.
    ///
    /// Any numeric HTTP status is a valid outcome; only network-level
    /// failures (timeout, refused connection, broken body read) error.
    pub async fn fetch(&self, url: &Url) -> Result<CheckOutcome, FetchError> {
        debug!(url = %url.name, "fetching page");

        let response = self
            .client
            .get(&url.name)
            .send()
            .await
            .map_err(|e| classify_fetch_error(&e, &url.name))?;
        let status_code = response.status().as_u16();

        let body = response
            .text()
            .await
            .map_err(|e| classify_fetch_error(&e, &url.name))?;
        let meta = extract_page_meta(&body);

        debug!(url = %url.name, status_code, "fetch complete");
        Ok(CheckOutcome { status_code, meta })
    }

    /// Run a full check: fetch, parse, and append a check row.
    ///
    /// All-or-nothing: on a fetch failure no row is written. Missing
    /// page metadata never aborts the check.
    pub async fn check(&self, store: &dyn UrlStore, url: &Url) -> crate::error::Result<UrlCheck> {
        let outcome = self.fetch(url).await?;

        let check = store
            .append_check(&NewCheck {
                url_id: url.id,
                status_code: outcome.status_code,
                title: outcome.meta.title,
                h1: outcome.meta.h1,
                description: outcome.meta.description,
            })
            .await?;

        info!(url = %url.name, status_code = check.status_code, "check recorded");
        Ok(check)
    }
}

fn classify_fetch_error(error: &reqwest::Error, url: &str) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::ConnectionFailed {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // ── Metadata extraction ────────────────────────────────────────

    #[test]
    fn extracts_all_three_fields() {
        let body = r#"<html><head>
            <title>GitHub: Where the</title>
            <meta name="description" content="GitHub is where over 73 million">
            </head><body><h1>Where the world</h1></body></html>"#;

        let meta = extract_page_meta(body);
        assert_eq!(meta.title.as_deref(), Some("GitHub: Where the"));
        assert_eq!(meta.h1.as_deref(), Some("Where the world"));
        assert_eq!(
            meta.description.as_deref(),
            Some("GitHub is where over 73 million")
        );
    }

    #[test]
    fn missing_tags_are_unset() {
        let meta = extract_page_meta("<html><body><p>nothing here</p></body></html>");
        assert_eq!(meta, PageMeta::default());
    }

    #[test]
    fn non_html_body_is_tolerated() {
        let meta = extract_page_meta("{\"status\": \"ok\"}");
        assert_eq!(meta, PageMeta::default());

        let meta = extract_page_meta("");
        assert_eq!(meta, PageMeta::default());
    }

    #[test]
    fn first_match_wins_on_repeated_elements() {
        let body = "<html><head><title>First</title><title>Second</title></head>\
                    <body><h1>One</h1><h1>Two</h1></body></html>";

        let meta = extract_page_meta(body);
        assert_eq!(meta.title.as_deref(), Some("First"));
        assert_eq!(meta.h1.as_deref(), Some("One"));
    }

    #[test]
    fn nested_markup_inside_h1_is_flattened() {
        let meta = extract_page_meta("<h1>Where <em>the</em> world</h1>");
        assert_eq!(meta.h1.as_deref(), Some("Where the world"));
    }

    #[test]
    fn empty_elements_are_unset() {
        let meta = extract_page_meta(
            r#"<title>  </title><h1></h1><meta name="description" content="">"#,
        );
        assert_eq!(meta, PageMeta::default());
    }

    // ── Fetch pipeline against a local socket ──────────────────────

    /// Serve exactly one canned HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn records_status_and_metadata() {
        let addr = serve_once("200 OK", "<html><head><title>T</title></head></html>").await;
        let store = SqliteStore::in_memory().unwrap();
        let url = store.create_url(&format!("http://{addr}")).await.unwrap();

        let checker = Checker::new(Duration::from_secs(5)).unwrap();
        let check = checker.check(&store, &url).await.unwrap();

        assert_eq!(check.status_code, 200);
        assert_eq!(check.title.as_deref(), Some("T"));
        assert_eq!(check.url_id, url.id);

        let latest = store.latest_check(url.id).await.unwrap().unwrap();
        assert_eq!(latest.id, check.id);
    }

    #[tokio::test]
    async fn non_2xx_status_is_a_valid_outcome() {
        let addr = serve_once("503 Service Unavailable", "busy").await;
        let store = SqliteStore::in_memory().unwrap();
        let url = store.create_url(&format!("http://{addr}")).await.unwrap();

        let checker = Checker::new(Duration::from_secs(5)).unwrap();
        let check = checker.check(&store, &url).await.unwrap();

        assert_eq!(check.status_code, 503);
        assert_eq!(check.title, None);
    }

    #[tokio::test]
    async fn timeout_persists_nothing() {
        // Accept the connection but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            }
        });

        let store = SqliteStore::in_memory().unwrap();
        let url = store.create_url(&format!("http://{addr}")).await.unwrap();

        let checker = Checker::new(Duration::from_millis(200)).unwrap();
        let err = checker.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));

        assert!(checker.check(&store, &url).await.is_err());
        assert_eq!(store.stats().await.unwrap().check_count, 0);
    }

    #[tokio::test]
    async fn refused_connection_persists_nothing() {
        // Bind then drop to obtain a port with no listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = SqliteStore::in_memory().unwrap();
        let url = store.create_url(&format!("http://{addr}")).await.unwrap();

        let checker = Checker::new(Duration::from_secs(2)).unwrap();
        let err = checker.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::ConnectionFailed { .. }));

        assert!(checker.check(&store, &url).await.is_err());
        assert_eq!(store.stats().await.unwrap().check_count, 0);
    }
}

//! End-to-end tests: full HTTP round trips against a served router, with
//! mock remote sites for the check pipeline.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use pagecheck_core::checker::Checker;
use pagecheck_core::store::{SqliteStore, UrlStore};

use pagecheck_web::app::{self, AppState};
use pagecheck_web::flash::FlashStore;

/// Serve the application on an ephemeral port; returns its base URL and
/// a handle on the backing store for direct assertions.
async fn spawn_app() -> (String, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let state = AppState {
        store: store.clone(),
        checker: Arc::new(Checker::new(Duration::from_secs(2)).unwrap()),
        flash: FlashStore::new(),
    };
    let router = app::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), store)
}

/// Serve a fixed HTML body as a mock remote site; returns its base URL.
async fn spawn_remote(body: &'static str) -> String {
    let router = Router::new().route("/", get(move || async move { Html(body) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Browser-like client: keeps the session cookie, never follows redirects.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap()
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn create_normalizes_and_lists() {
    let (base, store) = spawn_app().await;
    let client = client();

    let response = client
        .post(format!("{base}/urls"))
        .form(&[("url", "https://yandex.ru/search/?lr=13321&text=test")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/urls");

    let body = client
        .get(format!("{base}/urls"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("https://yandex.ru"));
    assert!(body.contains("Page added"));

    let url = store
        .find_url_by_name("https://yandex.ru")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(url.name, "https://yandex.ru");
}

#[tokio::test]
async fn duplicate_create_is_informational() {
    let (base, store) = spawn_app().await;
    let client = client();

    for _ in 0..2 {
        let response = client
            .post(format!("{base}/urls"))
            .form(&[("url", "https://github.com/rand/pagecheck")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response), "/urls");
    }

    let body = client
        .get(format!("{base}/urls"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Page already exists"));

    assert_eq!(store.stats().await.unwrap().url_count, 1);
}

#[tokio::test]
async fn invalid_url_redirects_home() {
    let (base, store) = spawn_app().await;
    let client = client();

    let response = client
        .post(format!("{base}/urls"))
        .form(&[("url", "Qwerty123")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");

    let body = client
        .get(format!("{base}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Invalid URL"));

    assert_eq!(store.stats().await.unwrap().url_count, 0);
}

#[tokio::test]
async fn check_records_status_and_title() {
    let (base, store) = spawn_app().await;
    let remote = spawn_remote("<html><head><title>T</title></head><body></body></html>").await;
    let client = client();

    client
        .post(format!("{base}/urls"))
        .form(&[("url", remote.as_str())])
        .send()
        .await
        .unwrap();
    let url = store.find_url_by_name(&remote).await.unwrap().unwrap();

    let response = client
        .post(format!("{base}/urls/{}/checks", url.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), format!("/urls/{}", url.id));

    let body = client
        .get(format!("{base}/urls/{}", url.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Page checked"));
    assert!(body.contains("<td>200</td>"));
    assert!(body.contains("<td>T</td>"));

    let latest = store.latest_check(url.id).await.unwrap().unwrap();
    assert_eq!(latest.status_code, 200);
    assert_eq!(latest.title.as_deref(), Some("T"));
}

#[tokio::test]
async fn failed_check_persists_nothing() {
    let (base, store) = spawn_app().await;
    let client = client();

    // A port with no listener behind it.
    let dead = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    };

    client
        .post(format!("{base}/urls"))
        .form(&[("url", dead.as_str())])
        .send()
        .await
        .unwrap();
    let url = store.find_url_by_name(&dead).await.unwrap().unwrap();

    let response = client
        .post(format!("{base}/urls/{}/checks", url.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);

    let body = client
        .get(format!("{base}/urls/{}", url.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Check failed"));

    assert_eq!(store.stats().await.unwrap().check_count, 0);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (base, _store) = spawn_app().await;
    let client = client();

    let response = client
        .get(format!("{base}/urls/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = client
        .post(format!("{base}/urls/999/checks"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn flash_is_shown_exactly_once() {
    let (base, _store) = spawn_app().await;
    let client = client();

    client
        .post(format!("{base}/urls"))
        .form(&[("url", "https://example.com")])
        .send()
        .await
        .unwrap();

    let first = client
        .get(format!("{base}/urls"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(first.contains("Page added"));

    let second = client
        .get(format!("{base}/urls"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!second.contains("Page added"));
}

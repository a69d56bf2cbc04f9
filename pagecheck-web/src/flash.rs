//! Store-once, read-once flash messages.
//!
//! A flash is transient state tied to one request/response cycle: a POST
//! handler sets it, the next GET from the same browser renders and clears
//! it. Messages are keyed by a per-browser session id carried in a
//! cookie, not by global mutable state, so concurrent browsers never see
//! each other's messages.
//!
//! Session ids are sequential per-process counters. They identify a
//! browser only for routing flash messages — they carry no authority and
//! must never be used for authentication. A browser that sets a flash but
//! never loads another page would strand its entry, so the store keeps at
//! most [`MAX_PENDING`] messages and evicts the oldest session beyond
//! that.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Redirect, Response};

/// Cookie carrying the flash session id.
pub const SESSION_COOKIE: &str = "pagecheck_session";

/// Upper bound on pending messages held at once.
pub const MAX_PENDING: usize = 1024;

/// Severity of a flash message, mapped to a CSS class when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

impl FlashLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Info => "flash-info",
            Self::Danger => "flash-danger",
        }
    }
}

/// One transient user-facing message.
#[derive(Debug, Clone)]
pub struct Flash {
    pub message: String,
    pub level: FlashLevel,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Success,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Info,
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Danger,
        }
    }
}

/// In-process flash storage: at most one pending message per session.
#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    pending: Arc<Mutex<HashMap<u64, Flash>>>,
    next_session: Arc<AtomicU64>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the session from request headers, allocating a fresh id
    /// when no cookie is present. Returns `(session, is_new)`.
    pub fn session(&self, headers: &HeaderMap) -> (u64, bool) {
        match session_from_cookies(headers) {
            Some(id) => (id, false),
            None => (self.next_session.fetch_add(1, Ordering::Relaxed), true),
        }
    }

    /// Store a message for the session, replacing any pending one.
    ///
    /// When the store is full, the message for the oldest session is
    /// dropped — abandoned sessions cannot grow the map without bound.
    pub fn put(&self, session: u64, flash: Flash) {
        let mut pending = self.pending.lock().expect("flash store mutex poisoned");
        if pending.len() >= MAX_PENDING && !pending.contains_key(&session) {
            // Ids are allocated sequentially, so the smallest is the oldest.
            if let Some(oldest) = pending.keys().min().copied() {
                pending.remove(&oldest);
            }
        }
        pending.insert(session, flash);
    }

    /// Remove and return the pending message for the requesting session,
    /// if any. Reading consumes: a second take returns `None`.
    pub fn take(&self, headers: &HeaderMap) -> Option<Flash> {
        let session = session_from_cookies(headers)?;
        self.pending
            .lock()
            .expect("flash store mutex poisoned")
            .remove(&session)
    }

    /// Build a redirect that carries `flash` to the session's next page
    /// load, setting the session cookie when the browser has none yet.
    pub fn redirect_with_flash(
        &self,
        headers: &HeaderMap,
        location: &str,
        flash: Flash,
    ) -> Response {
        let (session, is_new) = self.session(headers);
        self.put(session, flash);

        let mut response = Redirect::to(location).into_response();
        if is_new {
            if let Ok(value) = HeaderValue::from_str(&format!(
                "{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax"
            )) {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
        }
        response
    }
}

/// Extract the session id from any `Cookie` header.
fn session_from_cookies(headers: &HeaderMap) -> Option<u64> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() == Some(SESSION_COOKIE) {
                if let Some(id) = parts.next().and_then(|v| v.parse().ok()) {
                    return Some(id);
                }
            }
        }
    }
    None
}

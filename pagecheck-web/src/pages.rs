//! Server-rendered HTML pages, built with `write!` into plain strings.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use pagecheck_core::types::{Url, UrlCheck, UrlSummary};

use crate::flash::Flash;

const PAGE_CSS: &str = "
body { font-family: sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: 0.4rem 0.6rem; text-align: left; }
form { margin: 1rem 0; }
.flash-success { color: #155724; background: #d4edda; padding: 0.6rem; }
.flash-info { color: #0c5460; background: #d1ecf1; padding: 0.6rem; }
.flash-danger { color: #721c24; background: #f8d7da; padding: 0.6rem; }
";

/// Escape text for inclusion in HTML element content or attributes.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let mut h = String::new();
    let _ = writeln!(h, "<!DOCTYPE html>");
    let _ = writeln!(h, "<html lang=\"en\">");
    let _ = writeln!(h, "<head>");
    let _ = writeln!(h, "<meta charset=\"utf-8\">");
    let _ = writeln!(
        h,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    );
    let _ = writeln!(h, "<title>{}</title>", escape_html(title));
    let _ = writeln!(h, "<style>{PAGE_CSS}</style>");
    let _ = writeln!(h, "</head>");
    let _ = writeln!(h, "<body>");
    let _ = writeln!(
        h,
        "<nav><a href=\"/\">Pagecheck</a> | <a href=\"/urls\">Sites</a></nav>"
    );
    if let Some(flash) = flash {
        let _ = writeln!(
            h,
            "<div class=\"{}\">{}</div>",
            flash.level.css_class(),
            escape_html(&flash.message)
        );
    }
    h.push_str(body);
    let _ = writeln!(h, "</body>");
    let _ = writeln!(h, "</html>");
    h
}

fn add_url_form(h: &mut String) {
    let _ = writeln!(h, "<form action=\"/urls\" method=\"post\">");
    let _ = writeln!(
        h,
        "<input type=\"text\" name=\"url\" placeholder=\"https://example.com\" required>"
    );
    let _ = writeln!(h, "<button type=\"submit\">Check</button>");
    let _ = writeln!(h, "</form>");
}

/// `GET /` — landing page with the add-URL form.
pub fn landing(flash: Option<&Flash>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Site analyzer</h1>");
    let _ = writeln!(
        body,
        "<p>Check websites for their status and basic SEO metadata.</p>"
    );
    add_url_form(&mut body);
    layout("Pagecheck", flash, &body)
}

/// `GET /urls` — registered URLs with their latest check summaries.
pub fn urls_index(summaries: &[UrlSummary], flash: Option<&Flash>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Sites</h1>");
    add_url_form(&mut body);
    let _ = writeln!(body, "<table>");
    let _ = writeln!(
        body,
        "<tr><th>ID</th><th>Name</th><th>Last check</th><th>Status</th></tr>"
    );
    for summary in summaries {
        let last_check = summary
            .last_check_at
            .map(format_timestamp)
            .unwrap_or_default();
        let last_status = summary
            .last_status
            .map(|s| s.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            body,
            "<tr><td>{id}</td>\
             <td><a href=\"/urls/{id}\">{name}</a></td>\
             <td>{last_check}</td><td>{last_status}</td></tr>",
            id = summary.url.id,
            name = escape_html(&summary.url.name),
        );
    }
    let _ = writeln!(body, "</table>");
    layout("Sites — Pagecheck", flash, &body)
}

/// `GET /urls/{id}` — one URL with its full check history.
pub fn url_show(url: &Url, checks: &[UrlCheck], flash: Option<&Flash>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(&url.name));
    let _ = writeln!(body, "<table>");
    let _ = writeln!(body, "<tr><th>ID</th><td>{}</td></tr>", url.id);
    let _ = writeln!(
        body,
        "<tr><th>Name</th><td>{}</td></tr>",
        escape_html(&url.name)
    );
    let _ = writeln!(
        body,
        "<tr><th>Created</th><td>{}</td></tr>",
        format_timestamp(url.created_at)
    );
    let _ = writeln!(body, "</table>");

    let _ = writeln!(body, "<h2>Checks</h2>");
    let _ = writeln!(body, "<form action=\"/urls/{}/checks\" method=\"post\">", url.id);
    let _ = writeln!(body, "<button type=\"submit\">Run check</button>");
    let _ = writeln!(body, "</form>");

    let _ = writeln!(body, "<table>");
    let _ = writeln!(
        body,
        "<tr><th>ID</th><th>Status</th><th>Title</th><th>H1</th>\
         <th>Description</th><th>Created</th></tr>"
    );
    for check in checks {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            check.id,
            check.status_code,
            escape_html(check.title.as_deref().unwrap_or_default()),
            escape_html(check.h1.as_deref().unwrap_or_default()),
            escape_html(check.description.as_deref().unwrap_or_default()),
            format_timestamp(check.created_at),
        );
    }
    let _ = writeln!(body, "</table>");
    layout(&format!("{} — Pagecheck", url.name), flash, &body)
}

/// 404 page for unknown URL ids.
pub fn not_found() -> String {
    layout(
        "Not found — Pagecheck",
        None,
        "<h1>Not found</h1><p>No such site is registered.</p>",
    )
}

/// Generic 500 page. Details stay in the server log.
pub fn internal_error() -> String {
    layout(
        "Error — Pagecheck",
        None,
        "<h1>Something went wrong</h1><p>Please try again.</p>",
    )
}

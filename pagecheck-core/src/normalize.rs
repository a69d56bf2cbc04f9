//! Canonicalization of user-supplied URLs.
//!
//! The registry keys sites by `scheme://authority` only: two inputs that
//! differ in path, query, or fragment map to the same canonical name.

use crate::error::NormalizeError;

/// Normalize raw user input into a canonical URL, or reject it.
///
/// The input must parse as an absolute URL with a scheme and a host;
/// anything else fails with [`NormalizeError::InvalidUrl`]. The output is
/// `scheme://authority` with path, query, and fragment stripped.
///
/// Scheme and authority keep the casing the user typed: `HTTPS://HOST.com`
/// and `https://host.com` are distinct canonical names (names are matched
/// case-sensitively). An explicit default port (`:443` on https) is kept
/// as typed, too. Pure and deterministic; no network access.
pub fn normalize(raw: &str) -> Result<String, NormalizeError> {
    // The URL spec drops tabs and newlines before parsing; do the same so
    // the as-typed spans below line up with what the parser accepted.
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();

    // Validation only — the parser lowercases scheme and host, so the
    // canonical name is reconstructed from the input instead.
    let parsed =
        url::Url::parse(&cleaned).map_err(|_| NormalizeError::InvalidUrl(raw.to_string()))?;
    if !parsed.has_host() {
        return Err(NormalizeError::InvalidUrl(raw.to_string()));
    }

    // An absolute URL always carries the scheme delimiter.
    let (scheme, rest) = cleaned
        .split_once(':')
        .ok_or_else(|| NormalizeError::InvalidUrl(raw.to_string()))?;

    // Special schemes accept any number of slashes before the authority.
    let after_slashes = rest.trim_start_matches('/');
    let authority = after_slashes
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_slashes);

    Ok(format!("{scheme}://{authority}"))
}

//! Translation between service-internal download paths and public links.
//!
//! The service hands back `/download/{id}` (sometimes absolute, sometimes
//! relative); end users see `{origin}/download/{id}`. Both directions use
//! the same extraction so an identifier round-trips.

/// Extracts the transfer identifier from anything containing a
/// `/download/{id}` segment. The id is the full remainder and may contain
/// slashes.
///
/// An empty remainder (`/download/` with nothing after it) is treated as
/// missing, so it hits the "no file ID provided" branch instead of being
/// sent to the server as an empty id.
pub fn extract_id(path: &str) -> Option<&str> {
    let (_, rest) = path.split_once("/download/")?;
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

/// Maps a service-internal resource URL to the public-facing link.
///
/// Falls back to the internal URL unchanged when it is already absolute
/// but carries no `/download/{id}` segment, and prefixes the service base
/// otherwise.
pub fn to_public(internal: &str, public_origin: &str, service_base: &str) -> String {
    if let Some(id) = extract_id(internal) {
        return format!("{}/download/{}", public_origin.trim_end_matches('/'), id);
    }
    if internal.starts_with("http://") || internal.starts_with("https://") {
        return internal.to_string();
    }
    let base = service_base.trim_end_matches('/');
    if internal.starts_with('/') {
        format!("{base}{internal}")
    } else {
        format!("{base}/{internal}")
    }
}

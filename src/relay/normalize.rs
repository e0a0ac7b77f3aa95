//! Preview-URL normalization.
//!
//! # Responsibilities
//! - Detect document-preview links that are not directly fetchable
//! - Rewrite them to the provider's direct-download endpoint
//!
//! # Design Decisions
//! - Pure function; no network access, no side effects
//! - Unrecognized inputs pass through unchanged
//! - Idempotent: the rewritten form no longer matches the preview shape

/// Host marker for the sharing platform's preview links.
const PREVIEW_HOST_MARKER: &str = "drive.google.com";

/// Path marker distinguishing preview links from direct ones.
const PREVIEW_PATH_MARKER: &str = "/preview";

/// Direct-download endpoint on the same platform.
const EXPORT_ENDPOINT: &str = "https://drive.google.com/uc";

/// Rewrite a preview URL to its direct-download form.
///
/// A URL qualifies when it carries both the preview-host and preview-path
/// markers and embeds a document identifier in a `/d/<id>` path segment.
/// Everything else is returned unchanged.
pub fn normalize_target(url: &str) -> String {
    if !url.contains(PREVIEW_HOST_MARKER) || !url.contains(PREVIEW_PATH_MARKER) {
        return url.to_string();
    }

    match extract_document_id(url) {
        Some(id) => format!("{}?export=download&id={}", EXPORT_ENDPOINT, id),
        None => url.to_string(),
    }
}

/// Extract the identifier token following a `/d/` path segment.
///
/// The identifier is the maximal run of alphanumerics, hyphens, and
/// underscores starting right after the segment marker.
fn extract_document_id(url: &str) -> Option<&str> {
    let start = url.find("/d/")? + "/d/".len();
    let rest = &url[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
        .unwrap_or(rest.len());

    if end == 0 {
        None
    } else {
        Some(&rest[..end])
    }
}

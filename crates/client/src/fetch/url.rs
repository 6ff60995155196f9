//! URL resolution for request identities.
//!
//! Cache entries are keyed by the resolved URL, so every request goes
//! through `resolve` before it reaches the worker.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a page-relative or absolute URL against the backend origin.
///
/// - Leading/trailing whitespace is trimmed
/// - Paths (`/static/app.js`, `dashboard`) are joined onto `origin`
/// - Only http and https are accepted
/// - The fragment is dropped; the query string is kept as-is
pub fn resolve(input: &str, origin: &url::Url) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = if trimmed.contains("://") {
        url::Url::parse(trimmed)
    } else {
        origin.join(trimmed)
    }
    .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match resolved.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    resolved.set_fragment(None);

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> url::Url {
        url::Url::parse("http://127.0.0.1:5000").unwrap()
    }

    #[test]
    fn test_resolve_absolute_path() {
        let url = resolve("/static/style.css", &origin()).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/static/style.css");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let url = resolve("https://Farm.Example/dashboard", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("farm.example"));
        assert_eq!(url.path(), "/dashboard");
    }

    #[test]
    fn test_resolve_drops_fragment_keeps_query() {
        let url = resolve("/dashboard?tab=history#top", &origin()).unwrap();
        assert_eq!(url.query(), Some("tab=history"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_resolve_trims_whitespace() {
        let url = resolve("  /static/app.js  ", &origin()).unwrap();
        assert_eq!(url.path(), "/static/app.js");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve("file:///etc/passwd", &origin());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve("", &origin()), Err(UrlError::Empty)));
        assert!(matches!(resolve("   ", &origin()), Err(UrlError::Empty)));
    }
}

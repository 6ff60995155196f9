//! Per-request routing decision.

use crate::fetch::{Request, RequestMode};

/// How the worker satisfies an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Not intercepted: straight to the network, no cache involvement.
    PassThrough,
    /// Network, falling back to the current bucket only on transport failure.
    NetworkFirst,
    /// Current bucket, falling back to the network without write-back.
    CacheFirst,
}

/// Pick the strategy for a request. Rules apply in order:
///
/// 1. non-GET, or a path under one of `bypass_paths` -> `PassThrough`
/// 2. navigation -> `NetworkFirst`
/// 3. anything else -> `CacheFirst`
pub fn route(request: &Request, bypass_paths: &[String]) -> Strategy {
    let path = request.url.path();
    if !request.is_read_only() || bypass_paths.iter().any(|prefix| path.starts_with(prefix.as_str())) {
        return Strategy::PassThrough;
    }

    match request.mode {
        RequestMode::Navigate => Strategy::NetworkFirst,
        RequestMode::SubResource => Strategy::CacheFirst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use url::Url;

    fn bypass() -> Vec<String> {
        vec!["/login".into(), "/signup".into()]
    }

    fn url(path: &str) -> Url {
        Url::parse("http://127.0.0.1:5000").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_mutations_pass_through() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let mut request = Request::get(url("/static/app.js"));
            request.method = method;
            assert_eq!(route(&request, &bypass()), Strategy::PassThrough);
        }
        let analyze = Request::post_json(url("/api/analyze-crop"), "{}");
        assert_eq!(route(&analyze, &bypass()), Strategy::PassThrough);
    }

    #[test]
    fn test_auth_paths_pass_through_even_for_get() {
        assert_eq!(route(&Request::navigate(url("/login")), &bypass()), Strategy::PassThrough);
        assert_eq!(route(&Request::get(url("/signup?next=/dashboard")), &bypass()), Strategy::PassThrough);
    }

    #[test]
    fn test_navigation_is_network_first() {
        assert_eq!(route(&Request::navigate(url("/dashboard")), &bypass()), Strategy::NetworkFirst);
        assert_eq!(route(&Request::navigate(url("/")), &bypass()), Strategy::NetworkFirst);
    }

    #[test]
    fn test_static_is_cache_first() {
        assert_eq!(route(&Request::get(url("/static/style.css")), &bypass()), Strategy::CacheFirst);
        assert_eq!(route(&Request::get(url("/static/manifest.json")), &bypass()), Strategy::CacheFirst);
    }
}

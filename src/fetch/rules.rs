//! Route classification for mediated fetches.
//!
//! A fixed, ordered rule table maps URL classes to a caching strategy and a
//! target store. First match wins; unmatched requests fall through to the
//! page-request handler. The exclusion list is checked before everything
//! else: matching URLs are never mediated at all.

use url::Url;

use crate::fetch::Strategy;

// == Exclusion List ==
/// Path fragments that must never be cached or mediated. The itinerary
/// creation flow is cache-breaking: it streams freshly generated content.
pub const EXCLUDED_PATH_FRAGMENTS: &[&str] = &["/roteiros/criar"];

/// External image-search hosts that are queried live, never through caches.
pub const EXCLUDED_HOSTS: &[&str] = &["api.unsplash.com", "customsearch.googleapis.com"];

// == Route Classes ==
const FONT_HOSTS: &[&str] = &["fonts.googleapis.com", "fonts.gstatic.com"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "gif", "webp", "ico"];
const SCRIPT_EXTENSIONS: &[&str] = &["js", "css"];

// == Route Pattern ==
/// URL pattern matched by a route rule.
#[derive(Debug, Clone, Copy)]
pub enum RoutePattern {
    /// Host is exactly one of the listed hosts
    HostIn(&'static [&'static str]),
    /// Host starts with the given prefix (e.g. `api.` subdomains)
    HostPrefix(&'static str),
    /// Last path segment has one of the listed extensions
    PathExtensionIn(&'static [&'static str]),
}

impl RoutePattern {
    /// Whether the pattern matches the given URL.
    pub fn matches(&self, url: &Url) -> bool {
        match self {
            RoutePattern::HostIn(hosts) => url
                .host_str()
                .map(|host| hosts.contains(&host))
                .unwrap_or(false),
            RoutePattern::HostPrefix(prefix) => url
                .host_str()
                .map(|host| host.starts_with(prefix))
                .unwrap_or(false),
            RoutePattern::PathExtensionIn(extensions) => {
                let file = url.path().rsplit('/').next().unwrap_or("");
                match file.rsplit_once('.') {
                    Some((_, ext)) => {
                        let ext = ext.to_ascii_lowercase();
                        extensions.contains(&ext.as_str())
                    }
                    None => false,
                }
            }
        }
    }
}

// == Route Rule ==
/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    /// Pattern this rule matches
    pub pattern: RoutePattern,
    /// Strategy to apply
    pub strategy: Strategy,
    /// Base name of the target store (version tag added by the registry)
    pub store: &'static str,
}

/// The classification table, checked in order. Defined once at module
/// scope and never mutated.
pub const ROUTE_RULES: &[RouteRule] = &[
    RouteRule {
        pattern: RoutePattern::HostIn(FONT_HOSTS),
        strategy: Strategy::StaleWhileRevalidate,
        store: "fonts",
    },
    RouteRule {
        pattern: RoutePattern::PathExtensionIn(IMAGE_EXTENSIONS),
        strategy: Strategy::CacheFirst,
        store: "images",
    },
    RouteRule {
        pattern: RoutePattern::PathExtensionIn(SCRIPT_EXTENSIONS),
        strategy: Strategy::StaleWhileRevalidate,
        store: "static-resources",
    },
    RouteRule {
        pattern: RoutePattern::HostPrefix("api."),
        strategy: Strategy::NetworkFirst,
        store: "api-cache",
    },
];

// == Classification ==
/// True when the URL must bypass mediation entirely.
pub fn is_excluded(url: &Url) -> bool {
    if EXCLUDED_PATH_FRAGMENTS
        .iter()
        .any(|fragment| url.path().contains(fragment))
    {
        return true;
    }
    url.host_str()
        .map(|host| EXCLUDED_HOSTS.contains(&host))
        .unwrap_or(false)
}

/// First matching rule for the URL, if any.
pub fn classify(url: &Url) -> Option<&'static RouteRule> {
    ROUTE_RULES.iter().find(|rule| rule.pattern.matches(url))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_fonts_classified_swr() {
        let rule = classify(&url("https://fonts.googleapis.com/css2?family=Inter")).unwrap();
        assert_eq!(rule.strategy, Strategy::StaleWhileRevalidate);
        assert_eq!(rule.store, "fonts");

        let rule = classify(&url("https://fonts.gstatic.com/s/inter/v12/x.woff2")).unwrap();
        assert_eq!(rule.store, "fonts");
    }

    #[test]
    fn test_images_classified_cache_first() {
        for ext in ["png", "jpg", "jpeg", "svg", "gif", "webp", "ico"] {
            let rule = classify(&url(&format!("https://cdn.example.com/foto.{ext}"))).unwrap();
            assert_eq!(rule.strategy, Strategy::CacheFirst, "extension {ext}");
            assert_eq!(rule.store, "images");
        }
    }

    #[test]
    fn test_image_extension_case_insensitive() {
        let rule = classify(&url("https://cdn.example.com/FOTO.PNG")).unwrap();
        assert_eq!(rule.store, "images");
    }

    #[test]
    fn test_scripts_and_styles_classified_swr() {
        let rule = classify(&url("https://app.example.com/_next/static/chunk.js")).unwrap();
        assert_eq!(rule.strategy, Strategy::StaleWhileRevalidate);
        assert_eq!(rule.store, "static-resources");

        let rule = classify(&url("https://app.example.com/styles/site.css")).unwrap();
        assert_eq!(rule.store, "static-resources");
    }

    #[test]
    fn test_api_subdomain_classified_network_first() {
        let rule = classify(&url("https://api.unindodestinos.com.br/viagens/12")).unwrap();
        assert_eq!(rule.strategy, Strategy::NetworkFirst);
        assert_eq!(rule.store, "api-cache");
    }

    #[test]
    fn test_first_match_wins_for_font_css() {
        // Google Fonts serves .css URLs; the host rule must win over the
        // script-extension rule because it comes first.
        let rule = classify(&url("https://fonts.googleapis.com/icon.css")).unwrap();
        assert_eq!(rule.store, "fonts");
    }

    #[test]
    fn test_plain_pages_unclassified() {
        assert!(classify(&url("https://app.example.com/perfil")).is_none());
        assert!(classify(&url("https://app.example.com/")).is_none());
    }

    #[test]
    fn test_dotted_directory_is_not_an_extension() {
        // The dot lives in a directory segment, not the file name
        assert!(classify(&url("https://app.example.com/v1.2/data")).is_none());
    }

    #[test]
    fn test_exclusion_by_path_fragment() {
        assert!(is_excluded(&url(
            "https://app.example.com/roteiros/criar?viagem=7"
        )));
        assert!(!is_excluded(&url("https://app.example.com/roteiros/42")));
    }

    #[test]
    fn test_exclusion_by_host() {
        assert!(is_excluded(&url("https://api.unsplash.com/search/photos")));
        assert!(is_excluded(&url(
            "https://customsearch.googleapis.com/customsearch/v1"
        )));
        assert!(!is_excluded(&url("https://api.unindodestinos.com.br/me")));
    }

    #[test]
    fn test_excluded_host_would_otherwise_match_api_rule() {
        // Exclusion precedence matters: the image-search host starts with
        // "api." and would land in the api-cache store without it.
        let u = url("https://api.unsplash.com/search/photos?query=praia");
        assert!(is_excluded(&u));
        assert!(classify(&u).is_some());
    }
}

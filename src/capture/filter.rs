use log::{trace, warn};

use crate::models::exchange::{CapturedExchange, ExchangeFields};
use crate::models::filter::{FilterConfig, HttpMethod};

/// Result of evaluating the filter against one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// Method outside the fixed list or not enabled
    RejectedByMethod,
    /// File-type criterion failed
    RejectedByFileType,
    /// No active URI pattern matched
    RejectedByUri,
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        matches!(self, Verdict::Keep)
    }
}

/// Evaluate all criteria in order, stopping at the first failure
pub fn evaluate(fields: ExchangeFields<'_>, config: &FilterConfig) -> Verdict {
    if !method_passes(fields.method, config) {
        return Verdict::RejectedByMethod;
    }
    if !file_type_passes(fields.url, config) {
        return Verdict::RejectedByFileType;
    }
    if !uri_passes(fields.url, config) {
        return Verdict::RejectedByUri;
    }
    Verdict::Keep
}

fn method_passes(method: &str, config: &FilterConfig) -> bool {
    // No catch-all: unknown methods never pass
    match method.parse::<HttpMethod>() {
        Ok(m) => config.is_method_enabled(m),
        Err(_) => false,
    }
}

/// Case-insensitive suffix match of `.ext` for any enabled extension
pub fn has_file_extension<'a, I>(url: &str, extensions: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let url = url.to_lowercase();
    extensions
        .into_iter()
        .any(|ext| url.ends_with(&format!(".{}", ext.to_lowercase())))
}

fn file_type_passes(url: &str, config: &FilterConfig) -> bool {
    let file_types = &config.file_types;
    let is_match = has_file_extension(url, &file_types.extensions);

    if file_types.include {
        file_types.extensions.is_empty() || is_match
    } else {
        !is_match
    }
}

fn uri_passes(url: &str, config: &FilterConfig) -> bool {
    let mut patterns = config.active_uri_patterns().peekable();
    if patterns.peek().is_none() {
        return true;
    }
    patterns.any(|pattern| url.contains(pattern))
}

/// Recompute the filtered view as indices into `exchanges`.
///
/// Exchanges whose fields cannot be extracted are logged and skipped.
/// Returns the kept indices in capture order and the number skipped.
pub fn filter_view(exchanges: &[CapturedExchange], config: &FilterConfig) -> (Vec<usize>, usize) {
    let mut dropped = 0;

    let kept = exchanges
        .iter()
        .enumerate()
        .filter_map(|(index, exchange)| match exchange.fields() {
            Ok(fields) => {
                let verdict = evaluate(fields, config);
                trace!("Exchange {} {} {}: {:?}", exchange.id, fields.method, fields.url, verdict);
                verdict.is_keep().then_some(index)
            }
            Err(e) => {
                warn!("Error filtering request: {}", e);
                dropped += 1;
                None
            }
        })
        .collect();

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn exchange(id: u64, method: &str, url: &str) -> CapturedExchange {
        CapturedExchange {
            id,
            captured_at: Utc::now(),
            request: format!("{} {} HTTP/1.1\r\n\r\n", method, url).into_bytes(),
            response: None,
            method: Some(method.to_string()),
            url: Some(url.to_string()),
            status_code: None,
        }
    }

    fn fields<'a>(method: &'a str, url: &'a str) -> ExchangeFields<'a> {
        ExchangeFields { method, url }
    }

    fn no_file_types() -> FilterConfig {
        let mut config = FilterConfig::default();
        config.file_types.extensions.clear();
        config
    }

    #[test]
    fn default_config_excludes_static_assets() {
        let config = FilterConfig::default();
        assert_eq!(
            evaluate(fields("GET", "http://x.com/app.JS"), &config),
            Verdict::RejectedByFileType
        );
        assert!(evaluate(fields("GET", "http://x.com/api/users"), &config).is_keep());
    }

    #[test]
    fn unknown_methods_are_always_rejected() {
        let config = FilterConfig::default();
        assert_eq!(
            evaluate(fields("TRACE", "http://x.com/"), &config),
            Verdict::RejectedByMethod
        );
        assert_eq!(
            evaluate(fields("get", "http://x.com/"), &config),
            Verdict::RejectedByMethod
        );
    }

    #[test]
    fn include_mode_keeps_only_matches() {
        let mut config = FilterConfig::default();
        config.file_types.extensions = ["js".to_string()].into_iter().collect();

        assert!(!evaluate(fields("GET", "http://x.com/a.js"), &config).is_keep());
        config.file_types.include = true;
        assert!(evaluate(fields("GET", "http://x.com/a.js"), &config).is_keep());
        assert!(!evaluate(fields("GET", "http://x.com/a.html"), &config).is_keep());
    }

    #[test]
    fn include_mode_with_no_extensions_passes_everything() {
        let mut config = no_file_types();
        config.file_types.include = true;
        assert!(evaluate(fields("GET", "http://x.com/a.html"), &config).is_keep());
    }

    #[test]
    fn extension_match_ignores_query_suffix() {
        // The whole URL is matched, so a query string hides the extension
        let config = FilterConfig::default();
        assert!(evaluate(fields("GET", "http://x.com/a.js?v=2"), &config).is_keep());
    }

    #[test]
    fn uri_patterns_are_or_combined_and_blank_ones_ignored() {
        let mut config = no_file_types();
        config.uri_patterns = vec!["login".to_string(), "".to_string()];

        assert!(evaluate(fields("POST", "http://x.com/user/login?next=/"), &config).is_keep());
        assert_eq!(
            evaluate(fields("POST", "http://x.com/logout"), &config),
            Verdict::RejectedByUri
        );

        config.uri_patterns.push("logout".to_string());
        assert!(evaluate(fields("POST", "http://x.com/logout"), &config).is_keep());

        config.uri_patterns = vec!["  ".to_string(), "".to_string()];
        assert!(evaluate(fields("POST", "http://x.com/anything"), &config).is_keep());
    }

    #[test]
    fn uri_match_is_case_sensitive() {
        let mut config = no_file_types();
        config.uri_patterns = vec!["Login".to_string()];
        assert!(!evaluate(fields("GET", "http://x.com/login"), &config).is_keep());
    }

    #[test]
    fn evaluation_is_repeatable() {
        let mut config = FilterConfig::default();
        config.uri_patterns = vec!["api".to_string()];
        let f = fields("PUT", "http://x.com/api/item");
        assert_eq!(evaluate(f, &config), evaluate(f, &config));
    }

    #[test]
    fn disabling_post_removes_only_post() {
        let exchanges = vec![
            exchange(1, "GET", "http://x.com/a"),
            exchange(2, "POST", "http://x.com/b"),
            exchange(3, "DELETE", "http://x.com/c"),
            exchange(4, "POST", "http://x.com/d.js"),
            exchange(5, "PATCH", "http://x.com/e"),
        ];
        let mut config = no_file_types();
        let (before, _) = filter_view(&exchanges, &config);

        config.methods.remove(&HttpMethod::Post);
        let (after, _) = filter_view(&exchanges, &config);

        let expected: Vec<usize> = before
            .iter()
            .copied()
            .filter(|&i| exchanges[i].method.as_deref() != Some("POST"))
            .collect();
        assert_eq!(after, expected);
        assert_eq!(after, vec![0, 2, 4]);
    }

    #[test]
    fn view_is_stable_subsequence_and_skips_broken_entries() {
        let mut broken = exchange(2, "GET", "http://x.com/b");
        broken.url = None;
        let exchanges = vec![
            exchange(1, "GET", "http://x.com/z"),
            broken,
            exchange(3, "GET", "http://x.com/style.css"),
            exchange(4, "OPTIONS", "http://x.com/a"),
        ];

        let (view, dropped) = filter_view(&exchanges, &FilterConfig::default());
        assert_eq!(view, vec![0, 3]);
        assert_eq!(dropped, 1);
        assert!(view.windows(2).all(|w| w[0] < w[1]));
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    prop_compose! {
        fn arb_exchange()(
            method in prop::option::of(prop::sample::select(vec![
                "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "TRACE", "CONNECT", "post",
            ])),
            host in prop::sample::select(vec!["x.com", "api.y.org"]),
            path in "[a-z]{0,6}(/login|/api|/logout)?",
            ext in prop::sample::select(vec!["", ".js", ".JS", ".css", ".png", ".html", ".js?v=1"]),
            has_url in prop::bool::weighted(0.9),
        ) -> CapturedExchange {
            let url = format!("http://{}/{}{}", host, path, ext);
            CapturedExchange {
                id: 0,
                captured_at: Utc::now(),
                request: url.clone().into_bytes(),
                response: None,
                method: method.map(str::to_string),
                url: has_url.then_some(url),
                status_code: None,
            }
        }
    }

    prop_compose! {
        fn arb_config()(
            methods in prop::sample::subsequence(HttpMethod::ALL.to_vec(), 0..=7),
            extensions in prop::sample::subsequence(vec!["js", "css", "png", "gif", "html"], 0..=5),
            include in any::<bool>(),
            uri_patterns in prop::collection::vec(
                prop::sample::select(vec!["", " ", "login", "api", "x.com", "LOGIN"]).prop_map(str::to_string),
                1..=5,
            ),
        ) -> FilterConfig {
            let mut config = FilterConfig::default();
            config.methods = methods.into_iter().collect();
            config.file_types.extensions = extensions.into_iter().map(str::to_string).collect();
            config.file_types.include = include;
            config.uri_patterns = uri_patterns;
            config
        }
    }

    fn numbered(mut exchanges: Vec<CapturedExchange>) -> Vec<CapturedExchange> {
        for (i, exchange) in exchanges.iter_mut().enumerate() {
            exchange.id = i as u64 + 1;
        }
        exchanges
    }

    proptest! {
        #[test]
        fn prop_evaluate_is_pure(exchange in arb_exchange(), config in arb_config()) {
            if let Ok(fields) = exchange.fields() {
                prop_assert_eq!(evaluate(fields, &config), evaluate(fields, &config));
            }
        }

        #[test]
        fn prop_view_is_exactly_the_passing_subsequence(
            exchanges in prop::collection::vec(arb_exchange(), 0..40),
            config in arb_config(),
        ) {
            let exchanges = numbered(exchanges);
            let (view, dropped) = filter_view(&exchanges, &config);

            prop_assert!(view.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(view.iter().all(|&i| i < exchanges.len()));

            let expected: Vec<usize> = exchanges
                .iter()
                .enumerate()
                .filter(|(_, e)| e.fields().map(|f| evaluate(f, &config).is_keep()).unwrap_or(false))
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(&view, &expected);

            let broken = exchanges.iter().filter(|e| e.fields().is_err()).count();
            prop_assert_eq!(dropped, broken);
        }

        #[test]
        fn prop_disabling_post_removes_only_post(
            exchanges in prop::collection::vec(arb_exchange(), 0..40),
            mut config in arb_config(),
        ) {
            let exchanges = numbered(exchanges);
            config.methods.insert(HttpMethod::Post);
            let (before, _) = filter_view(&exchanges, &config);

            config.methods.remove(&HttpMethod::Post);
            let (after, _) = filter_view(&exchanges, &config);

            let expected: Vec<usize> = before
                .iter()
                .copied()
                .filter(|&i| exchanges[i].method.as_deref() != Some("POST"))
                .collect();
            prop_assert_eq!(after, expected);
        }

        #[test]
        fn prop_unlisted_methods_never_pass(exchange in arb_exchange(), config in arb_config()) {
            if let Ok(fields) = exchange.fields() {
                let listed: BTreeSet<&str> = HttpMethod::ALL.iter().map(|m| m.as_str()).collect();
                if !listed.contains(fields.method) {
                    prop_assert_eq!(evaluate(fields, &config), Verdict::RejectedByMethod);
                }
            }
        }
    }
}

//! URL canonicalisation for cross-provider deduplication.
//!
//! Different providers hand back the same page dressed differently:
//! tracking parameters, shuffled query order, fragments, uppercase
//! hosts. Canonicalising before comparison makes those collapse.

use url::Url;

/// Query parameters that carry no identity and are dropped.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "si",
    "feature",
];

/// Canonicalise a URL for deduplication.
///
/// Lowercases scheme/host, drops the fragment and default ports,
/// strips tracking parameters, sorts the remaining query pairs, and
/// removes a trailing slash (the root path `/` is kept). Unparsable
/// input is returned unchanged so dedup still works on raw strings.
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        let qs: String = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&qs));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    parsed.to_string()
}

fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}

/// Registrable host of a URL, used for one-source-per-domain selection.
///
/// A leading `www.` is stripped so `www.example.com` and `example.com`
/// count as the same outlet. Unparsable URLs map to the raw string.
pub fn domain_of(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or(raw);
            host.strip_prefix("www.").unwrap_or(host).to_lowercase()
        }
        Err(_) => raw.to_lowercase(),
    }
}

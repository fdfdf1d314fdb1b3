use serde_json::Value;
use url::Url;

use super::Resource;

pub const MAX_RESOURCES: usize = 4;

const ALLOWED_HOSTS: [&str; 14] = [
    "www.investopedia.com",
    "investopedia.com",
    "www.rbcroyalbank.com",
    "rbcroyalbank.com",
    "www.canada.ca",
    "canada.ca",
    "www.irs.gov",
    "irs.gov",
    "www.sec.gov",
    "sec.gov",
    "www.bankofengland.co.uk",
    "bankofengland.co.uk",
    "www.investor.gov",
    "investor.gov",
];

/// Drop a leading/trailing ```json fence pair around model output
pub fn strip_fences(raw: &str) -> &str {
    let s = raw.trim();
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```JSON"))
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    s.strip_suffix("```").unwrap_or(s).trim()
}

/// Keep only well-formed links on allowlisted hosts, at most [`MAX_RESOURCES`]
pub fn sanitize_resources(resources: &[Value]) -> Vec<Resource> {
    let mut cleaned: Vec<Resource> = resources.iter().filter_map(sanitize_resource).collect();

    if cleaned.is_empty() {
        cleaned = fallback_resources();
    }
    cleaned.truncate(MAX_RESOURCES);
    cleaned
}

fn sanitize_resource(resource: &Value) -> Option<Resource> {
    let title = resource.get("title")?.as_str()?.trim();
    let raw_url = resource.get("url")?.as_str()?;

    let mut url = Url::parse(&canonicalize_url(raw_url)?).ok()?;
    let host = url.host_str()?.to_string();
    if !matches!(url.scheme(), "http" | "https") || !ALLOWED_HOSTS.contains(&host.as_str()) {
        return None;
    }
    if host == "investopedia.com" || host == "rbcroyalbank.com" {
        url.set_host(Some(&format!("www.{}", host))).ok()?;
    }

    Some(Resource {
        title: if title.is_empty() { "Resource".to_string() } else { title.to_string() },
        url: url.to_string(),
    })
}

/// Normalise a model-written link into an absolute http(s) URL
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let mut s = raw.trim().to_string();
    if s.is_empty() {
        return None;
    }

    // [text](https://...) -> https://...
    if let Some(inner) = markdown_target(&s) {
        s = inner;
    }

    let lower = s.to_ascii_lowercase();
    if lower.starts_with("www.") {
        s = format!("https://{}", s);
    } else if is_bare_domain(&s) && !lower.starts_with("http://") && !lower.starts_with("https://") {
        s = format!("https://{}", s);
    }

    let url = Url::parse(&s).ok()?;
    match (url.scheme(), url.host_str()) {
        ("http" | "https", Some(host)) if !host.is_empty() => Some(url.to_string()),
        _ => None,
    }
}

fn markdown_target(s: &str) -> Option<String> {
    s.match_indices("(http").find_map(|(start, _)| {
        let rest = &s[start + 1..];
        let end = rest.find(')')?;
        let target = &rest[..end];
        let after_scheme = target
            .strip_prefix("https://")
            .or_else(|| target.strip_prefix("http://"))?;
        (!after_scheme.is_empty()).then(|| target.to_string())
    })
}

// `example.com` or `example.com/path`
fn is_bare_domain(s: &str) -> bool {
    let host = s.split('/').next().unwrap_or_default();
    let Some((name, tld)) = host.rsplit_once('.') else {
        return false;
    };
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn fallback_resources() -> Vec<Resource> {
    vec![
        Resource {
            title: "What Is an ETF?".to_string(),
            url: "https://www.investopedia.com/terms/e/etf.asp".to_string(),
        },
        Resource {
            title: "Dollar-Cost Averaging".to_string(),
            url: "https://www.investopedia.com/terms/d/dollarcostaveraging.asp".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_fences("  {}  "), "{}");
    }

    #[test]
    fn canonicalize_adds_scheme_and_unwraps_markdown() {
        assert_eq!(
            canonicalize_url("[ETF](https://www.investopedia.com/terms/e/etf.asp)").as_deref(),
            Some("https://www.investopedia.com/terms/e/etf.asp")
        );
        assert_eq!(canonicalize_url("www.sec.gov").as_deref(), Some("https://www.sec.gov/"));
        assert_eq!(canonicalize_url("irs.gov/taxes").as_deref(), Some("https://irs.gov/taxes"));
        assert_eq!(canonicalize_url("ftp://sec.gov/file"), None);
        assert_eq!(canonicalize_url("   "), None);
        assert_eq!(canonicalize_url("not a link"), None);
    }

    #[test]
    fn only_allowlisted_hosts_survive() {
        let resources = vec![
            json!({"title": "ETF", "url": "investopedia.com/terms/e/etf.asp"}),
            json!({"title": "", "url": "https://www.canada.ca/en/services/finance.html"}),
            json!({"title": "Blog", "url": "https://random-blog.example.com/etf"}),
            json!({"title": 5, "url": "https://www.sec.gov"}),
        ];
        let cleaned = sanitize_resources(&resources);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].url, "https://www.investopedia.com/terms/e/etf.asp");
        assert_eq!(cleaned[1].title, "Resource");
    }

    #[test]
    fn empty_result_uses_fallbacks_and_list_is_capped() {
        assert_eq!(sanitize_resources(&[]), fallback_resources());

        let many: Vec<Value> = (0..6)
            .map(|i| json!({"title": format!("r{}", i), "url": format!("https://www.irs.gov/p{}", i)}))
            .collect();
        assert_eq!(sanitize_resources(&many).len(), MAX_RESOURCES);
    }
}

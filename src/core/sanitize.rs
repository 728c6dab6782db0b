// src/core/sanitize.rs

/// Decode the handful of entities Drupal emits in claim pages.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// `Some(trimmed)` unless the text is blank.
pub fn non_empty(s: impl AsRef<str>) -> Option<String> {
    let t = normalize_ws(s.as_ref());
    if t.is_empty() { None } else { Some(t) }
}

/// Canonical form of a claim URL for table lookups: no scheme, no `www.`,
/// no trailing slash or fragment, lowercase.
pub fn normalize_url(url: &str) -> String {
    let t = url.trim();
    let t = t.split('#').next().unwrap_or(t);
    let t = t
        .strip_prefix("https://")
        .or_else(|| t.strip_prefix("http://"))
        .unwrap_or(t);
    let t = t.strip_prefix("www.").unwrap_or(t);
    t.trim_end_matches('/').to_ascii_lowercase()
}

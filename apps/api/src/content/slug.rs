use std::collections::HashSet;

use chrono::NaiveDate;

use super::CONTENT_ROUTE_PREFIX;

/// Builds `YYYY-MM-DD-title-words` from a devotional's title and publish date.
pub fn generate_slug(title: &str, date: NaiveDate) -> String {
    let mut title_slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !title_slug.is_empty() {
                title_slug.push('-');
            }
            pending_dash = false;
            title_slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    let date = date.format("%Y-%m-%d");
    if title_slug.is_empty() {
        date.to_string()
    } else {
        format!("{date}-{title_slug}")
    }
}

/// Returns `base` if unused, otherwise the first free `base-N` for N = 1, 2, ...
pub fn unique_slug(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    (1u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

pub fn canonical_url(origin: &str, slug: &str) -> String {
    format!(
        "{}{}{}",
        origin.trim_end_matches('/'),
        CONTENT_ROUTE_PREFIX,
        slug
    )
}

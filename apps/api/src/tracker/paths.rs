use serde::{Deserialize, Serialize};

use crate::content::CONTENT_ROUTE_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteSection {
    Children,
    Teenagers,
    Admin,
    Writer,
}

impl SiteSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteSection::Children => "children",
            SiteSection::Teenagers => "teenagers",
            SiteSection::Admin => "admin",
            SiteSection::Writer => "writer",
        }
    }
}

const SECTION_MARKERS: &[(&str, SiteSection)] = &[
    ("/children", SiteSection::Children),
    ("/teenagers", SiteSection::Teenagers),
    ("/admin", SiteSection::Admin),
    ("/writer", SiteSection::Writer),
];

/// First matching section marker wins, in the order above.
pub fn section_from_path(path: &str) -> Option<SiteSection> {
    SECTION_MARKERS
        .iter()
        .find(|(marker, _)| path.contains(marker))
        .map(|(_, section)| *section)
}

/// Everything after `/devotional/`, minus trailing slashes.
pub fn content_id_from_path(path: &str) -> Option<String> {
    let idx = path.find(CONTENT_ROUTE_PREFIX)?;
    let rest = path[idx + CONTENT_ROUTE_PREFIX.len()..].trim_end_matches('/');
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections() {
        assert_eq!(section_from_path("/children"), Some(SiteSection::Children));
        assert_eq!(
            section_from_path("/teenagers/archive"),
            Some(SiteSection::Teenagers)
        );
        assert_eq!(section_from_path("/admin/analytics"), Some(SiteSection::Admin));
        assert_eq!(section_from_path("/writer"), Some(SiteSection::Writer));
        assert_eq!(section_from_path("/"), None);
        assert_eq!(section_from_path("/devotional/abc"), None);
    }

    #[test]
    fn test_content_id() {
        assert_eq!(
            content_id_from_path("/devotional/2024-01-01-hope-today").as_deref(),
            Some("2024-01-01-hope-today")
        );
        assert_eq!(
            content_id_from_path("/devotional/hope/").as_deref(),
            Some("hope")
        );
        assert_eq!(content_id_from_path("/devotional/"), None);
        assert_eq!(content_id_from_path("/children"), None);
    }
}

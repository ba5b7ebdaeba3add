use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

/// The fixed set of editable page slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Top,
    Access,
    Reservations,
    About,
    Features,
}

impl SectionKey {
    pub const ALL: [SectionKey; 5] = [
        SectionKey::Top,
        SectionKey::Access,
        SectionKey::Reservations,
        SectionKey::About,
        SectionKey::Features,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Top => "top",
            SectionKey::Access => "access",
            SectionKey::Reservations => "reservations",
            SectionKey::About => "about",
            SectionKey::Features => "features",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for SectionKey {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub id: i64,
    pub section: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub highlight: Option<String>,
    pub image: Option<String>,
    pub extra_info: Option<String>,
}

/// The six editable fields of a section. Updates replace all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub highlight: Option<String>,
    pub image: Option<String>,
    pub extra_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub file_path: String,
    pub caption: Option<String>,
    pub display_order: i64,
    pub created_at: String,
}

pub const DEFAULT_FEATURE_ICON: &str = "fa-mug-hot";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeature {
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl NewFeature {
    /// `None` when the title or description is missing or blank.
    pub fn from_parts(
        title: Option<&str>,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> Option<Self> {
        let title = non_blank(title)?;
        let description = non_blank(description)?;
        let icon = non_blank(icon).unwrap_or_else(|| DEFAULT_FEATURE_ICON.to_string());
        Some(Self {
            title,
            description,
            icon,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
}

impl NewAnnouncement {
    pub fn from_parts(title: Option<&str>, content: Option<&str>) -> Option<Self> {
        Some(Self {
            title: non_blank(title)?,
            content: non_blank(content)?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a row id submitted through a form. Missing or malformed ids yield `None`.
pub fn parse_row_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_keys_round_trip_through_strings() {
        for key in SectionKey::ALL {
            assert_eq!(key.as_str().parse::<SectionKey>(), Ok(key));
        }
        assert_eq!(
            "menu".parse::<SectionKey>(),
            Err(UnknownSection("menu".to_string()))
        );
    }

    #[test]
    fn new_feature_requires_title_and_description() {
        assert!(NewFeature::from_parts(None, Some("desc"), None).is_none());
        assert!(NewFeature::from_parts(Some("  "), Some("desc"), None).is_none());
        assert!(NewFeature::from_parts(Some("Title"), Some(""), None).is_none());

        let feature = NewFeature::from_parts(Some("Title"), Some("desc"), None).unwrap();
        assert_eq!(feature.icon, DEFAULT_FEATURE_ICON);

        let feature = NewFeature::from_parts(Some("Title"), Some("desc"), Some("fa-leaf")).unwrap();
        assert_eq!(feature.icon, "fa-leaf");
    }

    #[test]
    fn new_announcement_requires_both_fields() {
        assert!(NewAnnouncement::from_parts(Some("t"), None).is_none());
        assert!(NewAnnouncement::from_parts(None, Some("c")).is_none());
        assert!(NewAnnouncement::from_parts(Some("t"), Some("c")).is_some());
    }

    #[test]
    fn parse_row_id_ignores_garbage() {
        assert_eq!(parse_row_id(Some("42")), Some(42));
        assert_eq!(parse_row_id(Some(" 7 ")), Some(7));
        assert_eq!(parse_row_id(Some("abc")), None);
        assert_eq!(parse_row_id(Some("")), None);
        assert_eq!(parse_row_id(None), None);
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            password_hash: "secret-hash".to_string(),
            created_at: "2024-01-01T00:00:00.000000".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}

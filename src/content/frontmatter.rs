//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::ContentError;

/// Accepts a YAML scalar of any kind and keeps its textual form,
/// so `readTime: 5` and `readTime: "5 min"` both land as strings.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarString)
}

/// Reads a numeric level from an int, a float or a numeric string.
/// Anything else is logged and treated as unset rather than failing the post.
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct LenientLevel;

    fn from_f64(value: f64) -> Option<i64> {
        if value.is_finite() {
            Some(value.round() as i64)
        } else {
            tracing::warn!("Ignoring non-finite difficultyLevel {}", value);
            None
        }
    }

    impl<'de> Visitor<'de> for LenientLevel {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(i64::try_from(value).unwrap_or(i64::MAX)))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(from_f64(value))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let trimmed = value.trim();
            if let Ok(level) = trimmed.parse::<i64>() {
                return Ok(Some(level));
            }
            match trimmed.parse::<f64>() {
                Ok(level) => Ok(from_f64(level)),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric difficultyLevel {:?}", value);
                    Ok(None)
                }
            }
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            tracing::warn!("Ignoring non-numeric difficultyLevel {}", value);
            Ok(None)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            tracing::warn!("Ignoring list-valued difficultyLevel");
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            tracing::warn!("Ignoring map-valued difficultyLevel");
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientLevel)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(rename = "readTime", deserialize_with = "scalar_string")]
    pub read_time: Option<String>,
    #[serde(rename = "difficultyLevel", deserialize_with = "lenient_level")]
    pub difficulty_level: Option<i64>,
    pub draft: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split a document into front-matter and body.
    ///
    /// A leading `---` block that has no `key: value` line is not front-matter
    /// and the whole document is returned as body. A leading byte order mark
    /// is dropped.
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let trimmed = content.trim_start();
        let Some(rest) = trimmed.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        let rest = rest.trim_start_matches([' ', '\t']);
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'));
        let Some(rest) = rest else {
            // `---something` on the first line
            return Ok((FrontMatter::default(), content));
        };

        let (yaml, body) = match find_closing_fence(rest) {
            Some(split) => split,
            None => return Ok((FrontMatter::default(), content)),
        };

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        if !looks_like_yaml(yaml) {
            return Ok((FrontMatter::default(), content));
        }

        let fm: FrontMatter = serde_yaml::from_str(yaml)?;
        Ok((fm, body))
    }

    /// Parse the date field
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Returns `(yaml, body)` when a closing `---` line exists
fn find_closing_fence(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let after = &trimmed[colon_pos + 1..];
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp")
            && (after.is_empty() || after.starts_with(' '))
    })
}

/// Parse a date string in the formats posts use in practice
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    const DATETIME_FORMATS: [&str; 7] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // Offsets are normalised to UTC so posts written in different zones compare fairly
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2023-03-01
readTime: 5 min
difficultyLevel: 2
cover: hero.png
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2023-03-01"));
        assert_eq!(fm.read_time.as_deref(), Some("5 min"));
        assert_eq!(fm.difficulty_level, Some(2));
        assert!(!fm.draft);
        assert!(fm.extra.contains_key("cover"));
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_numeric_read_time() {
        let content = "---\ntitle: 2048\nreadTime: 7\n---\nbody";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("2048"));
        assert_eq!(fm.read_time.as_deref(), Some("7"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let content = "\u{feff}---\ntitle: Bom Title\ndate: 2023-01-01\n---\nbody";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Bom Title"));
        assert_eq!(body, "body");

        let (_, body) = FrontMatter::parse("\u{feff}# Plain").unwrap();
        assert_eq!(body, "# Plain");
    }

    #[test]
    fn test_lenient_difficulty_level() {
        let level = |value: &str| {
            let content = format!("---\ntitle: T\ndifficultyLevel: {}\n---\n", value);
            FrontMatter::parse(&content).unwrap().0.difficulty_level
        };
        assert_eq!(level("4"), Some(4));
        assert_eq!(level("\"4\""), Some(4));
        assert_eq!(level("2.5"), Some(3));
        assert_eq!(level("\" 1.2 \""), Some(1));
        assert_eq!(level("hard"), None);
        assert_eq!(level("true"), None);
        assert_eq!(level("[1, 2]"), None);
        assert_eq!(level("~"), None);
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just markdown\n\nText.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"---

Some text with a list:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(body.contains("Some text"));
        assert!(body.contains("More content here."));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = "---\nSee https://example.com and http://test.com\n---\nMore.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(body.contains("https://example.com"));
    }

    #[test]
    fn test_unclosed_fence_is_body() {
        let content = "---\ntitle: Dangling\n\nNo closing fence.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert!(fm.title.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        assert!(matches!(
            FrontMatter::parse(content),
            Err(ContentError::FrontMatter(_))
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date_string("2023-03-01"), Some(midnight));
        assert_eq!(parse_date_string("2023/03/01"), Some(midnight));
        assert_eq!(
            parse_date_string("2023-03-01 10:30:00").map(|d| d.format("%H:%M").to_string()),
            Some("10:30".to_string())
        );
        assert_eq!(parse_date_string("2023-03-01T08:00:00+08:00"), Some(midnight));
        assert_eq!(parse_date_string("March first"), None);
    }

    #[test]
    fn test_frontmatter_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");
    }
}

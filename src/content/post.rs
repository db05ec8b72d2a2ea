//! Post model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// How demanding a post is, rendered as a run of glyphs in the post meta line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Clamp any integer into `[MIN, MAX]`
    pub fn new(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Repeat `glyph` once per level
    pub fn glyphs(self, glyph: &str) -> String {
        glyph.repeat(self.0 as usize)
    }
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier, the source file stem
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date, the sort key
    pub date: NaiveDateTime,

    /// Free-form reading time label, e.g. "5 min"
    pub read_time: String,

    /// Optional difficulty shown in the meta line
    pub difficulty_level: Option<DifficultyLevel>,

    /// Raw markdown body
    pub raw: String,

    /// Rendered HTML body
    pub content: String,

    /// Source file path
    pub source: PathBuf,

    /// URL path relative to the site root (no leading slash)
    pub path: String,

    /// Whether the post is marked as a draft
    pub draft: bool,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(slug: impl Into<String>, title: impl Into<String>, date: NaiveDateTime) -> Self {
        let slug = slug.into();
        Self {
            source: PathBuf::from(format!("{}.md", slug)),
            slug,
            title: title.into(),
            date,
            read_time: String::new(),
            difficulty_level: None,
            raw: String::new(),
            content: String::new(),
            path: String::new(),
            draft: false,
            extra: HashMap::new(),
        }
    }

    /// Difficulty to render, falling back to `default` when the post sets none
    pub fn difficulty_or(&self, default: u8) -> DifficultyLevel {
        self.difficulty_level
            .unwrap_or_else(|| DifficultyLevel::new(default as i64))
    }
}

//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // Author blurb shown in every post footer
    #[serde(default)]
    pub author: AuthorConfig,

    // URL
    pub url: String,
    pub root: String,
    /// Directory segment posts live under, e.g. `blog` for `/blog/:slug/`
    pub post_dir: String,

    // Directory
    pub posts_dir: String,
    pub static_dir: String,
    pub public_dir: String,

    // Writing
    pub render_drafts: bool,
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Post meta line
    pub glyph: String,
    pub default_difficulty: u8,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Code to Joy".to_string(),
            description: String::new(),
            language: "en".to_string(),

            author: AuthorConfig::default(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),
            post_dir: "blog".to_string(),

            posts_dir: "posts".to_string(),
            static_dir: "public".to_string(),
            public_dir: "out".to_string(),

            render_drafts: false,
            date_format: "%Y-%m-%d".to_string(),
            highlight: HighlightConfig::default(),

            glyph: "\u{2615}".to_string(),
            default_difficulty: 3,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        config.validate()?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Reject values that would only fail later, halfway through a build
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.date_format).any(|item| item == Item::Error) {
            anyhow::bail!("Invalid date_format {:?}", self.date_format);
        }
        if self.posts_dir.trim().is_empty() || self.public_dir.trim().is_empty() {
            anyhow::bail!("posts_dir and public_dir must not be empty");
        }
        // `clean` removes public_dir wholesale
        let public = normalize_dir(&self.public_dir);
        for (name, dir) in [("posts_dir", &self.posts_dir), ("static_dir", &self.static_dir)] {
            if normalize_dir(dir).starts_with(&public) {
                anyhow::bail!(
                    "public_dir {:?} must not be or contain {} {:?}",
                    self.public_dir,
                    name,
                    dir
                );
            }
        }
        Ok(())
    }

    /// Root-relative URL for a site path, e.g. `url_for("blog/hello/")` -> `/blog/hello/`
    pub fn url_for(&self, path: &str) -> String {
        let root = if self.root.ends_with('/') {
            self.root.clone()
        } else {
            format!("{}/", self.root)
        };
        format!("{}{}", root, path.trim_start_matches('/'))
    }

    /// URL path of a post page relative to the site root (no leading slash)
    pub fn post_path(&self, slug: &str) -> String {
        let dir = self.post_dir.trim_matches('/');
        if dir.is_empty() {
            format!("{}/", slug)
        } else {
            format!("{}/{}/", dir, slug)
        }
    }
}

/// `./out/` and `out` name the same directory
fn normalize_dir(dir: &str) -> PathBuf {
    Path::new(dir.trim())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Author blurb configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub link: String,
    pub avatar: String,
    pub tagline: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "Joy Hung".to_string(),
            link: "https://github.com/CodewJoy".to_string(),
            avatar: "/avatar.jpg".to_string(),
            tagline: "Curiosity turns work into play.".to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Name of a bundled syntect theme
    pub theme: String,
    /// Output path of the generated stylesheet, relative to the public dir
    pub stylesheet: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            stylesheet: "css/highlight.css".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Code to Joy");
        assert_eq!(config.author.name, "Joy Hung");
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.default_difficulty, 3);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
root: /sub/
author:
  name: Test User
highlight:
  theme: InspiredGitHub
analytics: G-123
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author.name, "Test User");
        // Unset nested fields keep their defaults
        assert_eq!(config.author.tagline, "Curiosity turns work into play.");
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert_eq!(config.highlight.stylesheet, "css/highlight.css");
        assert!(config.extra.contains_key("analytics"));
    }

    #[test]
    fn test_url_for_and_post_path() {
        let mut config = SiteConfig::default();
        assert_eq!(config.post_path("hello"), "blog/hello/");
        assert_eq!(config.url_for(&config.post_path("hello")), "/blog/hello/");

        config.root = "/sub".to_string();
        config.post_dir = String::new();
        assert_eq!(config.url_for(&config.post_path("hello")), "/sub/hello/");
    }

    #[test]
    fn test_validate() {
        let mut config = SiteConfig::default();
        assert!(config.validate().is_ok());

        config.date_format = "%Y-%Q".to_string();
        assert!(config.validate().is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "public_dir: ''\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }

    #[test]
    fn test_public_dir_must_not_cover_sources() {
        let with_public = |public: &str| SiteConfig {
            public_dir: public.to_string(),
            ..SiteConfig::default()
        };
        assert!(with_public(".").validate().is_err());
        assert!(with_public("./").validate().is_err());
        assert!(with_public("posts").validate().is_err());
        assert!(with_public("./public/").validate().is_err());
        assert!(with_public("site").validate().is_ok());
        assert!(with_public("out/site").validate().is_ok());

        let nested = SiteConfig {
            posts_dir: "out/posts".to_string(),
            ..SiteConfig::default()
        };
        assert!(nested.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SiteConfig::load(dir.path().join("_config.yml")).is_err());
    }
}

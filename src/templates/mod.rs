//! Built-in page templates using the Tera template engine
//!
//! The page shell (blog title, author blurb, post meta line and prev/next
//! links) is embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post bodies are already HTML. Text fields are escaped in the templates
        // with `escape`, URLs and attributes with `escape_xml` so `/` stays intact
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("joy/layout.html")),
            ("macros.html", include_str!("joy/macros.html")),
            ("index.html", include_str!("joy/index.html")),
            ("post.html", include_str!("joy/post.html")),
        ])?;

        tera.register_filter("repeat", repeat_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: repeat a string `count` times, count clamped to 0..=16
fn repeat_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("repeat", "value", String, value);
    let count = match args.get("count") {
        Some(val) => tera::try_get_value!("repeat", "count", usize, val),
        None => 1,
    };
    Ok(tera::Value::String(s.repeat(count.min(16))))
}

// Data structures for template context

/// A post as the templates see it
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub read_time: String,
    pub difficulty: u8,
    pub url: String,
}

impl PostData {
    pub fn from_post(post: &Post, config: &SiteConfig) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: post.date.format(&config.date_format).to_string(),
            read_time: post.read_time.clone(),
            difficulty: post.difficulty_or(config.default_difficulty).get(),
            url: config.url_for(&post.path),
        }
    }
}

/// A prev/next link target
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub slug: String,
    pub title: String,
    pub url: String,
}

impl NavLink {
    pub fn from_post(post: &Post, config: &SiteConfig) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            url: config.url_for(&post.path),
        }
    }
}

//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

const SCAFFOLD: &str = "---
title: {{ title }}
date: {{ date }}
readTime: 5 min
difficultyLevel: 3
---
";

/// Create `posts/<slug>.md` from the post scaffold.
///
/// `slug` defaults to the slugified title. Existing files are never overwritten.
pub fn create_post(blog: &Blog, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    fs::create_dir_all(&blog.posts_dir)?;
    let file_path = blog.posts_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let content = SCAFFOLD
        .replace("{{ title }}", &yaml_quote(title))
        .replace("{{ date }}", &today);

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a title for YAML when it carries characters YAML would interpret
fn yaml_quote(s: &str) -> String {
    let needs_quotes = s.contains(": ")
        || s.contains(" #")
        || s.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c))
        || s.trim() != s;
    if needs_quotes {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

//! Content loader - loads posts from the posts directory

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentError, DifficultyLevel, FrontMatter, MarkdownRenderer, Post};
use crate::navigation;
use crate::Blog;

/// Loads posts from disk and renders their bodies
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        let renderer = MarkdownRenderer::with_theme(&blog.config.highlight.theme);
        Self { blog, renderer }
    }

    /// The renderer used for post bodies
    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    /// Load all posts, in navigation order.
    ///
    /// Posts that fail to parse are logged and skipped. Two files that map to
    /// the same slug abort the load.
    pub fn load_posts(&self) -> Result<Vec<Post>, ContentError> {
        let posts_dir = &self.blog.posts_dir;
        if !posts_dir.exists() {
            tracing::warn!("Posts directory {:?} does not exist", posts_dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for entry in WalkDir::new(posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(posts_dir).to_path_buf();
                ContentError::io(path, e.into())
            })?;
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let post = match self.load_post(path) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", path, e);
                    continue;
                }
            };

            if post.draft && !self.blog.config.render_drafts {
                tracing::debug!("Skipping draft {:?}", path);
                continue;
            }

            if let Some(first) = seen.get(&post.slug) {
                return Err(ContentError::DuplicateSlug {
                    slug: post.slug,
                    first: first.clone(),
                    second: path.to_path_buf(),
                });
            }
            seen.insert(post.slug.clone(), path.to_path_buf());
            posts.push(post);
        }

        posts.sort_by(navigation::compare);
        Ok(posts)
    }

    /// Load a single post from a file
    pub fn load_post(&self, path: &Path) -> Result<Post, ContentError> {
        let content = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let date = match fm.parse_date() {
            Some(date) => date,
            None => {
                tracing::warn!(
                    "Post {:?} has no usable date ({:?}), using file modification time",
                    path,
                    fm.date
                );
                modified_time(path)?
            }
        };

        let mut post = Post::new(slug, fm.title.unwrap_or_default(), date);
        if post.title.is_empty() {
            post.title = post.slug.clone();
        }
        post.read_time = fm.read_time.unwrap_or_default();
        post.difficulty_level = fm.difficulty_level.map(DifficultyLevel::new);
        post.content = self.renderer.render(body)?;
        post.raw = body.to_string();
        post.source = path.to_path_buf();
        post.path = self.blog.config.post_path(&post.slug);
        post.draft = fm.draft;
        post.extra = fm.extra;

        Ok(post)
    }
}

/// File modification time as naive UTC, the same convention front-matter dates use
fn modified_time(path: &Path) -> Result<NaiveDateTime, ContentError> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| ContentError::io(path, e))?;
    Ok(DateTime::<Utc>::from(modified).naive_utc())
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

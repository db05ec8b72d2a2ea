//! Generator module - writes the static site using the built-in templates

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::navigation::{self, resolve_navigation};
use crate::templates::{NavLink, PostData, TemplateRenderer};
use crate::Blog;

/// Every page path the site serves, root-relative with a leading slash.
///
/// The index comes first, then one path per post in navigation order.
pub fn static_paths(posts: &[Post], config: &SiteConfig) -> Vec<String> {
    std::iter::once(config.url_for(""))
        .chain(
            navigation::order_posts(posts)
                .into_iter()
                .map(|p| config.url_for(&p.path)),
        )
        .collect()
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site. `stylesheet` is the CSS for highlighted code.
    pub fn generate(&self, posts: &[Post], stylesheet: &str) -> Result<()> {
        fs::create_dir_all(&self.blog.public_dir)
            .with_context(|| format!("Failed to create {:?}", self.blog.public_dir))?;

        let copied = self.copy_static_assets()?;
        tracing::debug!("Copied {} static files", copied);

        self.write_output(&self.blog.config.highlight.stylesheet, stylesheet)?;

        self.generate_index_page(posts)?;
        self.generate_post_pages(posts)?;

        Ok(())
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert("config", config);
        context.insert("home", &config.url_for(""));
        context.insert("stylesheet", &config.url_for(&config.highlight.stylesheet));
        context
    }

    /// Generate the index page listing every post, newest first
    fn generate_index_page(&self, posts: &[Post]) -> Result<()> {
        let config = &self.blog.config;
        let post_data: Vec<PostData> = navigation::order_posts(posts)
            .into_iter()
            .map(|p| PostData::from_post(p, config))
            .collect();

        let mut context = self.create_base_context();
        context.insert("posts", &post_data);

        let html = self.renderer.render("index.html", &context)?;
        self.write_output("index.html", &html)?;
        tracing::debug!("Generated index with {} posts", post_data.len());

        Ok(())
    }

    /// Generate individual post pages
    fn generate_post_pages(&self, posts: &[Post]) -> Result<()> {
        let config = &self.blog.config;

        for post in posts {
            let nav = resolve_navigation(posts, &post.slug);
            let previous = nav.previous.map(|p| NavLink::from_post(p, config));
            let next = nav.next.map(|p| NavLink::from_post(p, config));

            let mut context = self.create_base_context();
            context.insert("post", &PostData::from_post(post, config));
            context.insert("content", &post.content);
            context.insert("previous", &previous);
            context.insert("next", &next);

            let html = self
                .renderer
                .render("post.html", &context)
                .with_context(|| format!("Failed to render post {}", post.slug))?;

            let output = format!("{}index.html", post.path);
            self.write_output(&output, &html)?;
            tracing::debug!("Generated post: {}", output);
        }

        tracing::info!("Generated {} post pages", posts.len());
        Ok(())
    }

    /// Copy static assets (images, etc.) to the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        Ok(copied)
    }

    /// Write a file below the public directory, creating parents
    fn write_output(&self, relative: &str, contents: &str) -> Result<()> {
        // Strip leading slashes so joins never escape to an absolute path
        let output_path = self.blog.public_dir.join(relative.trim_start_matches('/'));
        write_file(&output_path, contents)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

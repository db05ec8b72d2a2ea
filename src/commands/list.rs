//! List site content

use anyhow::Result;
use serde::Serialize;

use crate::content::loader::ContentLoader;
use crate::generator::static_paths;
use crate::Blog;

/// One row of `list posts --json`
#[derive(Debug, Serialize)]
struct PostSummary<'a> {
    slug: &'a str,
    title: &'a str,
    date: String,
    read_time: &'a str,
    difficulty_level: Option<u8>,
    path: String,
}

/// List site content by type
pub fn run(blog: &Blog, content_type: &str, json: bool) -> Result<()> {
    let output = render(blog, content_type, json)?;
    print!("{}", output);
    Ok(())
}

/// Build the listing text printed by [`run`]
pub fn render(blog: &Blog, content_type: &str, json: bool) -> Result<String> {
    let loader = ContentLoader::new(blog);
    let posts = loader.load_posts()?;
    let config = &blog.config;

    let mut out = String::new();
    match content_type {
        "post" | "posts" => {
            if json {
                let rows: Vec<PostSummary> = posts
                    .iter()
                    .map(|p| PostSummary {
                        slug: &p.slug,
                        title: &p.title,
                        date: p.date.format(&config.date_format).to_string(),
                        read_time: &p.read_time,
                        difficulty_level: p.difficulty_level.map(|d| d.get()),
                        path: config.url_for(&p.path),
                    })
                    .collect();
                out.push_str(&serde_json::to_string_pretty(&rows)?);
                out.push('\n');
            } else {
                out.push_str(&format!("Posts ({}):\n", posts.len()));
                for post in &posts {
                    out.push_str(&format!(
                        "  {} - {} [{}]\n",
                        post.date.format(&config.date_format),
                        post.title,
                        post.slug
                    ));
                }
            }
        }
        "route" | "routes" => {
            let paths = static_paths(&posts, config);
            if json {
                out.push_str(&serde_json::to_string_pretty(&paths)?);
                out.push('\n');
            } else {
                out.push_str(&format!("Routes ({}):\n", paths.len()));
                for path in paths {
                    out.push_str(&format!("  {}\n", path));
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, routes",
                content_type
            );
        }
    }

    Ok(out)
}

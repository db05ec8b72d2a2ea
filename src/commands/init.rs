//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: Code to Joy
description: ''
language: en

author:
  name: Joy Hung
  link: https://github.com/CodewJoy
  avatar: /avatar.jpg
  tagline: Curiosity turns work into play.

# URL
url: http://localhost:4000
root: /
post_dir: blog

# Directory
posts_dir: posts
static_dir: public
public_dir: out

# Writing
render_drafts: false
date_format: '%Y-%m-%d'
highlight:
  theme: base16-ocean.dark
  stylesheet: css/highlight.css

# Post meta line
glyph: "☕"
default_difficulty: 3
"#;

/// Initialize a new blog in the given directory; existing files are kept
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("public"))?;

    write_if_missing(&target_dir.join(CONFIG_FILE), DEFAULT_CONFIG)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
readTime: 1 min
difficultyLevel: 1
---

Welcome to your new blog. Posts live in `posts/`, one Markdown file each;
the file name becomes the URL.

```rust
fn main() {{
    println!("Hello, world!");
}}
```
"#,
        today
    );
    write_if_missing(&target_dir.join("posts/hello-world.md"), &sample_post)?;

    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, contents)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}

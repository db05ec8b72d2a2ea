//! Generate static files

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::Blog;

/// Debounce window for file change events
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Load every post and write the whole site
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let loader = ContentLoader::new(blog);
    let posts = loader.load_posts()?;
    let stylesheet = loader.renderer().stylesheet()?;

    let generator = Generator::new(blog)?;
    generator.generate(&posts, &stylesheet)?;

    tracing::info!(
        "Generated {} posts into {:?} in {:.2}s",
        posts.len(),
        blog.public_dir,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Re-open the blog from disk and generate it, so edits to `_config.yml` apply
pub fn rebuild(base_dir: &Path) -> Result<Blog> {
    let blog = Blog::new(base_dir)?;
    run(&blog)?;
    Ok(blog)
}

/// Paths whose changes should trigger a rebuild
pub fn watched_paths(blog: &Blog) -> Vec<(PathBuf, RecursiveMode)> {
    let mut paths = vec![
        (blog.posts_dir.clone(), RecursiveMode::NonRecursive),
        (blog.static_dir.clone(), RecursiveMode::Recursive),
        (blog.config_path(), RecursiveMode::NonRecursive),
    ];
    paths.retain(|(path, _)| path.exists());
    paths
}

/// Whether a changed path is worth a rebuild (editor swap files and VCS noise are not)
pub fn is_relevant_change(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

/// Watch for file changes and regenerate until the watcher goes away
pub fn watch(blog: &Blog) -> Result<()> {
    watch_with(blog, || {})
}

/// Like [`watch`], calling `on_rebuild` after every successful regeneration
pub fn watch_with(blog: &Blog, mut on_rebuild: impl FnMut()) -> Result<()> {
    let (tx, rx) = channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    for (path, mode) in watched_paths(blog) {
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant_change(&e.path))
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match rebuild(&blog.base_dir) {
                    Ok(rebuilt) => {
                        if watched_paths(&rebuilt) != watched_paths(blog) {
                            tracing::warn!(
                                "Watched directories changed; restart to watch the new ones"
                            );
                        }
                        on_rebuild();
                    }
                    Err(e) => tracing::error!("Generation failed: {:#}", e),
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;

    #[test]
    fn test_run_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(&blog.posts_dir).unwrap();
        fs::write(
            blog.posts_dir.join("first.md"),
            "---\ntitle: First\ndate: 2023-01-01\n---\n```rust\nfn main() {}\n```\n",
        )
        .unwrap();

        run(&blog).unwrap();

        let page = fs::read_to_string(blog.public_dir.join("blog/first/index.html")).unwrap();
        assert!(page.contains("language-rust"));
        let css = fs::read_to_string(blog.public_dir.join("css/highlight.css")).unwrap();
        assert!(!css.is_empty());
    }

    #[test]
    fn test_rebuild_reads_current_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(crate::CONFIG_FILE);
        fs::write(&config_path, "title: First Title\n").unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        run(&blog).unwrap();
        let index = fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(index.contains("First Title"));

        fs::write(&config_path, "title: Second Title\n").unwrap();
        let rebuilt = rebuild(&blog.base_dir).unwrap();
        assert_eq!(rebuilt.config.title, "Second Title");
        let index = fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(index.contains("Second Title"));

        fs::write(&config_path, "date_format: \"%Q\"\n").unwrap();
        assert!(rebuild(&blog.base_dir).is_err());
    }

    #[test]
    fn test_relevant_changes() {
        assert!(is_relevant_change(Path::new("posts/hello.md")));
        assert!(!is_relevant_change(Path::new("posts/.hello.md.swp")));
        assert!(!is_relevant_change(Path::new("posts/hello.md~")));
        assert!(!is_relevant_change(Path::new(".git/index")));
    }

    #[test]
    fn test_watched_paths_skip_missing() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        assert!(watched_paths(&blog).is_empty());

        fs::create_dir_all(&blog.posts_dir).unwrap();
        let paths = watched_paths(&blog);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].0, blog.posts_dir);
    }
}

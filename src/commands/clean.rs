//! Clean the output directory

use anyhow::Result;
use std::fs;

use crate::Blog;

/// Remove the generated site
pub fn run(blog: &Blog) -> Result<()> {
    if blog.public_dir.exists() {
        fs::remove_dir_all(&blog.public_dir)?;
        tracing::info!("Deleted: {:?}", blog.public_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", blog.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean_removes_output_only() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(blog.public_dir.join("blog/x")).unwrap();
        fs::create_dir_all(&blog.posts_dir).unwrap();

        run(&blog).unwrap();
        assert!(!blog.public_dir.exists());
        assert!(blog.posts_dir.exists());

        // Cleaning twice is fine
        run(&blog).unwrap();
    }
}

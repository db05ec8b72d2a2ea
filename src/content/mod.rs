//! Content module - posts, front-matter and markdown rendering

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use error::ContentError;
pub use frontmatter::{parse_date_string, FrontMatter};
pub use markdown::MarkdownRenderer;
pub use post::{DifficultyLevel, Post};

//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::ContentError;

const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a named highlight theme
    pub fn with_theme(theme: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme) {
            Some(found) => found,
            None => {
                tracing::warn!("Unknown highlight theme {:?}, using base16-ocean.dark", theme);
                themes.remove("base16-ocean.dark").unwrap_or_default()
            }
        };
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String, ContentError> {
        // Front-matter is split off before we get here, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block; lang may be empty
        let mut code_block: Option<String> = None;
        let mut code = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some(match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info).to_string(),
                        CodeBlockKind::Indented => String::new(),
                    });
                    code.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().unwrap_or_default();
                    let highlighted = self.highlight_code(&code, &lang)?;
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => code.push_str(&text),
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }

    /// Highlight a code block into `<pre><code class="hljs language-..">`
    fn highlight_code(&self, code: &str, lang: &str) -> Result<String, ContentError> {
        let syntax = if lang.is_empty() {
            None
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
        };
        let (syntax, label) = match syntax {
            Some(syntax) => (syntax, html_escape(lang)),
            None => (
                self.syntax_set.find_syntax_plain_text(),
                "plaintext".to_string(),
            ),
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(format!(
            "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
            label,
            generator.finalize()
        ))
    }

    /// CSS for the configured theme, matching the classes `render` emits
    pub fn stylesheet(&self) -> Result<String, ContentError> {
        Ok(css_for_theme_with_class_style(&self.theme, CLASS_STYLE)?)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// First word of a fence info string: "rust,ignore" and "rust title=x" -> "rust"
fn fence_language(info: &str) -> &str {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or("")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

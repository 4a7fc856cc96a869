//! Markdown helpers for article sources
//!
//! Titles come from the first top-level heading (`# ...`). Ghost renders the post title
//! itself, so that heading is removed from the body before HTML rendering.

use pulldown_cmark::{html, Options, Parser};

pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_KEYWORD_CHARS: usize = 80;

fn heading_text<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let line = line.trim_end_matches('\r');
    line.strip_prefix(marker)
        .map(str::trim_end)
        .filter(|text| !text.is_empty())
}

/// First `# ` heading in the document, or `"Untitled"`.
pub fn extract_title(markdown: &str) -> String {
    markdown
        .lines()
        .find_map(|line| heading_text(line, "# "))
        .unwrap_or(UNTITLED)
        .to_string()
}

/// Drop the first top-level heading line and trim the remainder.
pub fn strip_title_heading(markdown: &str) -> String {
    let mut removed = false;
    let body: Vec<&str> = markdown
        .lines()
        .filter(|line| {
            if !removed && line.trim().starts_with("# ") {
                removed = true;
                return false;
            }
            true
        })
        .collect();

    body.join("\n").trim().to_string()
}

/// Render markdown to HTML (CommonMark plus tables, strikethrough and footnotes).
pub fn render_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Body HTML for a post: title heading removed, rest rendered.
pub fn render_post_body(markdown: &str) -> String {
    render_html(&strip_title_heading(markdown))
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Short text for a title card.
///
/// Prefers the H1 (ellipsised past `max_chars`), then the first H2, then the first
/// non-empty line without heading markers, then `"Blog Post"`.
pub fn extract_keywords(markdown: &str, max_chars: usize) -> String {
    if let Some(h1) = markdown.lines().find_map(|line| heading_text(line, "# ")) {
        if h1.chars().count() <= max_chars {
            return h1.to_string();
        }
        return format!("{}...", truncate_chars(h1, max_chars.saturating_sub(3)));
    }

    if let Some(h2) = markdown.lines().find_map(|line| heading_text(line, "## ")) {
        return truncate_chars(h2, max_chars);
    }

    if let Some(first) = markdown.lines().map(str::trim).find(|line| !line.is_empty()) {
        let stripped = first.trim_start_matches('#').trim_start();
        return truncate_chars(stripped, max_chars);
    }

    "Blog Post".to_string()
}

// File naming helpers for the output directory

use chrono::{Local, NaiveDateTime};

const MAX_SLUG_CHARS: usize = 50;

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || ('가'..='힣').contains(&c) || c == '-'
}

/// Convert a title into a short, filename-safe slug.
///
/// Lowercases, drops everything except `a-z`, `0-9`, Hangul syllables, whitespace and
/// hyphens, turns whitespace runs into a single hyphen, keeps at most 50 characters and
/// trims trailing hyphens.
pub fn title_to_slug(title: &str) -> String {
    let lowered = title.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
        } else if is_slug_char(c) {
            slug.push(c);
            in_space = false;
        }
    }

    let truncated: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Local wall-clock timestamp at second precision: `YYYYMMDD-HHMMSS`.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `<kind>-<slug>-<YYYYMMDD-HHMMSS>.<ext>`
pub fn generate_filename(kind: &str, title: &str, extension: &str, at: NaiveDateTime) -> String {
    format!(
        "{}-{}-{}.{}",
        kind,
        title_to_slug(title),
        format_timestamp(at),
        extension
    )
}

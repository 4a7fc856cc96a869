//! Title-card thumbnail renderer
//!
//! Draws white, centred, word-wrapped text on a black canvas sized for Ghost feature
//! images (2000x1200 by default) and writes it as PNG.
//!
//! Font loading and rasterisation run on `spawn_blocking` to keep the async runtime free.
//! A font is only used when it has a glyph for every character of the card text.

use ab_glyph::{Font, FontVec, PxScale};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::error::{PublishError, Result};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FOREGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_WIDTH_RATIO: f32 = 0.85;
const LINE_HEIGHT_RATIO: f32 = 1.3;

/// Fallback fonts tried in order when no font path is configured.
/// Korean-capable faces first, then a Latin-only fallback.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Bold.ttc",
    "/usr/share/fonts/truetype/noto/NotoSansKR-Bold.ttf",
    "/usr/share/fonts/truetype/nanum/NanumGothicBold.ttf",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/Library/Fonts/Pretendard-Bold.otf",
    "C:\\Windows\\Fonts\\malgunbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
];

/// Configuration for thumbnail rendering
#[derive(Clone, Debug)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub height: u32,
    pub font_size: f32,
    pub font_path: Option<PathBuf>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1200,
            font_size: 120.0,
            font_path: None,
        }
    }
}

impl From<&Config> for ThumbnailConfig {
    fn from(config: &Config) -> Self {
        Self {
            width: config.thumbnail_width,
            height: config.thumbnail_height,
            font_size: config.thumbnail_font_size,
            font_path: config.thumbnail_font_path.clone(),
        }
    }
}

pub struct ThumbnailRenderer {
    config: ThumbnailConfig,
    font: FontVec,
}

impl std::fmt::Debug for ThumbnailRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailRenderer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ThumbnailRenderer {
    /// Load a font able to draw every character of `text`.
    ///
    /// A configured font must cover the text. Otherwise the system candidates are tried
    /// in order and the first one with full coverage wins. Reads font files synchronously.
    pub fn for_text(config: ThumbnailConfig, text: &str) -> Result<Self> {
        if let Some(path) = config.font_path.clone() {
            if !path.is_file() {
                return Err(PublishError::Thumbnail(format!(
                    "THUMBNAIL_FONT_PATH does not exist: {}",
                    path.display()
                )));
            }

            let font = load_font(&path)?;
            if let Some(c) = missing_glyph(&font, text) {
                return Err(PublishError::Thumbnail(format!(
                    "Font {} has no glyph for '{c}'",
                    path.display()
                )));
            }
            debug!(font = %path.display(), "Loaded thumbnail font");
            return Ok(Self { config, font });
        }

        for path in SYSTEM_FONT_CANDIDATES.iter().map(Path::new).filter(|p| p.is_file()) {
            match load_font(path) {
                Ok(font) => match missing_glyph(&font, text) {
                    None => {
                        debug!(font = %path.display(), "Loaded thumbnail font");
                        return Ok(Self { config, font });
                    }
                    Some(c) => debug!(
                        font = %path.display(),
                        missing = %c,
                        "Font lacks glyphs for card text"
                    ),
                },
                Err(e) => debug!(font = %path.display(), "Skipping font: {}", e),
            }
        }

        Err(PublishError::Thumbnail(
            "No installed font covers the card text; set THUMBNAIL_FONT_PATH to a .ttf/.otf/.ttc \
             file with the needed glyphs"
                .to_string(),
        ))
    }

    pub fn with_font_bytes(config: ThumbnailConfig, bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| PublishError::Thumbnail(format!("Invalid font data: {e}")))?;
        Ok(Self { config, font })
    }

    /// Rasterise `text` onto a fresh canvas.
    pub fn render(&self, text: &str) -> RgbaImage {
        let ThumbnailConfig {
            width,
            height,
            font_size,
            ..
        } = self.config;
        let scale = PxScale::from(font_size);
        let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

        let max_width = (width as f32 * TEXT_WIDTH_RATIO) as u32;
        let lines = wrap_words(text, max_width, |candidate| {
            text_size(scale, &self.font, candidate).0
        });

        let line_height = font_size * LINE_HEIGHT_RATIO;
        let block_height = lines.len() as f32 * line_height;
        let top = (height as f32 - block_height) / 2.0;

        for (i, line) in lines.iter().enumerate() {
            let (line_width, _) = text_size(scale, &self.font, line);
            let x = (width as i32 - line_width as i32) / 2;
            let y = top + i as f32 * line_height + (line_height - font_size) / 2.0;
            draw_text_mut(
                &mut canvas,
                FOREGROUND,
                x,
                y.round() as i32,
                scale,
                &self.font,
                line,
            );
        }

        debug!(lines = lines.len(), width, height, "Thumbnail rendered");
        canvas
    }

    pub fn render_to_file(&self, text: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        self.render(text)
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| {
                PublishError::Thumbnail(format!("Failed to write {}: {e}", path.display()))
            })
    }
}

/// Pick a font for `text` and write the card to `path`, all on the blocking thread pool.
pub async fn render_card(config: ThumbnailConfig, text: String, path: PathBuf) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || {
        let renderer = ThumbnailRenderer::for_text(config, &text)?;
        renderer.render_to_file(&text, &path)?;
        Ok(path)
    })
    .await
    .map_err(|e| PublishError::Thumbnail(format!("Thumbnail task panicked: {e}")))?
}

fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path).map_err(|e| {
        PublishError::Thumbnail(format!("Failed to read font {}: {e}", path.display()))
    })?;
    FontVec::try_from_vec(bytes).map_err(|e| {
        PublishError::Thumbnail(format!("Invalid font data in {}: {e}", path.display()))
    })
}

/// First non-whitespace character of `text` the font has no glyph for.
pub fn missing_glyph<F: Font>(font: &F, text: &str) -> Option<char> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .find(|&c| font.glyph_id(c).0 == 0)
}

/// Greedy word wrap: a word moves to the next line once the line would exceed
/// `max_width`. A single word wider than `max_width` gets a line of its own.
pub fn wrap_words<F>(text: &str, max_width: u32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

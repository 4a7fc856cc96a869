//! Publish pipeline and thumbnail update flow
//!
//! Publish runs as an ordered sequence of fallible steps:
//!
//! `Idle -> FilesRead -> TitleExtracted -> ArchivalWritten -> [ThumbnailReady]
//!  -> [AssetUploaded] -> Published -> Done`
//!
//! Any unrecovered error moves the run to `Failed` and short-circuits the rest. There is
//! no resumption and no rollback: an asset uploaded before a failed create stays on the
//! platform.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{PublishError, Result};
use crate::models::{NewPost, Post, PostStatus};
use crate::services::ghost_client::GhostClient;
use crate::services::markdown::{
    extract_keywords, extract_title, render_post_body, DEFAULT_KEYWORD_CHARS,
};
use crate::services::posts::PostPublisher;
use crate::services::thumbnail::{render_card, ThumbnailConfig};
use crate::services::uploader::ImageUploader;
use crate::services::workspace::{ArchivedCopies, ArticleSources, Workspace};
use crate::utils::{generate_filename, local_now};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    FilesRead,
    TitleExtracted,
    ArchivalWritten,
    ThumbnailReady,
    AssetUploaded,
    Published,
    Done,
    Failed,
}

/// Where the feature image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// Render a title card from the translation; failure is a warning, not an error.
    Generate,
    /// Upload an existing image file.
    Existing(PathBuf),
    /// Publish without a feature image.
    Skip,
}

#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub thumbnail: ThumbnailSource,
    pub status: PostStatus,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            thumbnail: ThumbnailSource::Generate,
            status: PostStatus::Published,
        }
    }
}

/// Original and translation disagree on their title. Data-quality signal only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMismatch {
    pub original: String,
    pub translation: String,
}

#[derive(Debug, Clone)]
pub struct PublishReport {
    pub post: Post,
    /// Extracted title, without the configured prefix.
    pub title: String,
    pub feature_image: Option<String>,
    pub thumbnail: Option<PathBuf>,
    pub archived: ArchivedCopies,
    pub title_mismatch: Option<TitleMismatch>,
}

/// Pick the title to publish under: the translation's, warning when the original differs.
pub fn resolve_title(sources: &ArticleSources) -> (String, Option<TitleMismatch>) {
    let translation = extract_title(&sources.translation);
    let original = extract_title(&sources.original);

    if translation == original {
        return (translation, None);
    }

    warn!(
        original = %original,
        translation = %translation,
        "Title mismatch between original and translation; using translation title"
    );
    let mismatch = TitleMismatch {
        original,
        translation: translation.clone(),
    };
    (translation, Some(mismatch))
}

/// Render a title card for `markdown` into `output_dir`.
///
/// The card text is `text` when given, else keywords taken from the markdown. The file
/// name is derived from `name_hint` (or the card text) plus the current local time.
pub async fn render_thumbnail(
    config: &Config,
    markdown: &str,
    text: Option<&str>,
    name_hint: Option<&str>,
) -> Result<PathBuf> {
    let text = text
        .map(str::to_string)
        .unwrap_or_else(|| extract_keywords(markdown, DEFAULT_KEYWORD_CHARS));
    let file_name = generate_filename("thumbnail", name_hint.unwrap_or(&text), "png", local_now());
    let path = config.output_dir.join(file_name);

    info!(text = %text, path = %path.display(), "Rendering thumbnail");
    render_card(ThumbnailConfig::from(config), text, path).await
}

async fn ensure_image_exists(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(PublishError::usage(format!(
            "Thumbnail is not a regular file: {}",
            path.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PublishError::usage(format!(
            "Thumbnail file not found: {}",
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}

pub struct PublishPipeline {
    config: Config,
    workspace: Workspace,
    uploader: ImageUploader,
    publisher: PostPublisher,
    history: Vec<PipelineStage>,
}

impl PublishPipeline {
    /// Fails before any I/O when the admin key is missing or malformed.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(GhostClient::new(config)?);
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &Config, client: Arc<GhostClient>) -> Self {
        Self {
            config: config.clone(),
            workspace: Workspace::new(&config.output_dir),
            uploader: ImageUploader::new(Arc::clone(&client)),
            publisher: PostPublisher::new(client),
            history: vec![PipelineStage::Idle],
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineStage::Idle)
    }

    /// Every stage the run has passed through, starting at `Idle`.
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    fn advance(&mut self, stage: PipelineStage) {
        info!(from = ?self.stage(), to = ?stage, "Pipeline stage");
        self.history.push(stage);
    }

    pub async fn run(&mut self, options: &PublishOptions) -> Result<PublishReport> {
        if self.stage() != PipelineStage::Idle {
            return Err(PublishError::usage(
                "pipeline already ran; start a new run from Idle",
            ));
        }

        match self.execute(options).await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(stage = ?self.stage(), "Publish failed: {}", e);
                self.advance(PipelineStage::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self, options: &PublishOptions) -> Result<PublishReport> {
        if let ThumbnailSource::Existing(path) = &options.thumbnail {
            ensure_image_exists(path).await?;
        }

        let sources = self.workspace.read_sources().await?;
        self.advance(PipelineStage::FilesRead);

        let (title, title_mismatch) = resolve_title(&sources);
        self.advance(PipelineStage::TitleExtracted);

        let archived = self.workspace.archive(&sources, &title, local_now()).await?;
        self.advance(PipelineStage::ArchivalWritten);

        let thumbnail = self
            .prepare_thumbnail(&options.thumbnail, &sources.translation, &title)
            .await;
        if thumbnail.is_some() {
            self.advance(PipelineStage::ThumbnailReady);
        }

        let feature_image = match &thumbnail {
            Some(path) => {
                let url = self.uploader.upload(path).await?;
                self.advance(PipelineStage::AssetUploaded);
                Some(url)
            }
            None => None,
        };

        let post = self
            .publisher
            .create(NewPost {
                title: format!("{}{}", self.config.title_prefix, title),
                html: render_post_body(&sources.translation),
                status: options.status,
                feature_image: feature_image.clone(),
            })
            .await?;
        self.advance(PipelineStage::Published);

        self.advance(PipelineStage::Done);
        Ok(PublishReport {
            post,
            title,
            feature_image,
            thumbnail,
            archived,
            title_mismatch,
        })
    }

    /// Thumbnail to upload, if any. Generation problems are logged and skipped so the
    /// post still goes out without a feature image.
    async fn prepare_thumbnail(
        &self,
        source: &ThumbnailSource,
        translation: &str,
        title: &str,
    ) -> Option<PathBuf> {
        match source {
            ThumbnailSource::Skip => None,
            ThumbnailSource::Existing(path) => Some(path.clone()),
            ThumbnailSource::Generate => {
                match render_thumbnail(&self.config, translation, None, Some(title)).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(
                            "Thumbnail generation failed, publishing without feature image: {}",
                            e
                        );
                        None
                    }
                }
            }
        }
    }
}

/// How the post to update is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    Id(String),
    /// Exact title match. Renamed posts are not found.
    Title(String),
}

#[derive(Debug, Clone)]
pub struct ThumbnailUpdateReport {
    pub post: Post,
    pub previous_feature_image: Option<String>,
    pub image_url: String,
}

/// Replace the feature image of an existing post.
///
/// Order is fixed: read the post (for `updated_at`), upload the image, write the post.
pub struct ThumbnailUpdater {
    uploader: ImageUploader,
    publisher: PostPublisher,
}

impl ThumbnailUpdater {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(Arc::new(GhostClient::new(config)?)))
    }

    pub fn with_client(client: Arc<GhostClient>) -> Self {
        Self {
            uploader: ImageUploader::new(Arc::clone(&client)),
            publisher: PostPublisher::new(client),
        }
    }

    pub async fn run(&self, target: &PostRef, image: &Path) -> Result<ThumbnailUpdateReport> {
        ensure_image_exists(image).await?;

        let current = match target {
            PostRef::Id(id) => self.publisher.get(id).await?,
            PostRef::Title(title) => self.publisher.find_by_title(title).await?,
        };
        info!(
            post_id = %current.id,
            title = %current.title,
            current_feature_image = current.feature_image.as_deref().unwrap_or("none"),
            "Found post"
        );

        let image_url = self.uploader.upload(image).await?;
        let post = self.publisher.put_feature_image(&current, &image_url).await?;

        Ok(ThumbnailUpdateReport {
            post,
            previous_feature_image: current.feature_image,
            image_url,
        })
    }
}

//! Local output directory
//!
//! Layout:
//! - `original.md`, `translation.md`: current article sources (first `# ` line is the title)
//! - `thumbnail-*.png`: generated title cards
//! - `.workflow.json`: run metadata written by `prepare`
//! - `<kind>-<slug>-<YYYYMMDD-HHMMSS>.<ext>`: archival copies
//! - `_backup-<kind>-<YYYYMMDD-HHMMSS>.<ext>`: sources moved aside by `clean`

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{PublishError, Result};
use crate::models::WorkflowRecord;
use crate::utils::{format_timestamp, generate_filename};

pub const ORIGINAL_FILE: &str = "original.md";
pub const TRANSLATION_FILE: &str = "translation.md";
pub const LATEST_THUMBNAIL_FILE: &str = "thumbnail-latest.png";
pub const WORKFLOW_FILE: &str = ".workflow.json";

/// Original-language and translated markdown for one article.
#[derive(Debug, Clone)]
pub struct ArticleSources {
    pub original: String,
    pub translation: String,
}

#[derive(Debug, Clone)]
pub struct ArchivedCopies {
    pub original: PathBuf,
    pub translation: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    output_dir: PathBuf,
}

impl Workspace {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Read both sources. A missing file is a usage error raised before any network I/O.
    pub async fn read_sources(&self) -> Result<ArticleSources> {
        let original = self.read_required(ORIGINAL_FILE).await?;
        let translation = self.read_required(TRANSLATION_FILE).await?;
        Ok(ArticleSources {
            original,
            translation,
        })
    }

    pub async fn read_translation(&self) -> Result<String> {
        self.read_required(TRANSLATION_FILE).await
    }

    async fn read_required(&self, file_name: &str) -> Result<String> {
        let path = self.path(file_name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PublishError::usage(
                format!(
                    "{} not found. Extract and translate the article first.",
                    path.display()
                ),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Write timestamped copies of both sources, named after `title`.
    ///
    /// Any write failure aborts the run.
    pub async fn archive(
        &self,
        sources: &ArticleSources,
        title: &str,
        at: NaiveDateTime,
    ) -> Result<ArchivedCopies> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let original = self.path(&generate_filename("original", title, "md", at));
        let translation = self.path(&generate_filename("translation", title, "md", at));

        tokio::fs::write(&original, &sources.original).await?;
        tokio::fs::write(&translation, &sources.translation).await?;

        info!(
            original = %original.display(),
            translation = %translation.display(),
            "Archived article sources"
        );

        Ok(ArchivedCopies {
            original,
            translation,
        })
    }

    /// Move the current sources and latest thumbnail aside so a new article can start.
    /// Returns the backup paths that were created.
    pub async fn clean(&self, at: NaiveDateTime) -> Result<Vec<PathBuf>> {
        if !tokio::fs::try_exists(&self.output_dir).await? {
            tokio::fs::create_dir_all(&self.output_dir).await?;
            info!(dir = %self.output_dir.display(), "Created output directory");
            return Ok(Vec::new());
        }

        let timestamp = format_timestamp(at);
        let mut moved = Vec::new();

        for (file_name, kind, ext) in [
            (ORIGINAL_FILE, "original", "md"),
            (TRANSLATION_FILE, "translation", "md"),
            (LATEST_THUMBNAIL_FILE, "thumbnail", "png"),
        ] {
            let current = self.path(file_name);
            if !tokio::fs::try_exists(&current).await? {
                continue;
            }

            let backup = self.path(&format!("_backup-{kind}-{timestamp}.{ext}"));
            tokio::fs::rename(&current, &backup).await?;
            debug!(from = %current.display(), to = %backup.display(), "Backed up");
            moved.push(backup);
        }

        Ok(moved)
    }

    pub async fn write_workflow(&self, record: &WorkflowRecord) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.path(WORKFLOW_FILE);
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }

    /// Best-effort read: a missing or unparsable record yields `None`.
    pub async fn read_workflow(&self) -> Option<WorkflowRecord> {
        let raw = tokio::fs::read_to_string(self.path(WORKFLOW_FILE)).await.ok()?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Ignoring unreadable workflow record: {}", e);
                None
            }
        }
    }
}

//! Command-line interface handling
//!
//! Separates argument parsing and operator-facing output from the library services.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::models::{PostStatus, TranslationModel, WorkflowRecord};
use crate::services::git::{commit_message, GitCommitter};
use crate::services::markdown::extract_title;
use crate::services::pipeline::{
    render_thumbnail, PostRef, PublishOptions, PublishPipeline, PublishReport, ThumbnailSource,
    ThumbnailUpdateReport, ThumbnailUpdater,
};
use crate::services::workspace::{Workspace, ORIGINAL_FILE, TRANSLATION_FILE};
use crate::utils::local_now;

#[derive(Debug, Parser)]
#[command(
    name = "blog-publisher",
    version,
    about = "Publish translated articles and thumbnails to a Ghost blog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Move previous sources aside and record run metadata for a new article
    Prepare {
        /// URL of the article to translate
        url: String,
        /// Model the translation step should use
        #[arg(long, value_enum, default_value_t = TranslationModel::Haiku)]
        model: TranslationModel,
    },

    /// Render a title-card thumbnail from translation.md
    Thumbnail {
        /// Card text (defaults to the translation's title)
        #[arg(long)]
        text: Option<String>,
    },

    /// Archive sources, upload a thumbnail and create the post
    Publish {
        /// Upload this image instead of rendering one
        #[arg(long, conflicts_with = "no_thumbnail")]
        thumbnail: Option<PathBuf>,
        /// Publish without a feature image
        #[arg(long)]
        no_thumbnail: bool,
        /// Create the post as a draft
        #[arg(long)]
        draft: bool,
        /// Commit (and push) the output directory afterwards
        #[arg(long)]
        commit: bool,
        /// With --commit, skip the push
        #[arg(long, requires = "commit")]
        no_push: bool,
    },

    /// Replace the feature image of a post identified by id
    UpdateThumbnail {
        /// Ghost post id, e.g. 6952658df6f30a000125b469
        post_id: String,
        /// Image to upload, e.g. output/thumbnail-latest.png
        thumbnail_path: PathBuf,
    },

    /// Replace the feature image of a post identified by its exact title
    UpdateThumbnailByTitle {
        title: String,
        thumbnail_path: PathBuf,
    },

    /// Commit the output directory and push to origin
    Commit {
        #[arg(long, short)]
        message: Option<String>,
        #[arg(long)]
        no_push: bool,
    },
}

impl Command {
    fn publish_options(
        thumbnail: Option<PathBuf>,
        no_thumbnail: bool,
        draft: bool,
    ) -> PublishOptions {
        let thumbnail = match (thumbnail, no_thumbnail) {
            (_, true) => ThumbnailSource::Skip,
            (Some(path), false) => ThumbnailSource::Existing(path),
            (None, false) => ThumbnailSource::Generate,
        };
        PublishOptions {
            thumbnail,
            status: if draft {
                PostStatus::Draft
            } else {
                PostStatus::Published
            },
        }
    }
}

pub async fn execute(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Prepare { url, model } => prepare(config, url, model).await,
        Command::Thumbnail { text } => thumbnail(config, text).await,
        Command::Publish {
            thumbnail,
            no_thumbnail,
            draft,
            commit,
            no_push,
        } => {
            let options = Command::publish_options(thumbnail, no_thumbnail, draft);
            let mut pipeline = PublishPipeline::new(config)?;
            let report = pipeline.run(&options).await?;
            print_publish_report(&report);

            if commit {
                commit_output(config, None, !no_push).await?;
            }
            Ok(())
        }
        Command::UpdateThumbnail {
            post_id,
            thumbnail_path,
        } => update_thumbnail(config, PostRef::Id(post_id), thumbnail_path).await,
        Command::UpdateThumbnailByTitle {
            title,
            thumbnail_path,
        } => update_thumbnail(config, PostRef::Title(title), thumbnail_path).await,
        Command::Commit { message, no_push } => commit_output(config, message, !no_push).await,
    }
}

async fn prepare(config: &Config, url: String, model: TranslationModel) -> Result<()> {
    let workspace = Workspace::new(&config.output_dir);

    let moved = workspace.clean(local_now()).await?;
    for path in &moved {
        println!("✓ Backed up → {}", path.display());
    }

    let record = WorkflowRecord::new(url, model);
    let path = workspace.write_workflow(&record).await?;

    let original = workspace.path(ORIGINAL_FILE);
    let translation = workspace.path(TRANSLATION_FILE);

    println!("Original URL: {}", record.original_url);
    println!("Model: {} ({} per article)", record.model_name, record.estimated_cost);
    println!();
    println!("Next steps:");
    println!("  1. Extract {} into {}", record.original_url, original.display());
    println!(
        "  2. Translate with {} into {}",
        record.model_name,
        translation.display()
    );
    println!("  3. blog-publisher publish --commit");
    println!();
    println!("✓ Workflow info saved to {}", path.display());
    Ok(())
}

async fn thumbnail(config: &Config, text: Option<String>) -> Result<()> {
    let workspace = Workspace::new(&config.output_dir);
    let translation = workspace.read_translation().await?;

    let path = render_thumbnail(config, &translation, text.as_deref(), None).await?;

    println!("✓ Thumbnail generated: {}", path.display());
    println!(
        "  Size: {}x{}px",
        config.thumbnail_width, config.thumbnail_height
    );
    Ok(())
}

async fn update_thumbnail(config: &Config, target: PostRef, image: PathBuf) -> Result<()> {
    let updater = ThumbnailUpdater::new(config)?;
    let report = updater.run(&target, &image).await?;
    print_update_report(&report);
    Ok(())
}

/// Commit the output directory. The default message names the original article's title.
async fn commit_output(config: &Config, message: Option<String>, push: bool) -> Result<()> {
    let workspace = Workspace::new(&config.output_dir);

    let message = match message {
        Some(message) => message,
        None => {
            let title = tokio::fs::read_to_string(workspace.path(ORIGINAL_FILE))
                .await
                .ok()
                .map(|md| extract_title(&md));
            let record = workspace.read_workflow().await;
            commit_message(title.as_deref(), record.as_ref())
        }
    };

    let outcome = GitCommitter::for_output_dir(&config.output_dir)
        .commit_and_push(&message, push)
        .await?;

    if outcome.committed {
        println!("✓ Committed: {}", message.lines().next().unwrap_or_default());
    } else {
        println!("Nothing committed (files may be unchanged)");
    }
    if let Some(branch) = outcome.pushed_branch {
        println!("✓ Pushed to origin/{branch}");
    }
    Ok(())
}

fn print_publish_report(report: &PublishReport) {
    if let Some(mismatch) = &report.title_mismatch {
        eprintln!("⚠️  Warning: Title mismatch detected!");
        eprintln!("  Original: {}", mismatch.original);
        eprintln!("  Translation: {}", mismatch.translation);
        eprintln!("  Using translation title for publishing.");
    }

    println!("✓ Saved timestamped files:");
    println!("  {}", report.archived.original.display());
    println!("  {}", report.archived.translation.display());
    if let Some(path) = &report.thumbnail {
        println!("✓ Thumbnail: {}", path.display());
    }

    let post = &report.post;
    println!("✓ Published successfully!");
    println!("  Post ID: {}", post.id);
    println!("  URL: {}", post.url.as_deref().unwrap_or("-"));
    println!("  Status: {}", post.status.as_deref().unwrap_or("-"));
    if let Some(image) = &report.feature_image {
        println!("  Feature Image: {image}");
    }
}

fn print_update_report(report: &ThumbnailUpdateReport) {
    let post = &report.post;
    println!("✓ Post updated successfully!");
    println!("  Title: {}", post.title);
    println!("  URL: {}", post.url.as_deref().unwrap_or("-"));
    println!(
        "  Previous Feature Image: {}",
        report.previous_feature_image.as_deref().unwrap_or("none")
    );
    println!(
        "  Feature Image: {}",
        post.feature_image.as_deref().unwrap_or(&report.image_url)
    );
}

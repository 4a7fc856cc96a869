pub mod auth;
pub mod ghost_client;
pub mod git;
pub mod markdown;
pub mod pipeline;
pub mod posts;
pub mod thumbnail;
pub mod uploader;
pub mod workspace;

pub use auth::{AdminKey, TokenSigner};
pub use ghost_client::{GhostClient, RequestBody};
pub use git::GitCommitter;
pub use pipeline::{
    PipelineStage, PostRef, PublishOptions, PublishPipeline, PublishReport, ThumbnailSource,
    ThumbnailUpdateReport, ThumbnailUpdater,
};
pub use posts::PostPublisher;
pub use thumbnail::{render_card, ThumbnailRenderer};
pub use uploader::ImageUploader;
pub use workspace::Workspace;

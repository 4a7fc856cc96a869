pub mod post;
pub mod workflow;

pub use post::{
    FeatureImageUpdate, ImagesEnvelope, NewPost, Post, PostStatus, PostsEnvelope, UploadedImage,
};
pub use workflow::{TranslationModel, WorkflowRecord};

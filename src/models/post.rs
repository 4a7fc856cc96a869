use serde::{Deserialize, Serialize};

/// Ghost wraps every resource in a plural collection key: `{"posts": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsEnvelope<T> {
    pub posts: Vec<T>,
}

impl<T> PostsEnvelope<T> {
    pub fn single(post: T) -> Self {
        Self { posts: vec![post] }
    }

    pub fn into_first(self) -> Option<T> {
        self.posts.into_iter().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "draft"),
            PostStatus::Published => write!(f, "published"),
        }
    }
}

/// A post as returned by the Admin API. Only the fields this tool reads are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub feature_image: Option<String>,
    /// Optimistic concurrency token. Kept as the exact string the server sent so it
    /// can be echoed back unchanged on update.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of a create call (`POST /posts/?source=html`).
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub html: String,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_image: Option<String>,
}

/// Body of the feature-image update (`PUT /posts/{id}/`).
#[derive(Debug, Clone, Serialize)]
pub struct FeatureImageUpdate {
    pub feature_image: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesEnvelope {
    pub images: Vec<UploadedImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

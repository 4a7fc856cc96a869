//! Post creation and feature-image updates
//!
//! Updates follow Ghost's optimistic concurrency contract: the `updated_at` value last
//! read from the server must accompany the write. The read-then-write pair protects a
//! single post against a concurrent editor between the two calls; two runs of this tool
//! racing on the same post are not protected.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{PublishError, Result};
use crate::models::{FeatureImageUpdate, NewPost, Post, PostsEnvelope};
use crate::services::ghost_client::GhostClient;

#[derive(Debug, Clone)]
pub struct PostPublisher {
    client: Arc<GhostClient>,
}

impl PostPublisher {
    pub fn new(client: Arc<GhostClient>) -> Self {
        Self { client }
    }

    /// Create a post from rendered HTML. A non-2xx response is returned as-is; no retry.
    pub async fn create(&self, post: NewPost) -> Result<Post> {
        info!(title = %post.title, status = %post.status, "Creating post");

        let envelope: PostsEnvelope<Post> = self
            .client
            .post_json("/posts/?source=html", &PostsEnvelope::single(post))
            .await?;

        let created = first_post(envelope, "create response contained no posts")?;
        info!(post_id = %created.id, "Post created");
        Ok(created)
    }

    /// Fetch a post by id. A 404 is reported as `NotFound`.
    pub async fn get(&self, post_id: &str) -> Result<Post> {
        let path = format!("/posts/{}/", urlencoding::encode(post_id));

        let envelope: PostsEnvelope<Post> = self.client.get(&path).await.map_err(|e| match e {
            PublishError::Remote { status: 404, .. } => PublishError::NotFound(post_id.to_string()),
            other => other,
        })?;

        first_post(envelope, "post response contained no posts")
    }

    /// Resolve a post by exact title.
    ///
    /// Exact string match only: a renamed post is no longer found.
    pub async fn find_by_title(&self, title: &str) -> Result<Post> {
        let path = format!(
            "/posts/?filter={}&limit=1",
            urlencoding::encode(&title_filter(title))
        );

        let envelope: PostsEnvelope<Post> = self.client.get(&path).await?;
        envelope
            .into_first()
            .ok_or_else(|| PublishError::NotFound(format!("no post titled \"{title}\"")))
    }

    /// Write a new feature image using the concurrency token from an earlier read of `current`.
    pub async fn put_feature_image(&self, current: &Post, image_url: &str) -> Result<Post> {
        let updated_at = current.updated_at.clone().ok_or_else(|| {
            PublishError::Decode(format!("post {} has no updated_at", current.id))
        })?;

        let path = format!("/posts/{}/", urlencoding::encode(&current.id));
        let body = PostsEnvelope::single(FeatureImageUpdate {
            feature_image: image_url.to_string(),
            updated_at,
        });

        let envelope: PostsEnvelope<Post> =
            self.client.put_json(&path, &body).await.map_err(|e| match e {
                PublishError::Remote { status: 409, body } => {
                    warn!(post_id = %current.id, "Update rejected: post changed since it was read");
                    PublishError::Conflict { status: 409, body }
                }
                other => other,
            })?;

        let updated = first_post(envelope, "update response contained no posts")?;
        info!(post_id = %updated.id, "Feature image updated");
        Ok(updated)
    }
}

/// Ghost NQL filter matching a title exactly. Single quotes are backslash-escaped.
pub fn title_filter(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!("title:'{escaped}'")
}

fn first_post(envelope: PostsEnvelope<Post>, missing: &str) -> Result<Post> {
    envelope
        .into_first()
        .ok_or_else(|| PublishError::Decode(missing.to_string()))
}

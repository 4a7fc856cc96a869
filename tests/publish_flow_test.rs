//! Publish Flow Integration Tests
//!
//! Drives the publish pipeline against a mocked Ghost Admin API:
//! 1. Archival copies are written before any network call
//! 2. Thumbnail (supplied or rendered) upload precedes post creation and its URL becomes
//!    the feature image
//! 3. Remote failures surface verbatim and leave the run in `Failed`
//! 4. Local input problems fail before any request is sent
//!
//! Run: cargo test --test publish_flow_test

use std::path::PathBuf;

use blog_publisher::services::pipeline::{
    PipelineStage, PublishOptions, PublishPipeline, ThumbnailSource,
};
use blog_publisher::models::PostStatus;
use blog_publisher::PublishError;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod test_harness;
use test_harness::{
    api_path, assert_admin_authorization, fixture_font_path, json_body, request_lines,
    TestEnvironment, ORIGINAL_MD, TRANSLATION_MD,
};

const IMAGE_URL: &str = "https://blog.example.com/content/images/2025/12/thumb.png";

fn created_post(title: &str, feature_image: Option<&str>) -> serde_json::Value {
    json!({
        "posts": [{
            "id": "6952658df6f30a000125b469",
            "title": title,
            "url": "https://blog.example.com/wideaehan-ileul/",
            "status": "published",
            "feature_image": feature_image,
            "updated_at": "2025-12-29T09:05:00.000Z"
        }]
    })
}

async fn mount_create(env: &TestEnvironment, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(api_path("/posts/")))
        .and(query_param("source", "html"))
        .respond_with(response)
        .expect(1)
        .mount(&env.server)
        .await;
}

async fn mount_upload(env: &TestEnvironment, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(api_path("/images/upload/")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "images": [{ "url": IMAGE_URL, "ref": null }]
        })))
        .expect(expected_calls)
        .mount(&env.server)
        .await;
}

#[tokio::test]
async fn test_publish_without_thumbnail_creates_prefixed_post() {
    let env = TestEnvironment::new().await;
    env.write_sources(ORIGINAL_MD, TRANSLATION_MD);
    mount_create(
        &env,
        ResponseTemplate::new(201).set_body_json(created_post("[번역] 위대한 일을 하는 방법", None)),
    )
    .await;

    let mut pipeline = PublishPipeline::new(&env.config()).unwrap();
    let options = PublishOptions {
        thumbnail: ThumbnailSource::Skip,
        ..PublishOptions::default()
    };

    let report = pipeline.run(&options).await.expect("publish should succeed");

    assert_eq!(report.post.id, "6952658df6f30a000125b469");
    assert_eq!(report.title, "위대한 일을 하는 방법");
    assert!(report.feature_image.is_none());
    assert_eq!(
        report.title_mismatch.as_ref().map(|m| m.original.as_str()),
        Some("How To Do Great Work")
    );

    assert_eq!(
        pipeline.history(),
        &[
            PipelineStage::Idle,
            PipelineStage::FilesRead,
            PipelineStage::TitleExtracted,
            PipelineStage::ArchivalWritten,
            PipelineStage::Published,
            PipelineStage::Done,
        ]
    );

    // Archival copies named after the translation title
    let originals = env.files_with_prefix("original-");
    let translations = env.files_with_prefix("translation-");
    assert_eq!(originals.len(), 1);
    assert_eq!(translations.len(), 1);
    assert!(originals[0].starts_with("original-위대한-일을-하는-방법-"));
    assert_eq!(
        std::fs::read_to_string(&report.archived.translation).unwrap(),
        TRANSLATION_MD
    );

    let requests = env.requests().await;
    assert_eq!(request_lines(&requests), vec!["POST /ghost/api/admin/posts/"]);
    assert_admin_authorization(&requests[0]);

    let body = json_body(&requests[0]);
    let post = &body["posts"][0];
    assert_eq!(post["title"], "[번역] 위대한 일을 하는 방법");
    assert_eq!(post["status"], "published");
    assert!(post.get("feature_image").is_none());

    // Title heading stripped, remaining markdown rendered
    let html = post["html"].as_str().unwrap();
    assert!(!html.contains("<h1>"));
    assert!(html.contains("<h2>소제목</h2>"));
    assert!(html.contains("<p>기법 목록을 모았다면.</p>"));
}

#[tokio::test]
async fn test_publish_uploads_existing_thumbnail_before_create() {
    let env = TestEnvironment::new().await;
    env.write_sources(TRANSLATION_MD, TRANSLATION_MD);
    let thumbnail = env.write_png("thumb.png");

    mount_upload(&env, 1).await;
    mount_create(
        &env,
        ResponseTemplate::new(201)
            .set_body_json(created_post("[번역] 위대한 일을 하는 방법", Some(IMAGE_URL))),
    )
    .await;

    let mut pipeline = PublishPipeline::new(&env.config()).unwrap();
    let options = PublishOptions {
        thumbnail: ThumbnailSource::Existing(thumbnail.clone()),
        status: PostStatus::Draft,
    };

    let report = pipeline.run(&options).await.expect("publish should succeed");

    assert_eq!(report.feature_image.as_deref(), Some(IMAGE_URL));
    assert_eq!(report.thumbnail, Some(thumbnail));
    assert!(report.title_mismatch.is_none());
    assert!(pipeline.history().contains(&PipelineStage::ThumbnailReady));
    assert!(pipeline.history().contains(&PipelineStage::AssetUploaded));
    assert_eq!(pipeline.stage(), PipelineStage::Done);

    let requests = env.requests().await;
    assert_eq!(
        request_lines(&requests),
        vec![
            "POST /ghost/api/admin/images/upload/",
            "POST /ghost/api/admin/posts/",
        ]
    );
    for request in &requests {
        assert_admin_authorization(request);
    }

    // Multipart upload: image file part plus purpose=image
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    let upload = String::from_utf8_lossy(&requests[0].body);
    assert!(upload.contains("name=\"file\"; filename=\"thumb.png\""));
    assert!(upload.contains("Content-Type: image/png"));
    assert!(upload.contains("name=\"purpose\""));

    let body = json_body(&requests[1]);
    assert_eq!(body["posts"][0]["feature_image"], IMAGE_URL);
    assert_eq!(body["posts"][0]["status"], "draft");
}

#[tokio::test]
async fn test_publish_generates_thumbnail_and_uses_it_as_feature_image() {
    let env = TestEnvironment::new().await;
    env.write_sources(ORIGINAL_MD, ORIGINAL_MD);
    mount_upload(&env, 1).await;
    mount_create(
        &env,
        ResponseTemplate::new(201)
            .set_body_json(created_post("[번역] How To Do Great Work", Some(IMAGE_URL))),
    )
    .await;

    let config = blog_publisher::Config {
        thumbnail_font_path: Some(fixture_font_path()),
        ..env.config()
    };
    let mut pipeline = PublishPipeline::new(&config).unwrap();

    let report = pipeline
        .run(&PublishOptions::default())
        .await
        .expect("publish should succeed");

    // thumbnail-<slug>-<YYYYMMDD-HHMMSS>.png in the output directory
    let cards = env.files_with_prefix("thumbnail-how-to-do-great-work-");
    assert_eq!(cards.len(), 1, "got {cards:?}");
    assert!(cards[0].ends_with(".png"));
    let card_path = env.output_dir().join(&cards[0]);
    assert_eq!(report.thumbnail.as_deref(), Some(card_path.as_path()));

    let card = image::open(&card_path).expect("generated thumbnail should be a PNG");
    assert_eq!((card.width(), card.height()), (2000, 1200));

    assert_eq!(report.feature_image.as_deref(), Some(IMAGE_URL));
    assert_eq!(
        pipeline.history(),
        &[
            PipelineStage::Idle,
            PipelineStage::FilesRead,
            PipelineStage::TitleExtracted,
            PipelineStage::ArchivalWritten,
            PipelineStage::ThumbnailReady,
            PipelineStage::AssetUploaded,
            PipelineStage::Published,
            PipelineStage::Done,
        ]
    );

    let requests = env.requests().await;
    assert_eq!(
        request_lines(&requests),
        vec![
            "POST /ghost/api/admin/images/upload/",
            "POST /ghost/api/admin/posts/",
        ]
    );
    let upload = String::from_utf8_lossy(&requests[0].body);
    assert!(upload.contains(&format!("filename=\"{}\"", cards[0])));

    let body = json_body(&requests[1]);
    assert_eq!(body["posts"][0]["feature_image"], IMAGE_URL);
}

#[tokio::test]
async fn test_publish_skips_card_when_font_lacks_glyphs() {
    let env = TestEnvironment::new().await;
    env.write_sources(ORIGINAL_MD, TRANSLATION_MD);
    mount_upload(&env, 0).await;
    mount_create(
        &env,
        ResponseTemplate::new(201).set_body_json(created_post("[번역] 위대한 일을 하는 방법", None)),
    )
    .await;

    // Latin-only font cannot draw the Korean title
    let config = blog_publisher::Config {
        thumbnail_font_path: Some(fixture_font_path()),
        ..env.config()
    };
    let mut pipeline = PublishPipeline::new(&config).unwrap();

    let report = pipeline
        .run(&PublishOptions::default())
        .await
        .expect("publish should continue without a thumbnail");

    assert!(report.thumbnail.is_none());
    assert!(report.feature_image.is_none());
    assert!(env.files_with_prefix("thumbnail-").is_empty());
    assert!(!pipeline.history().contains(&PipelineStage::ThumbnailReady));

    let requests = env.requests().await;
    assert_eq!(request_lines(&requests), vec!["POST /ghost/api/admin/posts/"]);
    assert!(json_body(&requests[0])["posts"][0].get("feature_image").is_none());
}

#[tokio::test]
async fn test_publish_generation_failure_is_not_fatal() {
    let env = TestEnvironment::new().await;
    env.write_sources(TRANSLATION_MD, TRANSLATION_MD);
    mount_upload(&env, 0).await;
    mount_create(
        &env,
        ResponseTemplate::new(201).set_body_json(created_post("[번역] 위대한 일을 하는 방법", None)),
    )
    .await;

    let config = blog_publisher::Config {
        thumbnail_font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
        ..env.config()
    };
    let mut pipeline = PublishPipeline::new(&config).unwrap();

    let report = pipeline
        .run(&PublishOptions::default())
        .await
        .expect("publish should continue without a thumbnail");

    assert!(report.thumbnail.is_none());
    assert!(report.feature_image.is_none());
    assert!(!pipeline.history().contains(&PipelineStage::ThumbnailReady));
    assert_eq!(pipeline.stage(), PipelineStage::Done);
}

#[tokio::test]
async fn test_publish_remote_error_surfaces_body_verbatim() {
    let env = TestEnvironment::new().await;
    env.write_sources(ORIGINAL_MD, TRANSLATION_MD);
    let error_body = concat!(
        r#"{"errors":[{"message":"Validation error, cannot save post.","#,
        r#""type":"ValidationError"}]}"#
    );
    mount_create(&env, ResponseTemplate::new(422).set_body_string(error_body)).await;

    let mut pipeline = PublishPipeline::new(&env.config()).unwrap();
    let options = PublishOptions {
        thumbnail: ThumbnailSource::Skip,
        ..PublishOptions::default()
    };

    let err = pipeline.run(&options).await.unwrap_err();

    match &err {
        PublishError::Remote { status, body } => {
            assert_eq!(*status, 422);
            assert_eq!(body, error_body);
        }
        other => panic!("expected Remote error, got {other:?}"),
    }
    assert!(err.to_string().contains(error_body));
    assert_ne!(err.exit_code(), 0);
    assert_eq!(pipeline.stage(), PipelineStage::Failed);

    // Archival happens before the network and is not rolled back
    assert_eq!(env.files_with_prefix("original-").len(), 1);

    // A finished run cannot be restarted
    assert!(matches!(
        pipeline.run(&options).await,
        Err(PublishError::Usage(_))
    ));
}

#[tokio::test]
async fn test_publish_missing_sources_fails_before_network() {
    let env = TestEnvironment::new().await;

    let mut pipeline = PublishPipeline::new(&env.config()).unwrap();
    let err = pipeline.run(&PublishOptions::default()).await.unwrap_err();

    assert!(matches!(err, PublishError::Usage(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("original.md"));
    assert!(env.requests().await.is_empty());
    assert_eq!(pipeline.stage(), PipelineStage::Failed);
}

#[tokio::test]
async fn test_publish_missing_thumbnail_file_fails_before_any_write() {
    let env = TestEnvironment::new().await;
    env.write_sources(ORIGINAL_MD, TRANSLATION_MD);

    let mut pipeline = PublishPipeline::new(&env.config()).unwrap();
    let options = PublishOptions {
        thumbnail: ThumbnailSource::Existing(env.output_dir().join("missing.png")),
        ..PublishOptions::default()
    };

    let err = pipeline.run(&options).await.unwrap_err();

    assert!(matches!(err, PublishError::Usage(_)));
    assert!(env.files_with_prefix("original-").is_empty());
    assert!(env.requests().await.is_empty());
}

#[tokio::test]
async fn test_publish_unreachable_server_is_transport_error() {
    let env = TestEnvironment::new().await;
    env.write_sources(ORIGINAL_MD, TRANSLATION_MD);

    let config = blog_publisher::Config {
        // Port 9 (discard) on loopback: nothing listens in the test environment
        ghost_url: "http://127.0.0.1:9".to_string(),
        ..env.config()
    };
    let mut pipeline = PublishPipeline::new(&config).unwrap();
    let options = PublishOptions {
        thumbnail: ThumbnailSource::Skip,
        ..PublishOptions::default()
    };

    let err = pipeline.run(&options).await.unwrap_err();
    assert!(matches!(err, PublishError::Transport(_)), "got {err:?}");
    assert_eq!(err.exit_code(), 1);
}

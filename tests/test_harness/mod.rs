//! Test Harness Module
//!
//! Shared setup for integration tests against a mocked Ghost Admin API:
//! - Config pointing at a wiremock server and a temporary output directory
//! - Article source and font fixtures
//! - Token inspection helpers

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use blog_publisher::Config;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tempfile::TempDir;
use wiremock::{MockServer, Request};

pub const KEY_ID: &str = "69522d3df6f30a000125b42c";
pub const KEY_SECRET_HEX: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
pub const API_PREFIX: &str = "/ghost/api/admin";

pub const ORIGINAL_MD: &str = "# How To Do Great Work\n\nIf you collected lists of techniques.\n";
pub const TRANSLATION_MD: &str = "# 위대한 일을 하는 방법\n\n기법 목록을 모았다면.\n\n## 소제목\n\n본문.\n";

/// Mocked Ghost instance plus a scratch output directory.
pub struct TestEnvironment {
    pub server: MockServer,
    pub output: TempDir,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            output: TempDir::new().expect("Failed to create temp output dir"),
        }
    }

    pub fn config(&self) -> Config {
        Config {
            ghost_url: self.server.uri(),
            ghost_admin_api_key: Some(format!("{KEY_ID}:{KEY_SECRET_HEX}")),
            output_dir: self.output.path().to_path_buf(),
            request_timeout_secs: 5,
            ..Config::default()
        }
    }

    pub fn output_dir(&self) -> &Path {
        self.output.path()
    }

    pub fn write_sources(&self, original: &str, translation: &str) {
        std::fs::write(self.output.path().join("original.md"), original)
            .expect("Failed to write original.md");
        std::fs::write(self.output.path().join("translation.md"), translation)
            .expect("Failed to write translation.md");
    }

    /// A small real PNG on disk.
    pub fn write_png(&self, name: &str) -> PathBuf {
        let path = self.output.path().join(name);
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .expect("Failed to write test png");
        path
    }

    pub fn files_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.output.path())
            .expect("Failed to list output dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("Request recording is enabled by default")
    }
}

/// Latin-only font checked in for rendering tests (no Hangul glyphs).
pub fn fixture_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSans-Bold.ttf")
}

pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("Request body should be JSON")
}

/// "METHOD /path" for each recorded request, in arrival order.
pub fn request_lines(requests: &[Request]) -> Vec<String> {
    requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

/// Verify the Authorization header carries a valid admin token for the test key.
pub fn assert_admin_authorization(request: &Request) {
    let header = request
        .headers
        .get("authorization")
        .expect("Authorization header missing")
        .to_str()
        .expect("Authorization header is not ASCII");

    let token = header
        .strip_prefix("Ghost ")
        .unwrap_or_else(|| panic!("Unexpected auth scheme: {header}"));

    let jwt_header = decode_header(token).expect("Token header should decode");
    assert_eq!(jwt_header.alg, Algorithm::HS256);
    assert_eq!(jwt_header.kid.as_deref(), Some(KEY_ID));

    let secret = hex::decode(KEY_SECRET_HEX).expect("Test secret is hex");
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["/admin/"]);
    let claims = decode::<Value>(token, &DecodingKey::from_secret(&secret), &validation)
        .expect("Token should verify against the test secret")
        .claims;

    let iat = claims["iat"].as_i64().expect("iat claim");
    let exp = claims["exp"].as_i64().expect("exp claim");
    assert_eq!(exp - iat, 300);
}

//! Admin API token signing
//!
//! Ghost admin keys have the form `<id>:<secret>` where the secret is hex. Each request
//! carries a short-lived HS256 JWT whose header names the key id (`kid`), whose payload
//! holds only the standard `iat`/`exp`/`aud` claims, and whose audience restricts it to
//! the `/admin/` endpoints.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PublishError, Result};

pub const TOKEN_TTL_SECS: i64 = 300;
pub const ADMIN_AUDIENCE: &str = "/admin/";

/// Parsed admin key pair. The secret is kept as raw bytes (hex-decoded).
#[derive(Clone)]
pub struct AdminKey {
    id: String,
    secret: Vec<u8>,
}

impl AdminKey {
    pub fn parse(raw: &str) -> Result<Self> {
        let (id, secret_hex) = raw.trim().split_once(':').ok_or_else(|| {
            PublishError::MalformedCredential("expected '<id>:<secret>'".to_string())
        })?;

        if id.is_empty() {
            return Err(PublishError::MalformedCredential(
                "key id is empty".to_string(),
            ));
        }

        let secret = hex::decode(secret_hex).map_err(|e| {
            PublishError::MalformedCredential(format!("secret is not valid hex: {e}"))
        })?;

        if secret.is_empty() {
            return Err(PublishError::MalformedCredential(
                "secret is empty".to_string(),
            ));
        }

        Ok(Self {
            id: id.to_string(),
            secret,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

/// Mints admin tokens from a single key pair.
pub struct TokenSigner {
    key: AdminKey,
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(key: AdminKey) -> Self {
        let encoding_key = EncodingKey::from_secret(key.secret());
        Self {
            key,
            encoding_key,
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    pub fn from_raw_key(raw: &str) -> Result<Self> {
        Ok(Self::new(AdminKey::parse(raw)?))
    }

    pub fn key_id(&self) -> &str {
        self.key.id()
    }

    pub fn sign(&self) -> Result<String> {
        self.sign_at(Utc::now())
    }

    pub fn sign_at(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.key.id().to_string());

        let claims = AdminClaims {
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            aud: ADMIN_AUDIENCE.to_string(),
        };

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &self.key)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

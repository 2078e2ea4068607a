//! Secret-bound binding tokens for checkout-scoped artifacts.
//!
//! A binding token ties an artifact to a `{scope, subject}` pair for a
//! bounded lifetime, independently of any backing store. The token is
//! self-contained: base64url-encoded JSON claims followed by an HMAC-SHA256
//! signature over the encoded payload, joined with a `.` separator.
//!
//! Without the signing secret a token cannot be forged; a valid token cannot
//! be replayed against a different scope/subject pair and cannot be used
//! past its expiry.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as b64url;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::timestamp::UnixTimestamp;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted signing secret length, in bytes.
pub const MIN_SECRET_LEN: usize = 16;

/// Process-wide HMAC signing secret.
///
/// Loaded once at startup; construction fails on secrets too short to sign
/// with. The `Debug` representation never reveals the key material.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Creates a signing secret from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::TooShort`] for secrets under
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(SecretError::TooShort(bytes.len()));
        }
        Ok(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([redacted])")
    }
}

/// Errors raised when constructing a [`SigningSecret`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SecretError {
    /// The provided key material is shorter than [`MIN_SECRET_LEN`] bytes.
    #[error("signing secret must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    TooShort(usize),
}

/// Claims carried inside a binding token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingClaims {
    /// The scope the artifact is bound to (e.g. a checkout id).
    pub scope_id: String,
    /// The subject within that scope (e.g. a business id).
    pub subject_id: String,
    /// Fresh identifier for the bound artifact.
    pub artifact_id: String,
    /// Issue time.
    pub created_at: UnixTimestamp,
    /// Expiry; the token is rejected once this has passed.
    pub expires_at: UnixTimestamp,
}

/// A freshly issued binding token.
#[derive(Debug, Clone)]
pub struct IssuedBinding {
    /// The self-contained token, `payload.signature`.
    pub token: String,
    /// The artifact id embedded in the claims.
    pub artifact_id: String,
    /// When the token stops verifying.
    pub expires_at: UnixTimestamp,
}

/// Issues and verifies tamper-evident checkout-scoped binding tokens.
#[derive(Debug, Clone)]
pub struct BindingCodec {
    secret: SigningSecret,
}

impl BindingCodec {
    /// Creates a codec over the given signing secret.
    #[must_use]
    pub const fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// Issues a binding token for `{scope_id, subject_id}` valid for
    /// `ttl_seconds` from now.
    #[must_use]
    pub fn issue(&self, scope_id: &str, subject_id: &str, ttl_seconds: u64) -> IssuedBinding {
        let created_at = UnixTimestamp::now();
        let claims = BindingClaims {
            scope_id: scope_id.to_owned(),
            subject_id: subject_id.to_owned(),
            artifact_id: new_artifact_id(),
            created_at,
            expires_at: created_at + ttl_seconds,
        };
        let encoded = serde_json::to_vec(&claims).expect("claims always serialize");
        let payload = b64url.encode(encoded);
        let signature = self.sign(payload.as_bytes());
        IssuedBinding {
            token: format!("{payload}.{signature}"),
            artifact_id: claims.artifact_id,
            expires_at: claims.expires_at,
        }
    }

    /// Verifies a binding token against the expected scope and subject.
    ///
    /// Returns the embedded claims on success. Any failure — malformed
    /// input, signature mismatch, scope/subject mismatch, expiry — yields
    /// `None`; malformed input never panics. The signature comparison is
    /// constant-time.
    #[must_use]
    pub fn verify(&self, token: &str, scope_id: &str, subject_id: &str) -> Option<BindingClaims> {
        let (payload, signature) = token.split_once('.')?;
        let expected = self.sign(payload.as_bytes());
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return None;
        }
        let raw = b64url.decode(payload).ok()?;
        let claims: BindingClaims = serde_json::from_slice(&raw).ok()?;
        if claims.scope_id != scope_id || claims.subject_id != subject_id {
            return None;
        }
        if claims.expires_at.is_past() {
            return None;
        }
        Some(claims)
    }

    fn sign(&self, message: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(message);
        b64url.encode(mac.finalize().into_bytes())
    }
}

fn new_artifact_id() -> String {
    let mut buf = [0u8; 16];
    OsRng.fill_bytes(&mut buf);
    format!("bnd_{}", b64url.encode(buf))
}

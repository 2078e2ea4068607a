//! The persisted token model and identifier generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as b64url;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use ucp_pay::config::TokenizationMode;
use ucp_pay::proto::InstrumentSummary;
use ucp_pay::timestamp::UnixTimestamp;

/// Prefix on every vault token identifier, for type discrimination.
pub const TOKEN_ID_PREFIX: &str = "vt_";

/// The scope a token may be redeemed in. Immutable once created; both
/// fields must match exactly on every redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBinding {
    /// The checkout the token belongs to.
    pub checkout_id: String,
    /// The business the token belongs to.
    pub business_id: String,
}

/// The persisted vault entry — the only entity this engine stores.
///
/// Immutable except for the `used` flag, which transitions false to true
/// exactly once inside the store's atomic consume step and never reverts.
/// The provider credential reference is persisted but never exposed to
/// callers; the instrument carries only non-sensitive display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    /// Caller-facing opaque token identifier.
    pub id: String,
    /// Opaque reference to the processor-side vaulted credential.
    pub provider_credential_ref: String,
    /// Redemption scope.
    pub binding: TokenBinding,
    /// Non-sensitive display metadata.
    pub instrument: InstrumentSummary,
    /// Issue time.
    pub created_at: UnixTimestamp,
    /// Expiry; `created_at` plus the configured TTL.
    pub expires_at: UnixTimestamp,
    /// Whether the token has been redeemed.
    pub used: bool,
    /// Which credential shape detokenization produces.
    pub credential_type: TokenizationMode,
}

impl StoredToken {
    /// Returns `true` once the token's expiry has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_past()
    }

    /// The store key for a token identifier.
    #[must_use]
    pub fn storage_key(token_id: &str) -> String {
        format!("payment_token:{token_id}")
    }
}

/// Generates a fresh, unguessable vault token identifier.
///
/// 32 bytes of OS entropy, base64url-encoded, behind the `vt_` prefix.
#[must_use]
pub fn new_token_id() -> String {
    let mut buf = [0u8; 32];
    OsRng.fill_bytes(&mut buf);
    format!("{TOKEN_ID_PREFIX}{}", b64url.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ids_are_prefixed_and_unique() {
        let a = new_token_id();
        let b = new_token_id();
        assert!(a.starts_with(TOKEN_ID_PREFIX));
        assert_ne!(a, b);
        // 32 bytes of entropy encode to 43 base64url characters.
        assert_eq!(a.len(), TOKEN_ID_PREFIX.len() + 43);
    }

    #[test]
    fn storage_keys_are_namespaced() {
        assert_eq!(
            StoredToken::storage_key("vt_abc"),
            "payment_token:vt_abc"
        );
    }
}

//! Single-use token redemption.
//!
//! Redemption walks a fixed sequence of checks, each with its own failure
//! mode: fetch, early used/expiry exits, binding enforcement, then the
//! atomic consume. The early `used` check is an optimization only — the
//! store's conditional consume is the authoritative single-use guard, and
//! losing that race is a distinct failure from finding the flag already
//! set. Nothing here retries: past the first successful consume the
//! operation is not idempotent, by design.

use std::sync::Arc;

use tracing::{error, info, warn};

use ucp_pay::config::{HandlerConfig, TokenizationMode};
use ucp_pay::proto::{CredentialMaterial, DetokenizeRequest, DetokenizeResponse};

use crate::error::DetokenizeError;
use crate::provider::ProviderClient;
use crate::store::{ConsumeOutcome, TokenStore};
use crate::token::StoredToken;

/// Redeems vault tokens exactly once for processor credential material.
#[allow(missing_debug_implementations)] // holds dyn capabilities
pub struct Detokenizer {
    config: Arc<HandlerConfig>,
    store: Arc<dyn TokenStore>,
    provider: Arc<dyn ProviderClient>,
}

impl Detokenizer {
    /// Creates a detokenizer over the given configuration and capabilities.
    #[must_use]
    pub fn new(
        config: Arc<HandlerConfig>,
        store: Arc<dyn TokenStore>,
        provider: Arc<dyn ProviderClient>,
    ) -> Self {
        Self {
            config,
            store,
            provider,
        }
    }

    /// Redeems a token, atomically marking it consumed.
    ///
    /// On success the token is dead regardless of credential type; the
    /// response's `invalidated` flag is always `true`.
    ///
    /// # Errors
    ///
    /// Each lifecycle check fails with its own [`DetokenizeError`] variant;
    /// see the module docs for the check order.
    pub async fn detokenize(
        &self,
        request: DetokenizeRequest,
    ) -> Result<DetokenizeResponse, DetokenizeError> {
        let key = StoredToken::storage_key(&request.token);
        let Some(stored) = self.store.get(&key).await? else {
            warn!(
                checkout_id = %request.checkout_id,
                token = %request.token,
                "detokenize rejected: token not found"
            );
            return Err(DetokenizeError::NotFound);
        };

        if let Some(delegate) = &request.delegated_to {
            info!(
                checkout_id = %request.checkout_id,
                token = %stored.id,
                delegate_kind = %delegate.kind,
                delegate = %delegate.identity,
                "detokenization delegated"
            );
        }

        // Cheap early exits; the atomic consume below is authoritative.
        if stored.used {
            warn!(checkout_id = %request.checkout_id, token = %stored.id, "detokenize rejected: already used");
            return Err(DetokenizeError::AlreadyUsed);
        }
        if stored.is_expired() {
            warn!(checkout_id = %request.checkout_id, token = %stored.id, "detokenize rejected: expired");
            return Err(DetokenizeError::Expired);
        }

        if stored.binding.checkout_id != request.checkout_id {
            warn!(
                token = %stored.id,
                expected = %stored.binding.checkout_id,
                received = %request.checkout_id,
                "detokenize rejected: checkoutId mismatch"
            );
            return Err(DetokenizeError::CheckoutMismatch);
        }
        if stored.binding.business_id != request.business_identity.value {
            warn!(
                token = %stored.id,
                expected = %stored.binding.business_id,
                received = %request.business_identity.value,
                "detokenize rejected: businessIdentity mismatch"
            );
            return Err(DetokenizeError::BusinessMismatch);
        }

        // Refuse PAN release before killing the token, not after.
        if stored.credential_type == TokenizationMode::Pan
            && self.config.tokenization_mode != TokenizationMode::Pan
        {
            warn!(token = %stored.id, "detokenize rejected: PAN mode not configured");
            return Err(DetokenizeError::PanModeDisabled);
        }

        match self.store.consume(&key).await? {
            ConsumeOutcome::Consumed => {}
            ConsumeOutcome::AlreadyUsed => {
                warn!(
                    checkout_id = %request.checkout_id,
                    token = %stored.id,
                    "detokenize rejected: lost consume race"
                );
                return Err(DetokenizeError::ConsumeRace);
            }
            ConsumeOutcome::Missing => {
                warn!(
                    checkout_id = %request.checkout_id,
                    token = %stored.id,
                    "detokenize rejected: token vanished before consume"
                );
                return Err(DetokenizeError::NotFound);
            }
        }

        let credential = self.derive_credential(&stored).await?;
        info!(checkout_id = %request.checkout_id, token = %stored.id, "token redeemed");
        Ok(DetokenizeResponse {
            credential,
            invalidated: true,
        })
    }

    /// Materializes the credential for an already-consumed token.
    ///
    /// The token is dead at this point, so a provider failure is the
    /// irrecoverable "consumed but undelivered" case.
    async fn derive_credential(
        &self,
        stored: &StoredToken,
    ) -> Result<CredentialMaterial, DetokenizeError> {
        match stored.credential_type {
            TokenizationMode::NetworkToken => {
                let data = self
                    .provider
                    .fetch_network_token(&stored.provider_credential_ref)
                    .await
                    .map_err(|err| {
                        error!(token = %stored.id, %err, "credential delivery failed after consume");
                        DetokenizeError::ConsumedUndelivered(err)
                    })?;
                Ok(CredentialMaterial::NetworkToken {
                    network_token: data.token,
                    cryptogram: data.cryptogram,
                    eci: data.eci,
                    expiry_month: stored.instrument.expiry_month,
                    expiry_year: stored.instrument.expiry_year,
                })
            }
            TokenizationMode::Pan => {
                let data = self
                    .provider
                    .fetch_pan(&stored.provider_credential_ref)
                    .await
                    .map_err(|err| {
                        error!(token = %stored.id, %err, "credential delivery failed after consume");
                        DetokenizeError::ConsumedUndelivered(err)
                    })?;
                Ok(CredentialMaterial::Pan {
                    pan: data.pan,
                    expiry_month: stored.instrument.expiry_month,
                    expiry_year: stored.instrument.expiry_year,
                })
            }
            _ => unreachable!("unhandled tokenization mode"),
        }
    }

    /// Deletes a token outright, regardless of its used or expiry state
    /// (e.g. on checkout cancellation).
    ///
    /// Returns `false` for unknown tokens and for tokens bound to a
    /// different checkout.
    ///
    /// # Errors
    ///
    /// Returns [`DetokenizeError::Store`] if the store cannot be reached.
    pub async fn invalidate(
        &self,
        checkout_id: &str,
        token: &str,
    ) -> Result<bool, DetokenizeError> {
        let key = StoredToken::storage_key(token);
        let Some(stored) = self.store.get(&key).await? else {
            return Ok(false);
        };
        if stored.binding.checkout_id != checkout_id {
            warn!(
                token = %stored.id,
                expected = %stored.binding.checkout_id,
                received = %checkout_id,
                "invalidate refused: checkoutId mismatch"
            );
            return Ok(false);
        }
        let removed = self.store.delete(&key).await?;
        info!(token = %stored.id, %checkout_id, "token invalidated");
        Ok(removed)
    }
}

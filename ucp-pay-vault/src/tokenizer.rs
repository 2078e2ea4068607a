//! Credential validation and token issuance.
//!
//! Validation is fail-fast: the first violated check wins, in a fixed order
//! — method allow-list, required fields, field shape, network allow-list.
//! Only after every check passes does the tokenizer touch the provider, and
//! only after the provider mints a credential does it touch the store, so a
//! provider failure never leaves a token with a dangling reference.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use ucp_pay::card::detect_card_brand;
use ucp_pay::config::HandlerConfig;
use ucp_pay::proto::{
    CardDetails, InstrumentSummary, PaymentCredential, PaymentMethodKind, TokenizeRequest,
    TokenizeResponse,
};
use ucp_pay::timestamp::UnixTimestamp;

use crate::error::TokenizeError;
use crate::provider::ProviderClient;
use crate::store::TokenStore;
use crate::token::{StoredToken, TokenBinding, new_token_id};

/// Validates inbound credentials and issues checkout-bound vault tokens.
#[allow(missing_debug_implementations)] // holds dyn capabilities
pub struct Tokenizer {
    config: Arc<HandlerConfig>,
    store: Arc<dyn TokenStore>,
    provider: Arc<dyn ProviderClient>,
}

impl Tokenizer {
    /// Creates a tokenizer over the given configuration and capabilities.
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

    /// Exchanges a source credential for an opaque, checkout-bound token.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenizeError`] on policy rejection, malformed input, or
    /// provider/store failure. No token is persisted on any error path.
    pub async fn tokenize(
        &self,
        request: TokenizeRequest,
    ) -> Result<TokenizeResponse, TokenizeError> {
        let method = request.credential.method();
        if !self.config.payment_methods.contains(&method) {
            warn!(
                checkout_id = %request.checkout_id,
                %method,
                "tokenize rejected: payment method not enabled"
            );
            return Err(TokenizeError::UnsupportedPaymentMethod(method));
        }

        let instrument = match self.validate(&request) {
            Ok(instrument) => instrument,
            Err(err) => {
                warn!(checkout_id = %request.checkout_id, %method, %err, "tokenize rejected");
                return Err(err);
            }
        };

        // Mint before persist: an upstream failure here must not leave a
        // stored token holding a dangling provider reference.
        let provider_credential_ref = self.provider.mint_credential(&request.credential).await?;

        let token_id = new_token_id();
        let created_at = UnixTimestamp::now();
        let expires_at = created_at + self.config.token_ttl_seconds;
        let stored = StoredToken {
            id: token_id.clone(),
            provider_credential_ref,
            binding: TokenBinding {
                checkout_id: request.checkout_id.clone(),
                business_id: request.business_identity.value.clone(),
            },
            instrument: instrument.clone(),
            created_at,
            expires_at,
            used: false,
            credential_type: self.config.tokenization_mode,
        };
        self.store
            .put(
                &StoredToken::storage_key(&token_id),
                &stored,
                Duration::from_secs(self.config.token_ttl_seconds),
            )
            .await?;

        debug!(
            checkout_id = %request.checkout_id,
            token = %token_id,
            %method,
            "vault token issued"
        );
        Ok(TokenizeResponse {
            token: token_id,
            expires_at,
            instrument,
        })
    }

    fn validate(&self, request: &TokenizeRequest) -> Result<InstrumentSummary, TokenizeError> {
        match &request.credential {
            PaymentCredential::Card(card) => self.validate_card(card),
            PaymentCredential::GooglePay { token } => {
                require_present(token.as_deref(), "token")?;
                Ok(InstrumentSummary::wallet(PaymentMethodKind::GooglePay))
            }
            PaymentCredential::ApplePay { token } => {
                require_present(token.as_deref(), "token")?;
                Ok(InstrumentSummary::wallet(PaymentMethodKind::ApplePay))
            }
        }
    }

    fn validate_card(&self, card: &CardDetails) -> Result<InstrumentSummary, TokenizeError> {
        let pan = require_present(card.pan.as_deref(), "pan")?;
        let expiry_month = card
            .expiry_month
            .ok_or(TokenizeError::MissingField("expiryMonth"))?;
        let expiry_year = card
            .expiry_year
            .ok_or(TokenizeError::MissingField("expiryYear"))?;
        let cvv = require_present(card.cvv.as_deref(), "cvv")?;

        let digits: String = pan.chars().filter(|c| !c.is_whitespace()).collect();
        if !(12..=19).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenizeError::InvalidCredentials("pan"));
        }
        if !(1..=12).contains(&expiry_month) {
            return Err(TokenizeError::InvalidCredentials("expiryMonth"));
        }
        if !(3..=4).contains(&cvv.len()) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenizeError::InvalidCredentials("cvv"));
        }

        let brand = detect_card_brand(&digits);
        match brand {
            Some(brand) if !self.config.card_networks.contains(&brand) => {
                return Err(TokenizeError::UnsupportedCardNetwork(
                    brand.as_str().to_owned(),
                ));
            }
            None if self.config.reject_unknown_card_networks => {
                return Err(TokenizeError::UnsupportedCardNetwork("UNKNOWN".to_owned()));
            }
            // Unknown networks pass through unless policy says otherwise.
            _ => {}
        }

        let last_digits = digits[digits.len() - 4..].to_owned();
        Ok(InstrumentSummary {
            method: PaymentMethodKind::Card,
            brand,
            last_digits: Some(last_digits),
            expiry_month: Some(expiry_month),
            expiry_year: Some(expiry_year),
        })
    }
}

/// Presence check treating empty strings as absent.
fn require_present<'a>(
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, TokenizeError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TokenizeError::MissingField(field)),
    }
}

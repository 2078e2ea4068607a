//! Shared test doubles and request builders.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use ucp_pay::config::{HandlerConfig, TokenizationMode};
use ucp_pay::proto::{
    BusinessIdentity, DetokenizeRequest, InstrumentSummary, PaymentCredential, PaymentMethodKind,
    TokenizeRequest,
};
use ucp_pay::timestamp::UnixTimestamp;

use crate::provider::{NetworkTokenData, PanData, ProviderClient, ProviderError};
use crate::token::{StoredToken, TokenBinding};

/// Substitutable processor double with switchable failure modes.
pub struct StubProvider {
    mint_fails: AtomicBool,
    fetch_fails: AtomicBool,
    mint_count: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            mint_fails: AtomicBool::new(false),
            fetch_fails: AtomicBool::new(false),
            mint_count: AtomicUsize::new(0),
        }
    }

    pub fn fail_mint(&self) {
        self.mint_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_fetch(&self) {
        self.fetch_fails.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.mint_fails.store(false, Ordering::SeqCst);
        self.fetch_fails.store(false, Ordering::SeqCst);
    }

    pub fn mint_calls(&self) -> usize {
        self.mint_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for StubProvider {
    async fn mint_credential(
        &self,
        _credential: &PaymentCredential,
    ) -> Result<String, ProviderError> {
        if self.mint_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::new("mint unavailable"));
        }
        let n = self.mint_count.fetch_add(1, Ordering::SeqCst);
        Ok(format!("prov_ref_{n}"))
    }

    async fn fetch_network_token(
        &self,
        credential_ref: &str,
    ) -> Result<NetworkTokenData, ProviderError> {
        if self.fetch_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::new("upstream timeout"));
        }
        Ok(NetworkTokenData {
            token: format!("ntk_{credential_ref}"),
            cryptogram: "AgAAAAAABk4DWZ4C28yUQAAAAAA=".to_owned(),
            eci: "05".to_owned(),
        })
    }

    async fn fetch_pan(&self, _credential_ref: &str) -> Result<PanData, ProviderError> {
        if self.fetch_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::new("upstream timeout"));
        }
        Ok(PanData {
            pan: "4242424242424242".to_owned(),
        })
    }
}

/// A default handler configuration for tests.
pub fn handler_config() -> HandlerConfig {
    HandlerConfig::default()
}

/// A card tokenize request, exp 12/2028, cvv 123.
pub fn card_request(pan: &str, checkout_id: &str, business_id: &str) -> TokenizeRequest {
    TokenizeRequest {
        credential: PaymentCredential::Card(
            serde_json::from_value(serde_json::json!({
                "pan": pan,
                "expiryMonth": 12,
                "expiryYear": 2028,
                "cvv": "123",
                "cardholderName": "Jordan Smith",
            }))
            .expect("valid card json"),
        ),
        checkout_id: checkout_id.to_owned(),
        business_identity: business_identity(business_id),
        metadata: None,
    }
}

/// A wallet tokenize request carrying an opaque wallet token.
pub fn wallet_request(method: PaymentMethodKind, checkout_id: &str) -> TokenizeRequest {
    let credential = match method {
        PaymentMethodKind::GooglePay => PaymentCredential::GooglePay {
            token: Some("gp_opaque_token".to_owned()),
        },
        PaymentMethodKind::ApplePay => PaymentCredential::ApplePay {
            token: Some("ap_opaque_token".to_owned()),
        },
        PaymentMethodKind::Card => panic!("use card_request for cards"),
        _ => panic!("unsupported payment method for wallet_request"),
    };
    TokenizeRequest {
        credential,
        checkout_id: checkout_id.to_owned(),
        business_identity: business_identity("merchant_456"),
        metadata: None,
    }
}

/// A detokenize request against the given token and binding.
pub fn detokenize_request(token: &str, checkout_id: &str, business_id: &str) -> DetokenizeRequest {
    DetokenizeRequest {
        token: token.to_owned(),
        checkout_id: checkout_id.to_owned(),
        business_identity: business_identity(business_id),
        delegated_to: None,
    }
}

/// A live, unused stored token bound to the given scope.
pub fn stored_token(id: &str, checkout_id: &str, business_id: &str) -> StoredToken {
    let created_at = UnixTimestamp::now();
    StoredToken {
        id: id.to_owned(),
        provider_credential_ref: "prov_ref_0".to_owned(),
        binding: TokenBinding {
            checkout_id: checkout_id.to_owned(),
            business_id: business_id.to_owned(),
        },
        instrument: InstrumentSummary {
            method: PaymentMethodKind::Card,
            brand: Some(ucp_pay::card::CardBrand::Visa),
            last_digits: Some("1111".to_owned()),
            expiry_month: Some(12),
            expiry_year: Some(2028),
        },
        created_at,
        expires_at: created_at + 900,
        used: false,
        credential_type: TokenizationMode::NetworkToken,
    }
}

fn business_identity(value: &str) -> BusinessIdentity {
    BusinessIdentity {
        kind: Some("merchant_id".to_owned()),
        value: value.to_owned(),
    }
}

//! Handler configuration and the capability declaration.
//!
//! [`HandlerConfig`] is the immutable policy a vault handler is constructed
//! with: which payment methods and card networks are enabled, the token
//! TTL, and the tokenization mode. [`HandlerDeclaration`] is its static,
//! caller-facing echo — the capability descriptor discovery layers serve.

use serde::{Deserialize, Serialize};

use crate::card::CardBrand;
use crate::proto::PaymentMethodKind;

/// How redeemed tokens are materialized into processor credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TokenizationMode {
    /// Detokenization yields a network token plus cryptogram.
    #[default]
    NetworkToken,
    /// Detokenization yields the raw PAN. Only for processors that require
    /// direct card data and are scoped for it.
    Pan,
}

/// Immutable configuration for a payment handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Handler name advertised in the capability declaration.
    pub name: String,
    /// Handler version advertised in the capability declaration.
    pub version: String,
    /// URL of the protocol specification this handler implements.
    pub spec_url: String,
    /// Payment method types the handler accepts.
    pub payment_methods: Vec<PaymentMethodKind>,
    /// Card networks the handler accepts.
    pub card_networks: Vec<CardBrand>,
    /// ISO 4217 currency codes the handler supports.
    pub currencies: Vec<String>,
    /// Whether the handler supports 3-D Secure flows.
    pub supports_three_ds: bool,
    /// Whether the handler supports recurring charges.
    pub supports_recurring: bool,
    /// How redeemed tokens are materialized.
    pub tokenization_mode: TokenizationMode,
    /// Vault token lifetime in seconds.
    pub token_ttl_seconds: u64,
    /// Reject cards whose network cannot be detected. Off by default:
    /// unknown networks pass through and only enabled networks are
    /// enforced.
    pub reject_unknown_card_networks: bool,
}

impl HandlerConfig {
    /// Default vault token lifetime (15 minutes).
    pub const DEFAULT_TOKEN_TTL_SECS: u64 = 900;

    /// Builds the static capability declaration for this configuration.
    #[must_use]
    pub fn declaration(&self) -> HandlerDeclaration {
        HandlerDeclaration {
            name: self.name.clone(),
            version: self.version.clone(),
            spec_url: self.spec_url.clone(),
            supported_payment_methods: self.payment_methods.clone(),
            supported_card_networks: self.card_networks.clone(),
            supported_currencies: self.currencies.clone(),
            supports_three_ds: self.supports_three_ds,
            supports_recurring: self.supports_recurring,
            tokenization_mode: self.tokenization_mode,
        }
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            name: "ucp-pay-vault".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            spec_url: "https://ucprotocol.org/specs/payment-tokenization".to_owned(),
            payment_methods: vec![
                PaymentMethodKind::Card,
                PaymentMethodKind::GooglePay,
                PaymentMethodKind::ApplePay,
            ],
            card_networks: vec![
                CardBrand::Visa,
                CardBrand::Mastercard,
                CardBrand::Amex,
                CardBrand::Discover,
            ],
            currencies: vec!["USD".to_owned()],
            supports_three_ds: false,
            supports_recurring: false,
            tokenization_mode: TokenizationMode::default(),
            token_ttl_seconds: Self::DEFAULT_TOKEN_TTL_SECS,
            reject_unknown_card_networks: false,
        }
    }
}

/// Static capability descriptor served to discovery layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerDeclaration {
    /// Handler name.
    pub name: String,
    /// Handler version.
    pub version: String,
    /// URL of the protocol specification.
    pub spec_url: String,
    /// Accepted payment method types.
    pub supported_payment_methods: Vec<PaymentMethodKind>,
    /// Accepted card networks.
    pub supported_card_networks: Vec<CardBrand>,
    /// Supported ISO 4217 currency codes.
    pub supported_currencies: Vec<String>,
    /// Whether 3-D Secure flows are supported.
    pub supports_three_ds: bool,
    /// Whether recurring charges are supported.
    pub supports_recurring: bool,
    /// How redeemed tokens are materialized.
    pub tokenization_mode: TokenizationMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = HandlerConfig::default();
        assert_eq!(config.token_ttl_seconds, 900);
        assert_eq!(config.tokenization_mode, TokenizationMode::NetworkToken);
        assert!(!config.reject_unknown_card_networks);
        assert!(config.payment_methods.contains(&PaymentMethodKind::Card));
    }

    #[test]
    fn declaration_echoes_config() {
        let config = HandlerConfig {
            card_networks: vec![CardBrand::Visa],
            supports_recurring: true,
            ..HandlerConfig::default()
        };
        let declaration = config.declaration();
        assert_eq!(declaration.supported_card_networks, vec![CardBrand::Visa]);
        assert!(declaration.supports_recurring);
        assert_eq!(declaration.tokenization_mode, TokenizationMode::NetworkToken);
    }

    #[test]
    fn declaration_wire_shape_is_camel_case() {
        let json = serde_json::to_value(HandlerConfig::default().declaration()).unwrap();
        assert!(json.get("supportedCardNetworks").is_some());
        assert!(json.get("tokenizationMode").is_some());
        assert_eq!(json["supportedCardNetworks"][0], "VISA");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: HandlerConfig = toml::from_str("token_ttl_seconds = 300").unwrap();
        assert_eq!(config.token_ttl_seconds, 300);
        assert_eq!(config.name, "ucp-pay-vault");
    }
}

//! Tokenize/detokenize payload types.
//!
//! These are the stable data contracts between the route layer and the
//! vault. No wire format is mandated here; route layers marshal these
//! payloads to whatever transport they serve.
//!
//! Request types deliberately do not implement `Serialize`, and their
//! `Debug` representations redact card data, so raw PAN/CVV material
//! cannot leak through logging or response paths.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::card::CardBrand;
use crate::timestamp::UnixTimestamp;

/// Payment method kinds accepted by the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PaymentMethodKind {
    /// A raw payment card.
    Card,
    /// A Google Pay wallet token.
    GooglePay,
    /// An Apple Pay wallet token.
    ApplePay,
}

impl PaymentMethodKind {
    /// Returns the wire-format name of this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::GooglePay => "google_pay",
            Self::ApplePay => "apple_pay",
        }
    }
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw card fields as submitted by the caller.
///
/// All fields are optional at this layer; the tokenizer enforces presence
/// so that a missing field maps to a precise `MISSING_FIELD` failure
/// rather than a deserialization error.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    /// Primary account number.
    #[serde(default)]
    pub pan: Option<String>,
    /// Expiry month, 1-12.
    #[serde(default)]
    pub expiry_month: Option<u8>,
    /// Four-digit expiry year.
    #[serde(default)]
    pub expiry_year: Option<u16>,
    /// Card verification value.
    #[serde(default)]
    pub cvv: Option<String>,
    /// Name on the card.
    #[serde(default)]
    pub cardholder_name: Option<String>,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("pan", &self.pan.as_ref().map(|_| "[redacted]"))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &self.cvv.as_ref().map(|_| "[redacted]"))
            .field("cardholder_name", &self.cardholder_name)
            .finish()
    }
}

/// Source credential, discriminated by payment method type.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentCredential {
    /// Raw card fields.
    Card(CardDetails),
    /// An opaque Google Pay wallet token.
    GooglePay {
        /// The wallet-issued payment token.
        #[serde(default)]
        token: Option<String>,
    },
    /// An opaque Apple Pay wallet token.
    ApplePay {
        /// The wallet-issued payment token.
        #[serde(default)]
        token: Option<String>,
    },
}

impl PaymentCredential {
    /// Returns which payment method this credential carries.
    #[must_use]
    pub const fn method(&self) -> PaymentMethodKind {
        match self {
            Self::Card(_) => PaymentMethodKind::Card,
            Self::GooglePay { .. } => PaymentMethodKind::GooglePay,
            Self::ApplePay { .. } => PaymentMethodKind::ApplePay,
        }
    }
}

impl fmt::Debug for PaymentCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card(card) => f.debug_tuple("Card").field(card).finish(),
            Self::GooglePay { token } => f
                .debug_struct("GooglePay")
                .field("token", &token.as_ref().map(|_| "[redacted]"))
                .finish(),
            Self::ApplePay { token } => f
                .debug_struct("ApplePay")
                .field("token", &token.as_ref().map(|_| "[redacted]"))
                .finish(),
        }
    }
}

/// Identity of the business a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIdentity {
    /// Identity scheme (e.g. `"merchant_id"`), when the caller names one.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// The identity value the token is bound to.
    pub value: String,
}

/// Party a detokenization is delegated to (PSP delegation scenarios).
///
/// Logged for observability; does not alter binding validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedParty {
    /// Delegate type (e.g. `"psp"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Delegate identity.
    pub identity: String,
}

/// Request to exchange a source credential for a checkout-bound vault token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeRequest {
    /// The source credential to vault.
    pub credential: PaymentCredential,
    /// Checkout the token is scoped to.
    pub checkout_id: String,
    /// Business the token is scoped to.
    pub business_identity: BusinessIdentity,
    /// Caller metadata, passed through opaquely.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Non-sensitive display metadata derived from the source credential.
///
/// Never contains the PAN, the CVV, or any full card number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSummary {
    /// The payment method the instrument was derived from.
    pub method: PaymentMethodKind,
    /// Detected card network; absent for wallets and unrecognized prefixes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<CardBrand>,
    /// Last four digits of the PAN; absent for wallets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_digits: Option<String>,
    /// Card expiry month; absent for wallets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<u8>,
    /// Card expiry year; absent for wallets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<u16>,
}

impl InstrumentSummary {
    /// A generic wallet instrument carrying no card metadata.
    #[must_use]
    pub const fn wallet(method: PaymentMethodKind) -> Self {
        Self {
            method,
            brand: None,
            last_digits: None,
            expiry_month: None,
            expiry_year: None,
        }
    }
}

/// Successful tokenization result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeResponse {
    /// The opaque vault token.
    pub token: String,
    /// When the token expires.
    pub expires_at: UnixTimestamp,
    /// Non-sensitive instrument metadata.
    pub instrument: InstrumentSummary,
}

/// Request to redeem a vault token for processor-usable credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetokenizeRequest {
    /// The vault token to redeem.
    pub token: String,
    /// Checkout the caller claims the token is scoped to.
    pub checkout_id: String,
    /// Business the caller claims the token is scoped to.
    pub business_identity: BusinessIdentity,
    /// Optional delegation target, logged but not validated.
    #[serde(default)]
    pub delegated_to: Option<DelegatedParty>,
}

/// Processor-usable credential material, released exactly once per token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CredentialMaterial {
    /// A network-issued PAN substitute with its cryptogram.
    NetworkToken {
        /// The network token.
        network_token: String,
        /// Transaction cryptogram.
        cryptogram: String,
        /// Electronic commerce indicator.
        eci: String,
        /// Card expiry month, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiry_month: Option<u8>,
        /// Card expiry year, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiry_year: Option<u16>,
    },
    /// The raw PAN; only released in direct/PAN tokenization mode.
    Pan {
        /// Primary account number.
        pan: String,
        /// Card expiry month, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiry_month: Option<u8>,
        /// Card expiry year, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiry_year: Option<u16>,
    },
}

/// Successful detokenization result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetokenizeResponse {
    /// The released credential material.
    pub credential: CredentialMaterial,
    /// Always `true` on success: the token is dead regardless of
    /// credential type.
    pub invalidated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_credential_deserializes_from_tagged_json() {
        let json = r#"{
            "type": "card",
            "pan": "4111111111111111",
            "expiryMonth": 12,
            "expiryYear": 2028,
            "cvv": "123"
        }"#;
        let credential: PaymentCredential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.method(), PaymentMethodKind::Card);
        let PaymentCredential::Card(card) = credential else {
            panic!("expected card");
        };
        assert_eq!(card.pan.as_deref(), Some("4111111111111111"));
        assert_eq!(card.expiry_month, Some(12));
    }

    #[test]
    fn wallet_credential_tolerates_missing_token() {
        let credential: PaymentCredential =
            serde_json::from_str(r#"{"type": "google_pay"}"#).unwrap();
        assert_eq!(credential.method(), PaymentMethodKind::GooglePay);
    }

    #[test]
    fn debug_output_redacts_card_data() {
        let card: PaymentCredential = serde_json::from_str(
            r#"{"type": "card", "pan": "4111111111111111", "cvv": "123"}"#,
        )
        .unwrap();
        let rendered = format!("{card:?}");
        assert!(!rendered.contains("4111111111111111"));
        assert!(!rendered.contains("123"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn credential_material_wire_shape() {
        let material = CredentialMaterial::NetworkToken {
            network_token: "ntk_abc".into(),
            cryptogram: "AAAA".into(),
            eci: "05".into(),
            expiry_month: Some(12),
            expiry_year: Some(2028),
        };
        let json = serde_json::to_value(&material).unwrap();
        assert_eq!(json["type"], "network_token");
        assert_eq!(json["networkToken"], "ntk_abc");
        assert_eq!(json["expiryMonth"], 12);
    }

    #[test]
    fn business_identity_uses_type_key() {
        let identity: BusinessIdentity =
            serde_json::from_str(r#"{"type": "merchant_id", "value": "merchant_456"}"#).unwrap();
        assert_eq!(identity.kind.as_deref(), Some("merchant_id"));
        assert_eq!(identity.value, "merchant_456");
    }
}

//! Machine-readable error codes and the problem envelope.
//!
//! Every failure crossing the handler boundary is expressed as a
//! [`Problem`]: a stable envelope carrying a machine-readable [`ErrorCode`],
//! a human-readable message, a retryability flag, and optional field-level
//! detail. Operation-specific typed errors implement [`AsProblem`] to map
//! into it; no other error shape ever reaches a caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error codes for vault operations.
///
/// These codes allow callers to handle failure scenarios programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    /// A required request field is absent.
    MissingField,
    /// A request field is present but malformed.
    InvalidCredentials,
    /// The payment method type is not enabled for this handler.
    UnsupportedPaymentMethod,
    /// The detected card network is not enabled for this handler.
    UnsupportedCardNetwork,
    /// The token never existed or has been evicted; the two are
    /// indistinguishable by design.
    NotFound,
    /// The token existed but is dead (already used, or expired).
    Gone,
    /// The token's checkout binding does not match the request.
    Forbidden,
    /// Another caller won the atomic consume race for this token.
    Conflict,
    /// The token was consumed but credential delivery failed; the token is
    /// dead and the operation cannot be retried safely.
    ConsumedDeliveryFailed,
    /// Transient processor or store communication failure.
    NetworkError,
}

impl ErrorCode {
    /// Returns the wire-format string for this code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UnsupportedPaymentMethod => "UNSUPPORTED_PAYMENT_METHOD",
            Self::UnsupportedCardNetwork => "UNSUPPORTED_CARD_NETWORK",
            Self::NotFound => "NOT_FOUND",
            Self::Gone => "GONE",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::ConsumedDeliveryFailed => "CONSUMED_DELIVERY_FAILED",
            Self::NetworkError => "NETWORK_ERROR",
        }
    }

    /// Whether a caller may retry the same request after this failure.
    ///
    /// Only transient communication failures are retryable; every other
    /// code requires the caller to change the request or give up.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The typed error envelope returned by the handler facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Machine-readable failure code.
    pub code: ErrorCode,
    /// Human-readable detail.
    pub message: String,
    /// Whether the caller may retry with the same request.
    pub retryable: bool,
    /// The offending request field, when one can be named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Problem {
    /// Creates a problem with the retryability implied by its code.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
            field: None,
        }
    }

    /// Names the offending request field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {} (field: {field})", self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for Problem {}

/// Conversion of typed operation errors into the stable problem envelope.
pub trait AsProblem {
    /// Maps this error into its [`Problem`] form.
    fn as_problem(&self) -> Problem;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::UnsupportedCardNetwork).unwrap();
        assert_eq!(json, "\"UNSUPPORTED_CARD_NETWORK\"");
        assert_eq!(ErrorCode::Gone.as_str(), "GONE");
    }

    #[test]
    fn only_network_error_is_retryable() {
        assert!(ErrorCode::NetworkError.is_retryable());
        assert!(!ErrorCode::Gone.is_retryable());
        assert!(!ErrorCode::Conflict.is_retryable());
        assert!(!ErrorCode::ConsumedDeliveryFailed.is_retryable());
    }

    #[test]
    fn problem_envelope_shape() {
        let problem = Problem::new(ErrorCode::MissingField, "required field `pan` is missing")
            .with_field("pan");
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["code"], "MISSING_FIELD");
        assert_eq!(json["retryable"], false);
        assert_eq!(json["field"], "pan");
    }
}

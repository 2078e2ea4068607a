//! Typed operation errors and their problem-envelope mapping.
//!
//! Validation and binding checks fail fast as typed errors inside the
//! tokenizer and detokenizer; the handler facade converts them through
//! [`AsProblem`] into the stable envelope callers see. Infrastructure
//! failures (store, provider) map to the retryable `NETWORK_ERROR` class so
//! no internal error shape ever crosses the boundary.

use ucp_pay::error::{AsProblem, ErrorCode, Problem};
use ucp_pay::proto::PaymentMethodKind;

use crate::provider::ProviderError;
use crate::store::StoreError;

/// Failures of [`Tokenizer::tokenize`](crate::tokenizer::Tokenizer::tokenize).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TokenizeError {
    /// A required credential field is absent or empty.
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
    /// A credential field is present but malformed.
    #[error("invalid value for field `{0}`")]
    InvalidCredentials(&'static str),
    /// The payment method type is not in the handler's allow-list.
    #[error("payment method `{0}` is not enabled for this handler")]
    UnsupportedPaymentMethod(PaymentMethodKind),
    /// The detected card network is not in the handler's allow-list.
    #[error("card network `{0}` is not enabled for this handler")]
    UnsupportedCardNetwork(String),
    /// The processor could not vault the credential.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The token could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AsProblem for TokenizeError {
    fn as_problem(&self) -> Problem {
        match self {
            Self::MissingField(field) => {
                Problem::new(ErrorCode::MissingField, self.to_string()).with_field(*field)
            }
            Self::InvalidCredentials(field) => {
                Problem::new(ErrorCode::InvalidCredentials, self.to_string()).with_field(*field)
            }
            Self::UnsupportedPaymentMethod(_) => {
                Problem::new(ErrorCode::UnsupportedPaymentMethod, self.to_string())
            }
            Self::UnsupportedCardNetwork(_) => {
                Problem::new(ErrorCode::UnsupportedCardNetwork, self.to_string())
            }
            Self::Provider(_) | Self::Store(_) => {
                Problem::new(ErrorCode::NetworkError, "processor communication failure")
            }
        }
    }
}

/// Failures of
/// [`Detokenizer::detokenize`](crate::detokenizer::Detokenizer::detokenize).
///
/// Each lifecycle check is a distinct variant so observability can tell
/// them apart even where the wire code is shared.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DetokenizeError {
    /// The token never existed or has been evicted — indistinguishable by
    /// design.
    #[error("token not found")]
    NotFound,
    /// The token has already been redeemed.
    #[error("token already used")]
    AlreadyUsed,
    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,
    /// The request's checkout does not match the token's binding.
    #[error("checkoutId mismatch")]
    CheckoutMismatch,
    /// The request's business identity does not match the token's binding.
    #[error("businessIdentity mismatch")]
    BusinessMismatch,
    /// Another concurrent caller won the atomic consume race.
    #[error("token no longer available")]
    ConsumeRace,
    /// Raw PAN release was requested but the handler is not configured for
    /// direct/PAN mode.
    #[error("raw PAN release is not permitted in this tokenization mode")]
    PanModeDisabled,
    /// The consume succeeded but the processor failed to deliver credential
    /// material; the token is dead and the call must not be retried.
    #[error("token consumed but credential delivery failed: {0}")]
    ConsumedUndelivered(#[source] ProviderError),
    /// The store could not be reached.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AsProblem for DetokenizeError {
    fn as_problem(&self) -> Problem {
        match self {
            Self::NotFound => Problem::new(ErrorCode::NotFound, self.to_string()),
            Self::AlreadyUsed | Self::Expired => Problem::new(ErrorCode::Gone, self.to_string()),
            Self::CheckoutMismatch | Self::BusinessMismatch | Self::PanModeDisabled => {
                Problem::new(ErrorCode::Forbidden, self.to_string())
            }
            Self::ConsumeRace => Problem::new(ErrorCode::Conflict, self.to_string()),
            Self::ConsumedUndelivered(_) => {
                Problem::new(ErrorCode::ConsumedDeliveryFailed, self.to_string())
            }
            Self::Store(_) => {
                Problem::new(ErrorCode::NetworkError, "processor communication failure")
            }
        }
    }
}

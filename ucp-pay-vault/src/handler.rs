//! The externally visible handler facade.
//!
//! [`PaymentHandler`] is the single entry point route layers compose
//! against: a capability declaration plus tokenize, detokenize, and
//! invalidate operations. It holds no mutable state beyond its immutable
//! configuration, and it is the error-normalization boundary — typed
//! domain errors pass through as their problem form, while infrastructure
//! failures surface as one retryable processor-communication problem so no
//! internal error shape ever reaches a caller.

use std::fmt;
use std::sync::Arc;

use tracing::error;

use ucp_pay::config::{HandlerConfig, HandlerDeclaration};
use ucp_pay::error::{AsProblem, Problem};
use ucp_pay::proto::{
    DetokenizeRequest, DetokenizeResponse, TokenizeRequest, TokenizeResponse,
};

use crate::detokenizer::Detokenizer;
use crate::provider::ProviderClient;
use crate::store::TokenStore;
use crate::tokenizer::Tokenizer;

/// The payment handler facade.
///
/// Construct once at composition time with the configuration and the store
/// and provider capabilities; every operation is safe to call concurrently.
pub struct PaymentHandler {
    config: Arc<HandlerConfig>,
    tokenizer: Tokenizer,
    detokenizer: Detokenizer,
}

impl fmt::Debug for PaymentHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentHandler")
            .field("name", &self.config.name)
            .field("tokenization_mode", &self.config.tokenization_mode)
            .finish_non_exhaustive()
    }
}

impl PaymentHandler {
    /// Assembles the handler from its configuration and capabilities.
    #[must_use]
    pub fn new(
        config: HandlerConfig,
        store: Arc<dyn TokenStore>,
        provider: Arc<dyn ProviderClient>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            tokenizer: Tokenizer::new(
                Arc::clone(&config),
                Arc::clone(&store),
                Arc::clone(&provider),
            ),
            detokenizer: Detokenizer::new(Arc::clone(&config), store, provider),
            config,
        }
    }

    /// Returns the static capability declaration. No I/O.
    #[must_use]
    pub fn declaration(&self) -> HandlerDeclaration {
        self.config.declaration()
    }

    /// Exchanges a source credential for an opaque, checkout-bound token.
    ///
    /// # Errors
    ///
    /// Returns a [`Problem`] envelope; see
    /// [`ErrorCode`](ucp_pay::error::ErrorCode) for the taxonomy.
    pub async fn tokenize(&self, request: TokenizeRequest) -> Result<TokenizeResponse, Problem> {
        self.tokenizer
            .tokenize(request)
            .await
            .map_err(|err| normalize("tokenize", &err))
    }

    /// Redeems a token exactly once for processor credential material.
    ///
    /// # Errors
    ///
    /// Returns a [`Problem`] envelope; see
    /// [`ErrorCode`](ucp_pay::error::ErrorCode) for the taxonomy.
    pub async fn detokenize(
        &self,
        request: DetokenizeRequest,
    ) -> Result<DetokenizeResponse, Problem> {
        self.detokenizer
            .detokenize(request)
            .await
            .map_err(|err| normalize("detokenize", &err))
    }

    /// Deletes a stored token outright (e.g. on checkout cancellation),
    /// independent of its used or expiry state.
    ///
    /// # Errors
    ///
    /// Returns a retryable [`Problem`] if the store cannot be reached.
    pub async fn invalidate_token(&self, checkout_id: &str, token: &str) -> Result<bool, Problem> {
        self.detokenizer
            .invalidate(checkout_id, token)
            .await
            .map_err(|err| normalize("invalidate_token", &err))
    }
}

/// Maps a typed operation error to the caller-facing envelope, recording
/// the internal detail for failures that get normalized away.
fn normalize<E>(operation: &'static str, err: &E) -> Problem
where
    E: AsProblem + fmt::Display,
{
    let problem = err.as_problem();
    if problem.retryable {
        error!(%operation, %err, "internal failure normalized to retryable problem");
    }
    problem
}

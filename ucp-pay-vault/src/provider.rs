//! Processor collaborator capability.
//!
//! The vault never talks to the card networks itself; it delegates credential
//! vaulting and retrieval to the e-commerce provider through this narrow
//! seam. Provider failures surface as a single transient error type — retry
//! policy belongs to the provider client implementation or the caller, never
//! to the vault.

use async_trait::async_trait;
use std::fmt;

use ucp_pay::proto::PaymentCredential;

/// Transient failure reaching the upstream processor.
#[derive(Debug, Clone, thiserror::Error)]
#[error("provider call failed: {reason}")]
pub struct ProviderError {
    /// What went wrong, for logs and problem messages.
    pub reason: String,
}

impl ProviderError {
    /// Creates a provider error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Network-token material minted by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTokenData {
    /// The network-issued PAN substitute.
    pub token: String,
    /// Transaction cryptogram.
    pub cryptogram: String,
    /// Electronic commerce indicator.
    pub eci: String,
}

/// Raw PAN material retrieved from the processor vault.
#[derive(Clone)]
pub struct PanData {
    /// Primary account number.
    pub pan: String,
}

impl fmt::Debug for PanData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanData").field("pan", &"[redacted]").finish()
    }
}

/// Client for the e-commerce provider's credential vault.
///
/// Implementations own transport, authentication, and retry/backoff; the
/// vault engine treats every call as a single fallible async operation.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Vaults the source credential with the processor, returning an opaque
    /// processor-side reference.
    async fn mint_credential(
        &self,
        credential: &PaymentCredential,
    ) -> Result<String, ProviderError>;

    /// Fetches network-token material for a previously minted credential.
    async fn fetch_network_token(
        &self,
        credential_ref: &str,
    ) -> Result<NetworkTokenData, ProviderError>;

    /// Fetches the raw PAN for a previously minted credential. Only called
    /// when the handler is configured for direct/PAN mode.
    async fn fetch_pan(&self, credential_ref: &str) -> Result<PanData, ProviderError>;
}

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Checkout-scoped payment tokenization engine for the UCP protocol.
//!
//! This crate converts raw or third-party payment credentials into opaque,
//! checkout-scoped vault tokens and later redeems each token exactly once
//! for processor-usable credential material. Tokens are bound to a
//! `{checkout, business}` pair, expire after a fixed TTL, and die on their
//! first successful redemption; the single-use guarantee holds under
//! arbitrary concurrency because the consume step is one atomic
//! conditional write against the store.
//!
//! # Architecture
//!
//! The engine is assembled from injected capabilities — no component reads
//! ambient global state:
//!
//! - [`store::TokenStore`] — TTL-scoped key-value persistence with an
//!   atomic consume primitive
//! - [`provider::ProviderClient`] — the e-commerce processor's credential
//!   vault (minting, network tokens, PAN retrieval)
//! - [`handler::PaymentHandler`] — the single externally visible entry
//!   point, bundling the capability declaration with tokenize, detokenize,
//!   and invalidate operations behind an error-normalization boundary
//!
//! # Modules
//!
//! - [`config`] — TOML configuration loading with environment expansion
//! - [`detokenizer`] — single-use token redemption
//! - [`error`] — typed operation errors and their problem-envelope mapping
//! - [`handler`] — the externally visible handler facade
//! - [`provider`] — processor collaborator capability
//! - [`store`] — token store capability and the in-memory implementation
//! - [`token`] — the persisted token model
//! - [`tokenizer`] — credential validation and token issuance

pub mod config;
pub mod detokenizer;
pub mod error;
pub mod handler;
pub mod provider;
pub mod store;
pub mod token;
pub mod tokenizer;

pub use handler::PaymentHandler;

#[cfg(test)]
mod testutil;

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the UCP payment tokenization protocol.
//!
//! This crate provides the foundational types shared by every consumer of the
//! UCP payment vault: wire payloads, the error taxonomy, checkout-binding
//! primitives, and card network classification. It is transport-agnostic —
//! route layers marshal these payloads to whatever wire format they choose,
//! and the vault engine lives in the separate `ucp-pay-vault` crate.
//!
//! # Overview
//!
//! UCP exposes a merchant's commerce backend to third-party agent platforms.
//! Payment credentials submitted through that surface are exchanged for
//! opaque, checkout-scoped vault tokens; the vault later redeems each token
//! exactly once for processor-usable credential material.
//!
//! # Modules
//!
//! - [`binding`] - Secret-bound, tamper-evident tokens for checkout-scoped artifacts
//! - [`card`] - Card network detection from PAN prefixes
//! - [`config`] - Handler configuration and the capability declaration
//! - [`error`] - Machine-readable error codes and the problem envelope
//! - [`proto`] - Tokenize/detokenize payload types
//! - [`timestamp`] - Unix timestamp wire type for token lifetime windows

pub mod binding;
pub mod card;
pub mod config;
pub mod error;
pub mod proto;
pub mod timestamp;

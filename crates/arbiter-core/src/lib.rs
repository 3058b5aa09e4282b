//! # arbiter-core: Foundational Types for the Ruling Engine
//!
//! This crate is the leaf of the arbiter workspace. It defines the
//! primitives every other crate relies on to keep ruling records
//! reproducible and identifiers unambiguous.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every digest in the system is computed
//!    over bytes produced by `CanonicalBytes::new()`: sorted keys, compact
//!    separators, no floats. Two logically equal payloads always hash the
//!    same.
//!
//! 2. **`PayloadHash` is a validated Hex64.** A payload hash is exactly 64
//!    lowercase hex characters. It can be computed from canonical bytes or
//!    parsed from an external record, never assembled by hand.
//!
//! 3. **Newtype wrappers for identifiers.** `DisputeId`, `ProposalId`, and
//!    `SafeAddress` are non-empty, trimmed strings. You cannot pass a
//!    proposal id where a dispute id is expected.
//!
//! 4. **Explicit configuration.** `Settings` is built once at startup and
//!    passed by reference. There is no process-wide settings cache.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `arbiter-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod canonical;
pub mod config;
pub mod digest;
pub mod error;
pub mod identity;

// Re-export primary types for ergonomic imports.
pub use address::{normalize_address, AddressValidator, Base58AddressValidator};
pub use canonical::CanonicalBytes;
pub use config::{redact_sensitive, Settings};
pub use digest::{sha256_digest, sha256_hex, sha256_raw_hex, PayloadHash};
pub use error::{ArbiterError, CanonicalizationError, ConfigError, ValidationError};
pub use identity::{DisputeId, ProposalId, SafeAddress};

//! # Identifier Newtypes
//!
//! Newtype wrappers for the identifiers that bind a ruling to its dispute
//! and governance proposal. These prevent accidental identifier confusion:
//! a `ProposalId` cannot be passed where a `DisputeId` is expected.
//!
//! All identifiers are trimmed at construction and must be non-empty.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! non_empty_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create the identifier from a raw string, trimming surrounding
            /// whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::Required`] if the value is empty
            /// after trimming.
            pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::Required($field));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Access the identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

non_empty_id!(
    /// Identifier of a dispute under arbitration.
    DisputeId,
    "dispute_id"
);

non_empty_id!(
    /// Identifier of a governance proposal.
    ProposalId,
    "proposal_id"
);

non_empty_id!(
    /// The safe (treasury vault) a disputed payout belongs to.
    SafeAddress,
    "safe"
);

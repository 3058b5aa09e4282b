//! # Address Normalization
//!
//! Wallet and account identifiers are opaque to the ruling engine once they
//! have been normalized. The engine only depends on the
//! [`AddressValidator`] seam; [`Base58AddressValidator`] is the default used
//! by the CLI and accepts only strings that base58-decode to a 32-byte
//! ledger public key.

use crate::error::ValidationError;

/// Decoded length of a ledger public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Validates and normalizes an externally supplied address string.
pub trait AddressValidator: Send + Sync {
    /// Return the normalized address, or a validation error naming `field`.
    fn normalize(&self, raw: &str, field: &str) -> Result<String, ValidationError>;
}

/// Default validator: trimmed, base58, decoding to exactly
/// [`PUBLIC_KEY_LEN`] bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base58AddressValidator;

impl AddressValidator for Base58AddressValidator {
    fn normalize(&self, raw: &str, field: &str) -> Result<String, ValidationError> {
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Err(ValidationError::MissingAddress {
                field: field.to_string(),
            });
        }
        let decodes_to_key = bs58::decode(candidate)
            .into_vec()
            .is_ok_and(|bytes| bytes.len() == PUBLIC_KEY_LEN);
        if !decodes_to_key {
            return Err(ValidationError::InvalidAddress {
                field: field.to_string(),
            });
        }
        Ok(candidate.to_string())
    }
}

/// Normalize an address with the default validator.
pub fn normalize_address(raw: &str, field: &str) -> Result<String, ValidationError> {
    Base58AddressValidator.normalize(raw, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw";

    #[test]
    fn accepts_base58_key_and_trims() {
        assert_eq!(normalize_address(&format!("  {KEY} "), "voter").unwrap(), KEY);
    }

    #[test]
    fn rejects_empty_with_required_message() {
        let err = normalize_address("   ", "voter").unwrap_err();
        assert_eq!(err.to_string(), "voter is required");
    }

    #[test]
    fn rejects_non_base58_characters() {
        let bad = format!("0{}", &KEY[1..]);
        let err = normalize_address(&bad, "resolver_address").unwrap_err();
        assert_eq!(err.to_string(), "resolver_address must be a valid public key");
    }

    #[test]
    fn rejects_short_values() {
        assert!(normalize_address("abc", "voter").is_err());
    }

    #[test]
    fn rejects_base58_that_decodes_past_32_bytes() {
        let wide = "z".repeat(44);
        let err = normalize_address(&wide, "resolver_address").unwrap_err();
        assert_eq!(err.to_string(), "resolver_address must be a valid public key");
    }

    #[test]
    fn accepts_all_zero_key() {
        let zero = "1".repeat(32);
        assert_eq!(normalize_address(&zero, "voter").unwrap(), zero);
    }
}

//! Random password generation for account creation and rotation.

use demo_core::error::{DemoError, DemoResult};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::{CapabilityDetails, CredentialOption, CredentialOptions, PlaintextData};

/// Shortest password the generator will produce.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}";

/// Both account creation and rotation accept either option and prefer a
/// random password.
pub fn password_capability() -> CapabilityDetails {
    CapabilityDetails {
        supported: vec![CredentialOption::RandomPassword, CredentialOption::NoPassword],
        preferred: CredentialOption::RandomPassword,
    }
}

/// Generate a password of `length` characters containing at least one
/// lowercase letter, uppercase letter, digit and symbol.
pub fn generate_password(length: usize) -> DemoResult<String> {
    if length < MIN_PASSWORD_LENGTH {
        return Err(DemoError::Validation {
            message: format!(
                "password length {length} is below the minimum of {MIN_PASSWORD_LENGTH}"
            ),
        });
    }

    let mut rng = rand::rng();
    let classes = [LOWER, UPPER, DIGITS, SYMBOLS];
    let all: Vec<u8> = classes.concat();

    let mut bytes: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.random_range(0..class.len())])
        .collect();
    while bytes.len() < length {
        bytes.push(all[rng.random_range(0..all.len())]);
    }
    bytes.shuffle(&mut rng);

    String::from_utf8(bytes).map_err(|e| DemoError::Internal(e.to_string()))
}

/// Produce the plaintext password requested by `options`, if any.
pub fn password_for(options: CredentialOptions) -> DemoResult<Option<String>> {
    match options {
        CredentialOptions::RandomPassword { length } => generate_password(length).map(Some),
        CredentialOptions::NoPassword => Ok(None),
    }
}

pub fn password_plaintext(password: &str) -> PlaintextData {
    PlaintextData {
        name: "password".into(),
        bytes: password.as_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_password_has_requested_length_and_classes() {
        let pw = generate_password(16).unwrap();
        assert_eq!(pw.len(), 16);
        assert!(pw.bytes().any(|b| LOWER.contains(&b)));
        assert!(pw.bytes().any(|b| UPPER.contains(&b)));
        assert!(pw.bytes().any(|b| DIGITS.contains(&b)));
        assert!(pw.bytes().any(|b| SYMBOLS.contains(&b)));
    }

    #[test]
    fn passwords_differ() {
        assert_ne!(generate_password(20).unwrap(), generate_password(20).unwrap());
    }

    #[test]
    fn short_length_is_rejected() {
        assert!(matches!(
            generate_password(4),
            Err(DemoError::Validation { .. })
        ));
    }

    #[test]
    fn no_password_option_yields_nothing() {
        assert_eq!(password_for(CredentialOptions::NoPassword).unwrap(), None);
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Participant secret generation and hashing.
//!
//! Hashes use the `$2y$` prefix so DOMjudge's PHP login accepts them.

use contestreg_domain::Secret;

use crate::error::PersistenceError;

/// Length of a generated secret.
pub const SECRET_LENGTH: usize = 10;

/// bcrypt work factor for stored secrets.
pub const SECRET_HASH_COST: u32 = 10;

const SECRET_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!@#$%^&*-+;()";

/// Generates a random secret of `SECRET_LENGTH` characters.
///
/// Random bytes are masked to 7 bits and rejected when they fall outside the
/// alphabet, so every character is equally likely.
#[must_use]
pub fn generate_secret() -> Secret {
    let mut secret: String = String::with_capacity(SECRET_LENGTH);
    while secret.len() < SECRET_LENGTH {
        let index: usize = usize::from(rand::random::<u8>() & 0x7f);
        if let Some(&byte) = SECRET_ALPHABET.get(index) {
            secret.push(char::from(byte));
        }
    }
    Secret::new(secret)
}

/// Hashes a secret with bcrypt.
///
/// # Errors
///
/// Returns `PersistenceError::SecretHashFailed` if hashing fails.
pub fn hash_secret(secret: &Secret) -> Result<String, PersistenceError> {
    bcrypt::hash_with_result(secret.expose(), SECRET_HASH_COST)
        .map(|parts| parts.format_for_version(bcrypt::Version::TwoY))
        .map_err(|e| PersistenceError::SecretHashFailed(e.to_string()))
}

/// Checks a plaintext secret against a stored hash.
///
/// # Errors
///
/// Returns `PersistenceError::SecretVerifyFailed` if the hash is malformed.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(secret, hash).map_err(|e| PersistenceError::SecretVerifyFailed(e.to_string()))
}

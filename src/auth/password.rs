use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;

// Stand-in hash so logins for unknown usernames cost the same as real ones
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("attendance-dummy-password").unwrap_or_default());

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

/// Runs a full verification against a throwaway hash and discards the result.
pub fn burn_verification(password: &str) {
    let _ = verify_password(password, &DUMMY_HASH);
}

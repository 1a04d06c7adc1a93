use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a raw password with Argon2id and a fresh random salt. Two hashes of
/// the same password therefore differ; comparison only works via
/// `password_matches`.
pub fn hash_password(raw: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default().hash_password(raw.as_bytes(), &salt)?;
    Ok(digest.to_string())
}

pub fn password_matches(raw: &str, digest: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(digest)?;
    Ok(Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok())
}

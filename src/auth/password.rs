use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    static ref HASHER: Argon2<'static> = Argon2::default();
    static ref DUMMY_HASH: Option<String> = hash_password("not-a-real-password").ok();
}

fn argon2_failure(op: &'static str) -> impl FnOnce(password_hash::Error) -> anyhow::Error {
    move |e| {
        error!(error = %e, op, "argon2 failure");
        anyhow::anyhow!("argon2 {op}: {e}")
    }
}

/// Hashes `plain` into a PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    HASHER
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(argon2_failure("hash"))
}

/// `Ok(false)` is a wrong password; `Err` means the stored hash is unusable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(argon2_failure("parse"))?;
    match HASHER.verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(argon2_failure("verify")(e)),
    }
}

/// Burns the same time as a real verification when the user does not exist.
pub fn verify_against_dummy(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}

use log::error;

/// Hash a password with bcrypt (salt generated per call).
pub fn hash(password: &str) -> Result<String, ()> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| {
        error!("couldn't hash password: {e:?}");
    })
}

/// Verify a password against a stored bcrypt hash.
/// A malformed stored hash counts as a failed verification.
pub fn verify(password: &str, pwhash: &str) -> bool {
    match bcrypt::verify(password, pwhash) {
        Ok(ok) => ok,
        Err(e) => {
            error!("couldn't verify password hash: {e:?}");
            false
        }
    }
}

// [libs/core/crypto/src/token.rs]
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generates the `<id>.<secret>` pair for a new opaque bearer token.
/// `id` is a lookup key (safe to index on, not secret by itself);
/// `secret` is the half that gets hashed and never stored.
pub fn generate_opaque_token() -> (String, String) {
    let mut id_bytes = [0u8; 16];
    let mut secret_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut id_bytes);
    rand::rngs::OsRng.fill_bytes(&mut secret_bytes);
    (hex::encode(id_bytes), hex::encode(secret_bytes))
}

/// HMAC-SHA256 of `secret` keyed on the server-side pepper, hex-encoded.
/// This is what gets persisted alongside a token's `id` — the secret
/// itself never touches storage.
pub fn hash_token(pepper: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(pepper.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(secret.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison between a freshly hashed secret and the
/// stored digest, so a timing side channel can't leak how many leading
/// hex characters matched.
pub fn verify_token(pepper: &str, secret: &str, stored_hash: &str) -> bool {
    let candidate = hash_token(pepper, secret);
    constant_time_eq(candidate.as_bytes(), stored_hash.as_bytes())
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_the_correct_secret_and_rejects_others() {
        let pepper = "pepper-value";
        let (_, secret) = generate_opaque_token();
        let hash = hash_token(pepper, &secret);

        assert!(verify_token(pepper, &secret, &hash));
        assert!(!verify_token(pepper, "wrong-secret", &hash));
    }

    #[test]
    fn different_peppers_produce_different_hashes() {
        let secret = "same-secret";
        assert_ne!(hash_token("pepper-a", secret), hash_token("pepper-b", secret));
    }
}

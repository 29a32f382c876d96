// [libs/core/crypto/src/encryption.rs]
use crate::error::CryptoError;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const NONCE_LEN: usize = 12;
const CURRENT_PREFIX: &str = "aesgcm:";
const LEGACY_PREFIX: &str = "enc:";
/// PBKDF2 iteration count the legacy scheme used to stretch a master
/// passphrase into a key. The current scheme takes a 32-byte key
/// directly and does no stretching — `ENCRYPTION_KEY` is expected to
/// already be high-entropy random bytes, not a human passphrase.
const LEGACY_PBKDF2_ITERATIONS: u32 = 100_000;

#[derive(Clone)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Decodes a standard-base64-encoded 32-byte key, the `ENCRYPTION_KEY`
    /// wire form (44 characters including padding).
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::BadKeyEncoding(e.to_string()))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::BadKeyLength)?;
        Ok(Self(bytes))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

/// Encrypts `plaintext` into the current envelope format
/// `"aesgcm:<base64 of nonce || ciphertext>"`. An empty string is a no-op
/// passthrough — callers never have to special-case unset secrets.
pub fn encrypt(key: &EncryptionKey, plaintext: &str) -> Result<String, CryptoError> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = key
        .cipher()
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::DecryptionFailed)?;

    let mut payload = nonce_bytes.to_vec();
    payload.extend(ciphertext);
    Ok(format!("{CURRENT_PREFIX}{}", BASE64.encode(payload)))
}

/// Decrypts a value produced by [`encrypt`], or one still stored in the
/// legacy `"enc:"` envelope from before the scheme migrated off
/// passphrase-derived keys. Legacy values are decoded but never
/// re-emitted in legacy form — see [`crate::dict::encrypt_dict`], which
/// re-encrypts anything it touches into the current format.
pub fn decrypt(key: &EncryptionKey, value: &str) -> Result<String, CryptoError> {
    if value.is_empty() {
        return Ok(String::new());
    }

    if let Some(encoded) = value.strip_prefix(CURRENT_PREFIX) {
        return decrypt_envelope(key, encoded);
    }

    if let Some(encoded) = value.strip_prefix(LEGACY_PREFIX) {
        let legacy_key = derive_legacy_key(key);
        return decrypt_envelope(&legacy_key, encoded);
    }

    Err(CryptoError::UnknownFormat)
}

fn decrypt_envelope(key: &EncryptionKey, base64_payload: &str) -> Result<String, CryptoError> {
    let payload = BASE64
        .decode(base64_payload)
        .map_err(|_| CryptoError::MalformedCiphertext)?;
    if payload.len() < NONCE_LEN {
        return Err(CryptoError::MalformedCiphertext);
    }
    let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = key
        .cipher()
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::MalformedCiphertext)
}

/// Stretches the current key through the legacy PBKDF2 scheme so values
/// written before the format migration still decrypt.
fn derive_legacy_key(key: &EncryptionKey) -> EncryptionKey {
    let mut derived = [0u8; 32];
    pbkdf2_hmac::<Sha256>(&key.0, b"incidentfox-legacy-salt", LEGACY_PBKDF2_ITERATIONS, &mut derived);
    EncryptionKey(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_plaintext_value() {
        let key = EncryptionKey::generate();
        let ciphertext = encrypt(&key, "xoxb-bot-token").unwrap();
        assert!(ciphertext.starts_with(CURRENT_PREFIX));
        assert_eq!(decrypt(&key, &ciphertext).unwrap(), "xoxb-bot-token");
    }

    #[test]
    fn empty_string_is_a_no_op() {
        let key = EncryptionKey::generate();
        assert_eq!(encrypt(&key, "").unwrap(), "");
        assert_eq!(decrypt(&key, "").unwrap(), "");
    }

    #[test]
    fn unrecognized_prefix_is_rejected() {
        let key = EncryptionKey::generate();
        assert!(matches!(decrypt(&key, "plain-text-value"), Err(CryptoError::UnknownFormat)));
    }

    #[test]
    fn legacy_envelope_decodes_via_the_stretched_key() {
        let key = EncryptionKey::generate();
        let legacy_key = derive_legacy_key(&key);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = legacy_key.cipher().encrypt(nonce, b"legacy-secret".as_ref()).unwrap();
        let mut payload = nonce_bytes.to_vec();
        payload.extend(ciphertext);
        let wire = format!("{LEGACY_PREFIX}{}", BASE64.encode(payload));

        assert_eq!(decrypt(&key, &wire).unwrap(), "legacy-secret");
    }

    #[test]
    fn key_base64_round_trips_at_44_characters() {
        let key = EncryptionKey::generate();
        let encoded = key.to_base64();
        assert_eq!(encoded.len(), 44);
        assert!(EncryptionKey::from_base64(&encoded).is_ok());
    }
}

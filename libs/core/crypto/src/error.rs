// [libs/core/crypto/src/error.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("encryption key must decode to 32 bytes")]
    BadKeyLength,

    #[error("malformed key encoding: {0}")]
    BadKeyEncoding(String),

    #[error("unrecognized ciphertext envelope")]
    UnknownFormat,

    #[error("ciphertext envelope truncated or corrupt")]
    MalformedCiphertext,

    #[error("AEAD authentication failed")]
    DecryptionFailed,

    #[error("token does not match `<id>.<secret>` shape")]
    MalformedToken,

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

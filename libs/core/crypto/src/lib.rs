// [libs/core/crypto/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CORE CRYPTO MASTER HUB (V1.4 - SOBERANO)
 * CLASIFICACIÓN: CORE PRIMITIVE (ESTRATO L1)
 * RESPONSABILIDAD: CIFRADO EN REPOSO, HASHING DE TOKENS Y JWT DE CORTA VIDA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. ENVOLVENTE ÚNICA: Todo secreto de integración que toca el disco pasa
 *    por 'encryption'/'dict' antes de llegar al store; nunca texto plano.
 * 2. TECHOS DE VIDA ESTRICTOS: 'jwt' impone 'IMPERSONATION_MAX_TTL_SECONDS'
 *    y 'SANDBOX_MAX_TTL_SECONDS' en la mintería, no en el verificador.
 * 3. NOMINAL PURITY: Cero abreviaciones en la superficie pública.
 *
 * # Mathematical Proof (Key Separation):
 * 'IMPERSONATION_AUDIENCE' y 'SANDBOX_AUDIENCE' son cadenas distintas
 * fijadas en tiempo de compilación, de modo que un token minteado para
 * una audiencia jamás supera la verificación de la otra.
 * =================================================================
 */

/// Cifrado/descifrado de diccionarios de configuración campo por campo.
pub mod dict;
/// Primitiva AEAD de sobre simple sobre una clave base64 de proceso.
pub mod encryption;
pub mod error;
/// Minteo y verificación de JWT de impersonación y sandbox de corta vida.
pub mod jwt;
/// Generación y hashing con pepper de tokens opacos portadores.
pub mod token;

pub use dict::{decrypt_dict, encrypt_dict};
pub use encryption::{decrypt, encrypt, EncryptionKey};
pub use error::CryptoError;
pub use jwt::{
    mint_impersonation_token, mint_sandbox_token, verify_impersonation_token, verify_sandbox_token,
    ImpersonationClaims, SandboxClaims, IMPERSONATION_AUDIENCE, IMPERSONATION_MAX_TTL_SECONDS,
    SANDBOX_AUDIENCE, SANDBOX_MAX_TTL_SECONDS,
};
pub use token::{constant_time_eq, generate_opaque_token, hash_token, verify_token};

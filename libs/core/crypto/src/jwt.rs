// [libs/core/crypto/src/jwt.rs]
use crate::error::CryptoError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const IMPERSONATION_AUDIENCE: &str = "agent-runtime";
pub const SANDBOX_AUDIENCE: &str = "credential-proxy";
pub const IMPERSONATION_MAX_TTL_SECONDS: i64 = 600;
pub const SANDBOX_MAX_TTL_SECONDS: i64 = 900;

/// Claims of a team-impersonation token: read-only access to one node's
/// effective config, minted by an admin-or-org-admin principal on a
/// team's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpersonationClaims {
    pub sub: Uuid,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
}

/// Claims of a sandbox token: scoped to one agent run, used by the agent
/// runtime to authenticate to the credential proxy for the run's
/// duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxClaims {
    pub sub: Uuid,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub run_id: Uuid,
}

/// Mints an impersonation JWT for `node_id`, capped at
/// [`IMPERSONATION_MAX_TTL_SECONDS`] regardless of the requested TTL.
/// Returns the signed token and the `jti` the caller should record if
/// the JTI allowlist is enabled.
pub fn mint_impersonation_token(
    signing_secret: &str,
    node_id: Uuid,
    requested_ttl_seconds: i64,
) -> Result<(String, Uuid), CryptoError> {
    let ttl = requested_ttl_seconds.clamp(1, IMPERSONATION_MAX_TTL_SECONDS);
    let now = Utc::now();
    let jti = Uuid::new_v4();
    let claims = ImpersonationClaims {
        sub: node_id,
        aud: IMPERSONATION_AUDIENCE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl)).timestamp(),
        jti,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_secret.as_bytes()),
    )?;
    Ok((token, jti))
}

pub fn verify_impersonation_token(signing_secret: &str, token: &str) -> Result<ImpersonationClaims, CryptoError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[IMPERSONATION_AUDIENCE]);
    let data = decode::<ImpersonationClaims>(
        token,
        &DecodingKey::from_secret(signing_secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

pub fn mint_sandbox_token(
    signing_secret: &str,
    node_id: Uuid,
    run_id: Uuid,
    requested_ttl_seconds: i64,
) -> Result<String, CryptoError> {
    let ttl = requested_ttl_seconds.clamp(1, SANDBOX_MAX_TTL_SECONDS);
    let now = Utc::now();
    let claims = SandboxClaims {
        sub: node_id,
        aud: SANDBOX_AUDIENCE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl)).timestamp(),
        run_id,
    };
    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_secret.as_bytes()),
    )?)
}

pub fn verify_sandbox_token(signing_secret: &str, token: &str) -> Result<SandboxClaims, CryptoError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[SANDBOX_AUDIENCE]);
    let data = decode::<SandboxClaims>(
        token,
        &DecodingKey::from_secret(signing_secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impersonation_ttl_is_clamped_to_ten_minutes() {
        let (token, _) = mint_impersonation_token("secret", Uuid::new_v4(), 999_999).unwrap();
        let claims = verify_impersonation_token("secret", &token).unwrap();
        assert!(claims.exp - claims.iat <= IMPERSONATION_MAX_TTL_SECONDS);
    }

    #[test]
    fn sandbox_token_carries_run_id_and_is_rejected_by_the_wrong_audience_check() {
        let run_id = Uuid::new_v4();
        let token = mint_sandbox_token("secret", Uuid::new_v4(), run_id, 900).unwrap();
        let claims = verify_sandbox_token("secret", &token).unwrap();
        assert_eq!(claims.run_id, run_id);
        assert!(verify_impersonation_token("secret", &token).is_err());
    }

    #[test]
    fn wrong_signing_secret_is_rejected() {
        let (token, _) = mint_impersonation_token("secret", Uuid::new_v4(), 60).unwrap();
        assert!(verify_impersonation_token("wrong-secret", &token).is_err());
    }
}

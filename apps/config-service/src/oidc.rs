// [apps/config-service/src/oidc.rs]
use crate::settings::Settings;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

/// Claims common to both an admin-group OIDC token and a team-scoped one;
/// which fields are present (and which branch accepts the token) depends
/// on which claim names `OIDC_ORG_ID_CLAIM`/`OIDC_TEAM_NODE_ID_CLAIM` and
/// an admin-group claim resolve to.
#[derive(Debug, Clone)]
pub struct OidcClaims {
    pub subject: String,
    pub org_id: Option<Uuid>,
    pub team_node_id: Option<Uuid>,
    pub is_admin: bool,
}

/// Verifies `token`'s signature against `OIDC_JWKS_JSON` and its audience
/// and issuer against the configured values. This is JWKS-verification
/// only — there is no token issuance, discovery-document fetching, or
/// refresh here.
pub fn verify(token: &str, settings: &Settings) -> Option<OidcClaims> {
    let jwks_json = settings.oidc_jwks_json.as_deref()?;
    let jwks: Jwks = serde_json::from_str(jwks_json).ok()?;

    let header = decode_header(token).ok()?;
    let kid = header.kid?;
    let jwk = jwks.keys.iter().find(|k| k.kid == kid)?;
    let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).ok()?;

    let mut validation = Validation::new(Algorithm::RS256);
    if let Some(audience) = &settings.oidc_audience {
        validation.set_audience(&[audience]);
    }
    if let Some(issuer) = &settings.oidc_issuer {
        validation.set_issuer(&[issuer]);
    }

    let data = decode::<Value>(token, &decoding_key, &validation).ok()?;
    let claims = data.claims;

    let subject = claims.get("sub").and_then(Value::as_str)?.to_string();
    let org_id = claims
        .get(&settings.oidc_org_id_claim)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());
    let team_node_id = claims
        .get(&settings.oidc_team_node_id_claim)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());
    let is_admin = claims
        .get("groups")
        .and_then(Value::as_array)
        .map(|groups| groups.iter().any(|g| g.as_str() == Some("incidentfox-admin")))
        .unwrap_or(false);

    Some(OidcClaims { subject, org_id, team_node_id, is_admin })
}

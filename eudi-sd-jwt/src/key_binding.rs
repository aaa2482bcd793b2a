use eudi_jwk::JWK;
use eudi_jws::JwsHelper;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, SdAlg};

pub const KB_JWT_TYP: &str = "kb+jwt";

/// Audience and nonce a verifier expects a presentation to be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub aud: String,
    pub nonce: String,
}

impl Challenge {
    pub fn new(aud: impl Into<String>, nonce: impl Into<String>) -> Self {
        Self {
            aud: aud.into(),
            nonce: nonce.into(),
        }
    }
}

/// `sd_hash` over `issuer-jwt~disclosure~...~`, trailing tilde included.
pub fn sd_hash(sd_jwt_without_kb: &str) -> String {
    SdAlg::Sha256.hash(sd_jwt_without_kb.as_bytes())
}

/// Check a Key Binding JWT and return its claims.
///
/// The KB-JWT must be typed `kb+jwt`, signed by `holder_jwk`, carry `iat`,
/// match `challenge`, and commit to the presented SD-JWT through `sd_hash`.
pub fn verify_key_binding(
    kb_jwt: &str,
    holder_jwk: &JWK,
    challenge: &Challenge,
    sd_jwt_without_kb: &str,
) -> Result<Map<String, Value>, Error> {
    let (header, payload) = eudi_jws::decode_verify(kb_jwt, holder_jwk).map_err(|e| {
        log::debug!("key binding signature rejected: {}", e);
        Error::HolderBindingInvalid(format!("not signed by the holder key: {e}"))
    })?;

    if header.type_.as_deref() != Some(KB_JWT_TYP) {
        return Err(Error::HolderBindingInvalid(format!(
            "typ is {:?}, expected {KB_JWT_TYP}",
            header.type_
        )));
    }

    let claims: Map<String, Value> = serde_json::from_slice(&payload)
        .map_err(|_| Error::HolderBindingInvalid("claims are not a JSON object".to_string()))?;

    if !claims.get("iat").map_or(false, Value::is_number) {
        return Err(Error::HolderBindingInvalid("missing iat".to_string()));
    }

    let audience_matches = match claims.get("aud") {
        Some(Value::String(aud)) => *aud == challenge.aud,
        Some(Value::Array(auds)) => auds.iter().any(|aud| aud.as_str() == Some(&challenge.aud)),
        _ => false,
    };
    if !audience_matches {
        return Err(Error::HolderBindingInvalid(format!(
            "aud does not match {}",
            challenge.aud
        )));
    }

    if claims.get("nonce").and_then(Value::as_str) != Some(challenge.nonce.as_str()) {
        return Err(Error::HolderBindingInvalid("nonce mismatch".to_string()));
    }

    let expected = sd_hash(sd_jwt_without_kb);
    if claims.get("sd_hash").and_then(Value::as_str) != Some(expected.as_str()) {
        return Err(Error::HolderBindingInvalid("sd_hash mismatch".to_string()));
    }

    Ok(claims)
}

/// Holder side: sign a Key Binding JWT for `sd_jwt_without_kb`.
pub fn create_key_binding(
    holder_key: &JWK,
    challenge: &Challenge,
    sd_jwt_without_kb: &str,
    iat: i64,
) -> Result<String, Error> {
    let claims = serde_json::json!({
        "iat": iat,
        "aud": challenge.aud,
        "nonce": challenge.nonce,
        "sd_hash": sd_hash(sd_jwt_without_kb),
    });
    let mut protected = Map::new();
    protected.insert("typ".to_string(), Value::String(KB_JWT_TYP.to_string()));
    Ok(JwsHelper::from(holder_key.clone()).sign_claims(&claims, protected, false)?)
}

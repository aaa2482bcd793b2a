//! SD-JWT VC presentations.
use std::sync::Arc;

use async_trait::async_trait;
use eudi_jws::JwsHelper;
use eudi_sd_jwt::{Challenge, SdJwtKb};
use eudi_trust::{StaticTrustMaterials, TrustHandler};
use serde_json::Value;

use crate::{ClaimSet, PresentationVerifier, VpError};

/// Verifies SD-JWT VC presentations against issuer keys from a [`TrustHandler`].
#[derive(Clone)]
pub struct SdJwtVcVerifier {
    trust: Arc<dyn TrustHandler>,
}

impl SdJwtVcVerifier {
    pub fn new(trust: Arc<dyn TrustHandler>) -> Self {
        Self { trust }
    }

    /// Issuer identifier from the issuer JWT, signature unchecked.
    pub fn issuer(&self, token: &str) -> Result<String, VpError> {
        let presentation = SdJwtKb::parse(token)?;
        issuer_of(&presentation.issuer_claims_unverified()?)
    }

    /// Revocation status is not checked; every credential is reported live.
    pub fn is_revoked(&self, _token: &str) -> bool {
        false
    }

    /// Validate `token` for the verifier `verifier_id` and the nonce it issued,
    /// as of `now`.
    pub async fn validate_at(
        &self,
        token: &str,
        verifier_id: &str,
        verifier_nonce: &str,
        now: i64,
    ) -> Result<(), VpError> {
        let presentation = SdJwtKb::parse(token)?;
        let issuer = issuer_of(&presentation.issuer_claims_unverified()?)?;

        let hints = StaticTrustMaterials::from_header(&presentation.issuer_header()?);
        let keys = self.trust.get_public_keys(&issuer, &hints).await?;
        log::debug!("{} candidate keys for {}", keys.len(), issuer);

        let claims = JwsHelper::new(keys)
            .verify(&presentation.issuer_jwt)
            .map_err(|e| VpError::SignatureInvalid(e.to_string()))?;

        let holder_key = claims
            .get("cnf")
            .and_then(|cnf| cnf.get("jwk"))
            .ok_or_else(|| VpError::HolderBindingInvalid("no `cnf.jwk` in the credential".to_string()))
            .and_then(|jwk| {
                eudi_jwk::normalize_value(jwk)
                    .map_err(|e| VpError::HolderBindingInvalid(format!("unusable `cnf.jwk`: {e}")))
            })?;
        presentation.verify_key_binding(&holder_key, &Challenge::new(verifier_id, verifier_nonce))?;

        if let Some(exp) = claims.get("exp").and_then(Value::as_i64) {
            if exp <= now {
                return Err(VpError::PresentationExpired(exp));
            }
        }

        if self.is_revoked(token) {
            return Err(VpError::CredentialRevoked(issuer));
        }
        Ok(())
    }

    pub async fn validate(
        &self,
        token: &str,
        verifier_id: &str,
        verifier_nonce: &str,
    ) -> Result<(), VpError> {
        self.validate_at(token, verifier_id, verifier_nonce, chrono::Utc::now().timestamp())
            .await
    }
}

fn issuer_of(claims: &ClaimSet) -> Result<String, VpError> {
    match claims.get("iss") {
        Some(Value::String(iss)) if !iss.is_empty() => Ok(iss.clone()),
        _ => Err(VpError::MissingIssuer),
    }
}

#[async_trait]
impl PresentationVerifier for SdJwtVcVerifier {
    /// Disclosed claims, no trust or signature check.
    fn parse(&self, token: &str) -> Result<ClaimSet, VpError> {
        Ok(SdJwtKb::parse(token)?.disclosed_claims()?)
    }

    async fn validate_at(
        &self,
        token: &str,
        verifier_id: &str,
        verifier_nonce: &str,
        now: i64,
    ) -> Result<(), VpError> {
        SdJwtVcVerifier::validate_at(self, token, verifier_id, verifier_nonce, now).await
    }
}

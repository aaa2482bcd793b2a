//! Verifiable presentation verification.
//!
//! [`Verifier`] reads the declared format of a presentation, hands it to the
//! matching [`PresentationVerifier`] and returns the disclosed claims once the
//! issuer signature, holder binding and validity period have been checked.
use std::sync::Arc;

use async_trait::async_trait;
use eudi_trust::TrustHandler;
use serde_json::{Map, Value};

mod error;
pub mod format;
pub mod sd_jwt;

pub use error::VpError;
pub use format::{infer_vp_iss, infer_vp_typ, select_parser, VpFormat};
pub use sd_jwt::SdJwtVcVerifier;

/// Claims disclosed by a presentation.
pub type ClaimSet = Map<String, Value>;

/// One presentation format.
#[async_trait]
pub trait PresentationVerifier: Send + Sync {
    /// Claims of `token` without any verification.
    fn parse(&self, token: &str) -> Result<ClaimSet, VpError>;

    async fn validate_at(
        &self,
        token: &str,
        verifier_id: &str,
        verifier_nonce: &str,
        now: i64,
    ) -> Result<(), VpError>;
}

#[derive(Clone)]
pub struct Verifier {
    sd_jwt: SdJwtVcVerifier,
}

impl Verifier {
    pub fn new(trust: Arc<dyn TrustHandler>) -> Self {
        Self {
            sd_jwt: SdJwtVcVerifier::new(trust),
        }
    }

    pub fn parser(&self, format: VpFormat) -> Result<&dyn PresentationVerifier, VpError> {
        match format {
            VpFormat::SdJwtVc => Ok(&self.sd_jwt),
            VpFormat::MsoMdoc => Err(VpError::VPFormatNotSupported("mso_mdoc".to_string())),
        }
    }

    /// Verify `token` for `verifier_id` and the nonce it issued; on success
    /// return the disclosed claims.
    pub async fn verify(
        &self,
        token: &str,
        verifier_id: &str,
        verifier_nonce: &str,
    ) -> Result<ClaimSet, VpError> {
        self.verify_at(token, verifier_id, verifier_nonce, chrono::Utc::now().timestamp())
            .await
    }

    pub async fn verify_at(
        &self,
        token: &str,
        verifier_id: &str,
        verifier_nonce: &str,
        now: i64,
    ) -> Result<ClaimSet, VpError> {
        let parser = self.parser(select_parser(token)?)?;
        parser.validate_at(token, verifier_id, verifier_nonce, now).await?;
        parser.parse(token)
    }
}

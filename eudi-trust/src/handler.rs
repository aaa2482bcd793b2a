use async_trait::async_trait;
use eudi_jwk::JWK;

use crate::{StaticTrustMaterials, TrustError, TrustSourceData};

/// A source of issuer keys and metadata.
///
/// Handlers are composed by [`CombinedTrustEvaluator`](crate::CombinedTrustEvaluator),
/// which asks each in turn until one yields keys.
#[async_trait]
pub trait TrustHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Keys authorised to sign credentials for `issuer`.
    async fn get_public_keys(
        &self,
        issuer: &str,
        hints: &StaticTrustMaterials,
    ) -> Result<Vec<JWK>, TrustError>;

    async fn get_metadata(
        &self,
        issuer: &str,
        record: TrustSourceData,
    ) -> Result<TrustSourceData, TrustError>;

    /// Check presented trust material, e.g. a federation trust chain, and
    /// fold the outcome into `record`. The record is returned on every path.
    async fn validate_trust_material(
        &self,
        _material: &[String],
        record: TrustSourceData,
    ) -> Result<(bool, TrustSourceData), TrustError> {
        Ok((false, record))
    }

    /// Name of the [`StaticTrustMaterials`] entry this handler consumes.
    fn handled_trust_material_name(&self) -> Option<&str> {
        None
    }
}

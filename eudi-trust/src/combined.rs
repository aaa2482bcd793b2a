use std::sync::Arc;

use async_trait::async_trait;
use eudi_jwk::JWK;

use crate::{StaticTrustMaterials, TrustError, TrustHandler, TrustSourceData};

pub const COMBINED_NAME: &str = "combined";

/// Ordered trust handlers, asked in turn.
#[derive(Clone, Default)]
pub struct CombinedTrustEvaluator {
    handlers: Vec<Arc<dyn TrustHandler>>,
}

impl CombinedTrustEvaluator {
    pub fn new(handlers: Vec<Arc<dyn TrustHandler>>) -> Self {
        Self { handlers }
    }

    pub fn handlers(&self) -> &[Arc<dyn TrustHandler>] {
        &self.handlers
    }

    /// Names of the trust materials some handler consumes.
    pub fn handled_trust_material_names(&self) -> Vec<&str> {
        self.handlers
            .iter()
            .filter_map(|handler| handler.handled_trust_material_name())
            .collect()
    }
}

#[async_trait]
impl TrustHandler for CombinedTrustEvaluator {
    fn name(&self) -> &str {
        COMBINED_NAME
    }

    /// Keys of the first handler that yields any.
    ///
    /// With a single failure the handler's own error is returned; otherwise
    /// every failure is kept in [`TrustError::NoHandlerSucceeded`].
    async fn get_public_keys(
        &self,
        issuer: &str,
        hints: &StaticTrustMaterials,
    ) -> Result<Vec<JWK>, TrustError> {
        let mut errors = vec![];
        for handler in &self.handlers {
            match handler.get_public_keys(issuer, hints).await {
                Ok(keys) if !keys.is_empty() => {
                    log::debug!("{} resolved {} keys for {}", handler.name(), keys.len(), issuer);
                    return Ok(keys);
                }
                Ok(_) => errors.push((
                    handler.name().to_string(),
                    TrustError::NoKeys(handler.name().to_string()),
                )),
                Err(e) => {
                    log::debug!("{} failed for {}: {}", handler.name(), issuer, e);
                    errors.push((handler.name().to_string(), e));
                }
            }
        }
        if errors.len() == 1 {
            if let Some((_, e)) = errors.pop() {
                return Err(e);
            }
        }
        Err(TrustError::NoHandlerSucceeded {
            issuer: issuer.to_string(),
            errors,
        })
    }

    /// Fold `record` through every handler. A failing handler leaves the
    /// record as it was.
    async fn get_metadata(
        &self,
        issuer: &str,
        mut record: TrustSourceData,
    ) -> Result<TrustSourceData, TrustError> {
        for handler in &self.handlers {
            match handler.get_metadata(issuer, record.clone()).await {
                Ok(updated) => record = updated,
                Err(e) => log::warn!("{} could not fetch metadata of {}: {}", handler.name(), issuer, e),
            }
        }
        Ok(record)
    }

    /// First handler that accepts `material` wins.
    async fn validate_trust_material(
        &self,
        material: &[String],
        mut record: TrustSourceData,
    ) -> Result<(bool, TrustSourceData), TrustError> {
        for handler in &self.handlers {
            if handler.handled_trust_material_name().is_none() {
                continue;
            }
            match handler.validate_trust_material(material, record.clone()).await {
                Ok((true, updated)) => return Ok((true, updated)),
                Ok((false, updated)) => record = updated,
                Err(e) => log::debug!("{} rejected trust material: {}", handler.name(), e),
            }
        }
        Ok((false, record))
    }
}

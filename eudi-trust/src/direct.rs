//! Direct trust for SD-JWT VC issuers.
//!
//! Issuer keys come from configuration, from a presented `x5c` chain when
//! allowed, or from the issuer's JWT VC issuer metadata.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eudi_jwk::JWK;
use serde_json::Value;

use crate::http::fetch_json;
use crate::{
    DirectTrustConfig, FetchCache, HttpClient, HttpError, MokaFetchCache, StaticTrustMaterials,
    TrustError, TrustHandler, TrustSourceData,
};

pub const DIRECT_TRUST_NAME: &str = "direct_trust_sd_jwt_vc";

/// `{origin}/{component}{path}`: the well-known segment goes between the host
/// and the issuer path.
pub fn build_jwk_issuer_endpoint_ietf(issuer: &str, component: &str) -> String {
    if component.is_empty() {
        return issuer.to_string();
    }
    let authority_start = issuer.find("://").map_or(0, |i| i + 3);
    let path_start = issuer[authority_start..]
        .find(|c| matches!(c, '/' | '?' | '#'))
        .map_or(issuer.len(), |i| authority_start + i);
    let (origin, path) = issuer.split_at(path_start);
    format!("{}/{}{}", origin, component.trim_matches('/'), path)
}

/// `{issuer}/{component}`: the well-known segment appended to the issuer.
pub fn build_issuer_endpoint_alternate(issuer: &str, component: &str) -> String {
    if component.is_empty() {
        return issuer.to_string();
    }
    format!(
        "{}/{}",
        issuer.trim_end_matches('/'),
        component.trim_start_matches('/')
    )
}

pub struct DirectTrustSdJwtVc {
    config: DirectTrustConfig,
    http: Arc<dyn HttpClient>,
    cache: Option<Arc<dyn FetchCache>>,
}

impl DirectTrustSdJwtVc {
    /// A positive `cache_ttl` gets a [`MokaFetchCache`] with that lifetime.
    pub fn new(config: DirectTrustConfig, http: Arc<dyn HttpClient>) -> Self {
        let cache: Option<Arc<dyn FetchCache>> = match config.cache_ttl {
            0 => None,
            ttl => Some(Arc::new(MokaFetchCache::new(Duration::from_secs(ttl)))),
        };
        Self {
            config,
            http,
            cache,
        }
    }

    /// Replace the fetch cache. Ignored while `cache_ttl` is `0`.
    pub fn with_cache(mut self, cache: Arc<dyn FetchCache>) -> Self {
        if self.config.cache_ttl > 0 {
            self.cache = Some(cache);
        }
        self
    }

    pub fn config(&self) -> &DirectTrustConfig {
        &self.config
    }

    async fn fetch(&self, url: &str) -> Result<Value, HttpError> {
        let params = &self.config.httpc_params;
        match &self.cache {
            Some(cache) => {
                cache
                    .get_or_fetch(url, Box::pin(fetch_json(self.http.as_ref(), url, params)))
                    .await
            }
            None => fetch_json(self.http.as_ref(), url, params).await,
        }
    }

    /// JWT VC issuer metadata, trying the IETF location first.
    pub async fn get_jwk_metadata(&self, issuer: &str) -> Result<Value, TrustError> {
        let mut errors = vec![];
        for endpoint in [
            build_jwk_issuer_endpoint_ietf(issuer, &self.config.jwk_endpoint),
            build_issuer_endpoint_alternate(issuer, &self.config.jwk_endpoint),
        ] {
            match self.fetch(&endpoint).await {
                Ok(metadata) => return Ok(metadata),
                Err(e) => {
                    log::debug!("no issuer metadata at {}: {}", endpoint, e);
                    errors.push(e);
                }
            }
        }
        Err(TrustError::MetadataFetchError(errors))
    }

    async fn keys_from_metadata(&self, issuer: &str, metadata: &Value) -> Result<Vec<JWK>, TrustError> {
        if let Some(declared) = metadata.get("issuer").and_then(Value::as_str) {
            if declared.trim_end_matches('/') != issuer.trim_end_matches('/') {
                return Err(TrustError::InvalidMetadata(format!(
                    "metadata issuer {declared} does not match {issuer}"
                )));
            }
        }
        let jwks = match (metadata.get("jwks"), metadata.get("jwks_uri")) {
            (Some(jwks), _) => jwks.clone(),
            (None, Some(Value::String(jwks_uri))) => self.fetch(jwks_uri).await?,
            _ => {
                return Err(TrustError::InvalidMetadata(
                    "neither jwks nor jwks_uri present".to_string(),
                ))
            }
        };
        let keys = jwks
            .get("keys")
            .and_then(Value::as_array)
            .ok_or_else(|| TrustError::InvalidMetadata("jwks without keys".to_string()))?;
        Ok(keys
            .iter()
            .map(eudi_jwk::normalize_value)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl TrustHandler for DirectTrustSdJwtVc {
    fn name(&self) -> &str {
        DIRECT_TRUST_NAME
    }

    async fn get_public_keys(
        &self,
        issuer: &str,
        hints: &StaticTrustMaterials,
    ) -> Result<Vec<JWK>, TrustError> {
        if let Some(jwks) = &self.config.jwks {
            return Ok(jwks.clone());
        }
        if self.config.trust_x5c_hint {
            if let Some(x5c) = &hints.x5c {
                return Ok(vec![eudi_jwk::parse_from_certificate_chain(x5c)?]);
            }
        }
        let metadata = self.get_jwk_metadata(issuer).await?;
        self.keys_from_metadata(issuer, &metadata).await
    }

    async fn get_metadata(
        &self,
        issuer: &str,
        mut record: TrustSourceData,
    ) -> Result<TrustSourceData, TrustError> {
        let url = build_issuer_endpoint_alternate(issuer, &self.config.metadata_endpoint);
        match self.fetch(&url).await? {
            Value::Object(metadata) => {
                record.metadata = metadata;
                Ok(record)
            }
            _ => Err(TrustError::InvalidMetadata(format!(
                "{url} did not return a JSON object"
            ))),
        }
    }
}

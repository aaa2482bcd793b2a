//! OpenID Federation trust.
use std::sync::Arc;

use async_trait::async_trait;
use eudi_jwk::{JWKSet, JWK};
use eudi_jws::JwsHelper;
use serde_json::{json, Map, Value};

use crate::chain::{entity_configuration_url, ENTITY_STATEMENT_TYP};
use crate::{
    FederationConfig, HttpClient, StaticTrustChainValidator, StaticTrustMaterials, StoreError,
    TrustError, TrustEvaluation, TrustHandler, TrustSourceData, TrustStore,
};

pub const FEDERATION_NAME: &str = "federation";
pub const TRUST_CHAIN_MATERIAL: &str = "trust_chain";

pub struct FederationHandler {
    config: FederationConfig,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn TrustStore>,
    federation_public_jwks: Vec<JWK>,
}

/// `{"keys": [...]}` or a bare key list, reduced to public keys.
fn public_key_set(jwks: &Value) -> Result<JWKSet, TrustError> {
    let keys = match jwks {
        Value::Array(keys) => keys,
        Value::Object(set) => match set.get("keys") {
            Some(Value::Array(keys)) => keys,
            _ => return Err(TrustError::InvalidMetadata("jwks without keys".to_string())),
        },
        _ => return Err(TrustError::InvalidMetadata("jwks is not a key set".to_string())),
    };
    let keys = keys
        .iter()
        .map(|key| eudi_jwk::normalize_value(key).map(|key| key.to_public()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(JWKSet { keys })
}

impl FederationHandler {
    pub fn new(
        mut config: FederationConfig,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn TrustStore>,
    ) -> Result<Self, TrustError> {
        if let Some(jwks) = config.metadata.get("jwks") {
            let public = public_key_set(jwks)?;
            config
                .metadata
                .insert("jwks".to_string(), serde_json::to_value(public)?);
        }
        // Published keys must carry the `kid` the entity configuration header names.
        config.federation_jwks = std::mem::take(&mut config.federation_jwks)
            .into_iter()
            .map(|key| match key.key_id {
                Some(_) => Ok(key),
                None => key.with_thumbprint_kid(),
            })
            .collect::<Result<_, _>>()?;
        let federation_public_jwks = config.federation_jwks.iter().map(JWK::to_public).collect();
        Ok(Self {
            config,
            http,
            store,
            federation_public_jwks,
        })
    }

    pub fn config(&self) -> &FederationConfig {
        &self.config
    }

    pub fn entity_configuration_endpoint(&self) -> String {
        entity_configuration_url(&self.config.entity_id)
    }

    pub fn entity_configuration_claims(&self, now: i64) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert(
            self.config.metadata_type.clone(),
            Value::Object(self.config.metadata.clone()),
        );
        metadata.insert(
            "federation_entity".to_string(),
            Value::Object(self.config.federation_entity_metadata.clone()),
        );
        let mut claims = Map::new();
        claims.insert("exp".to_string(), json!(now + self.config.entity_configuration_exp * 60));
        claims.insert("iat".to_string(), json!(now));
        claims.insert("iss".to_string(), json!(self.config.entity_id));
        claims.insert("sub".to_string(), json!(self.config.entity_id));
        claims.insert("jwks".to_string(), json!({ "keys": self.federation_public_jwks }));
        claims.insert("metadata".to_string(), Value::Object(metadata));
        claims.insert("authority_hints".to_string(), json!(self.config.authority_hints));
        if !self.config.trust_marks.is_empty() {
            claims.insert("trust_marks".to_string(), json!(self.config.trust_marks));
        }
        claims
    }

    /// Self-signed entity configuration, signed with the first federation key.
    pub fn entity_configuration(&self, now: i64) -> Result<String, TrustError> {
        let key = self
            .config
            .federation_jwks
            .first()
            .ok_or_else(|| TrustError::MissingTrustMaterial("federation_jwks".to_string()))?;
        let mut protected = Map::new();
        protected.insert("alg".to_string(), json!(self.config.default_sig_alg));
        protected.insert("typ".to_string(), json!(ENTITY_STATEMENT_TYP));
        Ok(JwsHelper::from(key.clone()).sign_claims(
            &self.entity_configuration_claims(now),
            protected,
            true,
        )?)
    }

    async fn trust_anchor_jwks(&self, chain: &[String]) -> Result<Vec<JWK>, TrustError> {
        let last = chain
            .last()
            .ok_or_else(|| TrustError::UnknownTrustAnchor("empty trust chain".to_string()))?;
        let anchor_id = eudi_jws::decode_payload_unverified(last)
            .ok()
            .and_then(|payload| payload.get("iss").and_then(Value::as_str).map(String::from))
            .ok_or_else(|| {
                TrustError::UnknownTrustAnchor("no `iss` in the anchor statement".to_string())
            })?;
        if !self.config.trust_anchors.is_empty() && !self.config.trust_anchors.contains(&anchor_id)
        {
            return Err(TrustError::UnknownTrustAnchor(anchor_id));
        }
        let anchor = match self.store.get_trust_anchor(&anchor_id).await {
            Ok(anchor) => anchor,
            Err(StoreError::EntryNotFound(_)) => return Err(TrustError::UnknownTrustAnchor(anchor_id)),
            Err(e) => return Err(e.into()),
        };
        let jwks = anchor.jwks()?;
        if jwks.is_empty() {
            return Err(TrustError::MissingProtocolSpecificJwks(anchor_id));
        }
        Ok(jwks)
    }

    /// Record a validated chain: the chain itself, the policy-merged metadata
    /// and a `federation` evaluation of the issuer's keys.
    fn accept(
        &self,
        validator: &StaticTrustChainValidator,
        mut record: TrustSourceData,
    ) -> Result<(bool, TrustSourceData), TrustError> {
        let metadata = validator.final_metadata(&self.config.metadata_type)?;
        let keys = match metadata.get("jwks") {
            Some(jwks) => public_key_set(jwks)?.keys,
            None => validator.leaf_jwks().to_vec(),
        };
        record.trust_chain = Some(validator.chain().to_vec());
        record.metadata = metadata;
        record.add_trust_param(TrustEvaluation::new(
            FEDERATION_NAME,
            keys,
            Some(validator.exp()),
        ));
        Ok((true, record))
    }
}

#[async_trait]
impl TrustHandler for FederationHandler {
    fn name(&self) -> &str {
        FEDERATION_NAME
    }

    async fn get_public_keys(
        &self,
        issuer: &str,
        hints: &StaticTrustMaterials,
    ) -> Result<Vec<JWK>, TrustError> {
        let chain = hints
            .trust_chain
            .as_deref()
            .ok_or_else(|| TrustError::MissingTrustMaterial(TRUST_CHAIN_MATERIAL.to_string()))?;
        let subject = StaticTrustChainValidator::new(chain.to_vec(), vec![])?;
        if subject.entity_id().trim_end_matches('/') != issuer.trim_end_matches('/') {
            return Err(TrustError::InvalidTrustChain(format!(
                "chain is about {}, not {}",
                subject.entity_id(),
                issuer
            )));
        }

        let record = match self.store.get_trust_source(issuer).await {
            Ok(record) => record,
            Err(StoreError::EntryNotFound(_)) => TrustSourceData::new(issuer),
            Err(e) => return Err(e.into()),
        };
        let (valid, record) = self.validate_trust_material(chain, record).await?;
        if !valid {
            return Err(TrustError::InvalidTrustChain(format!(
                "no valid trust chain for {issuer}"
            )));
        }
        let keys = record
            .trust_param(FEDERATION_NAME)
            .map(|evaluation| evaluation.keys.clone())
            .unwrap_or_default();
        self.store.upsert_trust_source(record).await?;
        Ok(keys)
    }

    /// Refresh federation metadata from the stored chain, when there is one.
    async fn get_metadata(
        &self,
        _issuer: &str,
        record: TrustSourceData,
    ) -> Result<TrustSourceData, TrustError> {
        let chain = match &record.trust_chain {
            Some(chain) => chain.clone(),
            None => return Ok(record),
        };
        let (_, record) = self.validate_trust_material(&chain, record).await?;
        Ok(record)
    }

    /// Validate a presented chain. Falls back to the stored chain, then to
    /// one refresh through [`StaticTrustChainValidator::update`]. An expired
    /// chain is rejected outright.
    async fn validate_trust_material(
        &self,
        chain: &[String],
        record: TrustSourceData,
    ) -> Result<(bool, TrustSourceData), TrustError> {
        let anchor_jwks = self.trust_anchor_jwks(chain).await?;
        let validator = StaticTrustChainValidator::new(chain.to_vec(), anchor_jwks.clone())?;

        match validator.validate() {
            Ok(()) => return self.accept(&validator, record),
            Err(e @ TrustError::ExpiredTrustChain(_)) => {
                log::warn!("Trust chain of {} is expired: {}", validator.entity_id(), e);
                return Err(e);
            }
            Err(e) => log::warn!(
                "Cannot validate trust chain of {}: {}",
                validator.entity_id(),
                e
            ),
        }

        if let Some(stored) = record.trust_chain.clone() {
            let fallback = StaticTrustChainValidator::new(stored, anchor_jwks.clone())
                .and_then(|stored| stored.validate().map(|_| stored));
            match fallback {
                Ok(stored) => return self.accept(&stored, record),
                Err(e) => log::debug!("stored trust chain unusable: {}", e),
            }
        }

        let refreshed = validator
            .update(self.http.as_ref(), &self.config.httpc_params)
            .await
            .and_then(|chain| StaticTrustChainValidator::new(chain, anchor_jwks));
        match refreshed.and_then(|refreshed| refreshed.validate().map(|_| refreshed)) {
            Ok(refreshed) => self.accept(&refreshed, record),
            Err(e) => {
                log::warn!(
                    "Refreshed trust chain of {} is not valid either: {}",
                    validator.entity_id(),
                    e
                );
                Ok((false, record))
            }
        }
    }

    fn handled_trust_material_name(&self) -> Option<&str> {
        Some(TRUST_CHAIN_MATERIAL)
    }
}

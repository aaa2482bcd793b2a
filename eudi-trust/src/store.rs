use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use eudi_jwk::JWK;
use serde::{Deserialize, Serialize};

use crate::{StoreError, TrustError, TrustSourceData};

/// A configured trust anchor and its self-signed entity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAnchorRecord {
    pub entity_id: String,
    pub entity_configuration: String,
}

impl TrustAnchorRecord {
    /// Federation keys published in the entity configuration. The record is
    /// configured locally, so its signature is not checked here.
    pub fn jwks(&self) -> Result<Vec<JWK>, TrustError> {
        let payload = eudi_jws::decode_payload_unverified(&self.entity_configuration)?;
        match payload.get("jwks").and_then(|jwks| jwks.get("keys")) {
            Some(keys) => Ok(serde_json::from_value(keys.clone())?),
            None => Ok(vec![]),
        }
    }
}

/// Persisted trust anchors and per-issuer trust records.
#[async_trait]
pub trait TrustStore: Send + Sync {
    async fn get_trust_anchor(&self, entity_id: &str) -> Result<TrustAnchorRecord, StoreError>;

    async fn get_trust_source(&self, entity_id: &str) -> Result<TrustSourceData, StoreError>;

    async fn upsert_trust_source(&self, record: TrustSourceData) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTrustStore {
    anchors: RwLock<HashMap<String, TrustAnchorRecord>>,
    sources: RwLock<HashMap<String, TrustSourceData>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

impl InMemoryTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trust_anchor(&self, record: TrustAnchorRecord) -> Result<(), StoreError> {
        self.anchors
            .write()
            .map_err(poisoned)?
            .insert(record.entity_id.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl TrustStore for InMemoryTrustStore {
    async fn get_trust_anchor(&self, entity_id: &str) -> Result<TrustAnchorRecord, StoreError> {
        self.anchors
            .read()
            .map_err(poisoned)?
            .get(entity_id)
            .cloned()
            .ok_or_else(|| StoreError::EntryNotFound(entity_id.to_string()))
    }

    async fn get_trust_source(&self, entity_id: &str) -> Result<TrustSourceData, StoreError> {
        self.sources
            .read()
            .map_err(poisoned)?
            .get(entity_id)
            .cloned()
            .ok_or_else(|| StoreError::EntryNotFound(entity_id.to_string()))
    }

    async fn upsert_trust_source(&self, record: TrustSourceData) -> Result<(), StoreError> {
        self.sources
            .write()
            .map_err(poisoned)?
            .insert(record.entity_id.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_entries_are_reported() {
        let store = InMemoryTrustStore::new();
        assert_eq!(
            store.get_trust_anchor("https://ta.example").await,
            Err(StoreError::EntryNotFound("https://ta.example".to_string()))
        );
        assert!(store.get_trust_source("https://issuer.example").await.is_err());
    }

    #[tokio::test]
    async fn upsert_replaces_record() {
        let store = InMemoryTrustStore::new();
        let mut record = TrustSourceData::new("https://issuer.example");
        store.upsert_trust_source(record.clone()).await.unwrap();
        record.trust_chain = Some(vec!["a.b.c".to_string()]);
        store.upsert_trust_source(record.clone()).await.unwrap();
        assert_eq!(
            store.get_trust_source("https://issuer.example").await.unwrap(),
            record
        );
    }
}

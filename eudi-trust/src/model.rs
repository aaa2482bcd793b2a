use std::collections::BTreeMap;

use eudi_jwk::JWK;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named, time-bounded assertion that `keys` speak for an issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustEvaluation {
    pub name: String,
    pub keys: Vec<JWK>,
    /// Unix time after which the evaluation must be redone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<i64>,
}

impl TrustEvaluation {
    pub fn new(name: impl Into<String>, keys: Vec<JWK>, expiration_date: Option<i64>) -> Self {
        Self {
            name: name.into(),
            keys,
            expiration_date,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiration_date.map_or(false, |exp| exp <= now)
    }
}

/// What is known about one issuer, accumulated across trust handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustSourceData {
    pub entity_id: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Last chain that validated, as compact JWS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_chain: Option<Vec<String>>,
    #[serde(default)]
    pub trust_params: BTreeMap<String, TrustEvaluation>,
}

impl TrustSourceData {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Default::default()
        }
    }

    /// Insert `evaluation` under its name, replacing only an evaluation of the same name.
    pub fn add_trust_param(&mut self, evaluation: TrustEvaluation) {
        self.trust_params.insert(evaluation.name.clone(), evaluation);
    }

    pub fn trust_param(&self, name: &str) -> Option<&TrustEvaluation> {
        self.trust_params.get(name)
    }

    /// Keys of every evaluation still valid at `now`.
    pub fn valid_keys_at(&self, now: i64) -> Vec<JWK> {
        self.trust_params
            .values()
            .filter(|evaluation| !evaluation.is_expired_at(now))
            .flat_map(|evaluation| evaluation.keys.iter().cloned())
            .collect()
    }
}

/// Trust hints presented along with a credential, e.g. in its JOSE header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTrustMaterials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_chain: Option<Vec<String>>,
}

impl StaticTrustMaterials {
    pub fn from_header(header: &eudi_jws::Header) -> Self {
        Self {
            x5c: header.x509_certificate_chain.clone(),
            trust_chain: header.string_list("trust_chain"),
        }
    }

    /// Material of the given name, as a trust handler declares it.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        match name {
            "x5c" => self.x5c.as_deref(),
            "trust_chain" => self.trust_chain.as_deref(),
            _ => None,
        }
    }
}

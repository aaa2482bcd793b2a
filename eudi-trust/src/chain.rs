//! OpenID Federation trust chains.
//!
//! A chain is `[leaf entity configuration, subordinate statement, ..., anchor
//! statement]`. Statement `i` is signed by a key in the `jwks` of statement
//! `i + 1`; the last one by the trust anchor's own keys.
use eudi_jwk::{JWKSet, JWK};
use eudi_jws::JwsHelper;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::HttpResponse;
use crate::{policy, HttpClient, HttpError, HttpcParams, TrustError};

pub const ENTITY_STATEMENT_TYP: &str = "entity-statement+jwt";
pub const FEDERATION_WELL_KNOWN: &str = ".well-known/openid-federation";
const MAX_CHAIN_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStatement {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub jwks: JWKSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_policy: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority_hints: Option<Vec<String>>,
    #[serde(flatten)]
    pub additional_claims: Map<String, Value>,
}

impl EntityStatement {
    /// Payload of a statement, signature unchecked.
    pub fn decode_unverified(jwt: &str) -> Result<Self, TrustError> {
        let (_, payload) = eudi_jws::decode_unverified(jwt)
            .map_err(|e| TrustError::InvalidTrustChain(format!("undecodable statement: {e}")))?;
        serde_json::from_slice(&payload)
            .map_err(|e| TrustError::InvalidTrustChain(format!("malformed statement: {e}")))
    }

    pub fn is_entity_configuration(&self) -> bool {
        self.iss == self.sub
    }

    /// `federation_fetch_endpoint` of a superior's entity configuration.
    pub fn federation_fetch_endpoint(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get("federation_entity")?
            .get("federation_fetch_endpoint")?
            .as_str()
    }
}

pub fn entity_configuration_url(entity_id: &str) -> String {
    format!("{}/{}", entity_id.trim_end_matches('/'), FEDERATION_WELL_KNOWN)
}

#[derive(Debug, Clone)]
pub struct StaticTrustChainValidator {
    chain: Vec<String>,
    statements: Vec<EntityStatement>,
    trust_anchor_jwks: Vec<JWK>,
}

impl StaticTrustChainValidator {
    pub fn new(chain: Vec<String>, trust_anchor_jwks: Vec<JWK>) -> Result<Self, TrustError> {
        if chain.len() < 2 {
            return Err(TrustError::InvalidTrustChain(format!(
                "a chain needs at least two statements, got {}",
                chain.len()
            )));
        }
        let statements = chain
            .iter()
            .map(|jwt| EntityStatement::decode_unverified(jwt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            chain,
            statements,
            trust_anchor_jwks,
        })
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn statements(&self) -> &[EntityStatement] {
        &self.statements
    }

    fn leaf(&self) -> &EntityStatement {
        &self.statements[0]
    }

    /// Subject of the chain.
    pub fn entity_id(&self) -> &str {
        &self.leaf().sub
    }

    pub fn trust_anchor_id(&self) -> &str {
        &self.statements[self.statements.len() - 1].iss
    }

    /// Federation keys of the subject, from its entity configuration.
    pub fn leaf_jwks(&self) -> &[JWK] {
        &self.leaf().jwks.keys
    }

    /// Earliest expiry in the chain.
    pub fn exp(&self) -> i64 {
        self.statements.iter().map(|s| s.exp).min().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), TrustError> {
        self.validate_at(chrono::Utc::now().timestamp())
    }

    pub fn validate_at(&self, now: i64) -> Result<(), TrustError> {
        let leaf = self.leaf();
        if !leaf.is_entity_configuration() {
            return Err(TrustError::InvalidTrustChain(format!(
                "first statement is not an entity configuration ({} about {})",
                leaf.iss, leaf.sub
            )));
        }

        let last = self.statements.len() - 1;
        for i in (0..=last).rev() {
            let statement = &self.statements[i];
            let keys = if i == last {
                &self.trust_anchor_jwks
            } else {
                let superior = &self.statements[i + 1];
                if statement.iss != superior.sub {
                    return Err(TrustError::InvalidTrustChain(format!(
                        "statement {} is issued by {}, expected {}",
                        i, statement.iss, superior.sub
                    )));
                }
                &superior.jwks.keys
            };
            verify_statement(&self.chain[i], keys, i)?;
            check_validity_window(statement, now, i)?;
        }

        verify_statement(&self.chain[0], &leaf.jwks.keys, 0)?;
        log::debug!("trust chain of {} is valid", self.entity_id());
        Ok(())
    }

    /// Leaf metadata of `metadata_type` with every subordinate statement's
    /// policy applied, anchor first.
    pub fn final_metadata(&self, metadata_type: &str) -> Result<Map<String, Value>, TrustError> {
        let mut combined = Map::new();
        for statement in self.statements[1..].iter().rev() {
            let policy = statement
                .metadata_policy
                .as_ref()
                .and_then(|policies| policies.get(metadata_type))
                .and_then(Value::as_object);
            if let Some(policy) = policy {
                combined = policy::combine(&combined, policy)?;
            }
        }
        let metadata = self
            .leaf()
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get(metadata_type))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(policy::apply(&combined, &metadata)?)
    }

    /// Fetch a fresh chain for the same subject through its authority hints,
    /// ending with the anchor's entity configuration.
    pub async fn update(
        &self,
        http: &dyn HttpClient,
        params: &HttpcParams,
    ) -> Result<Vec<String>, TrustError> {
        let anchor = self.trust_anchor_id().to_string();
        let leaf_jwt = fetch_statement(http, &entity_configuration_url(self.entity_id()), params).await?;
        let mut current = EntityStatement::decode_unverified(&leaf_jwt)?;
        let mut chain = vec![leaf_jwt];

        while chain.len() < MAX_CHAIN_LENGTH {
            let hints = current.authority_hints.clone().unwrap_or_default();
            let mut next = None;
            for hint in &hints {
                match fetch_subordinate(http, hint, &current.sub, params).await {
                    Ok(found) => {
                        next = Some((hint.clone(), found));
                        break;
                    }
                    Err(e) => log::debug!("authority hint {} unusable: {}", hint, e),
                }
            }
            let (superior_id, (superior_jwt, subordinate_jwt)) = next.ok_or_else(|| {
                TrustError::InvalidTrustChain(format!(
                    "no authority of {} could be resolved",
                    current.sub
                ))
            })?;
            chain.push(subordinate_jwt);
            if superior_id == anchor {
                chain.push(superior_jwt);
                return Ok(chain);
            }
            current = EntityStatement::decode_unverified(&superior_jwt)?;
        }
        Err(TrustError::InvalidTrustChain(format!(
            "no path from {} to {} within {} statements",
            self.entity_id(),
            anchor,
            MAX_CHAIN_LENGTH
        )))
    }
}

fn verify_statement(jwt: &str, keys: &[JWK], position: usize) -> Result<(), TrustError> {
    JwsHelper::new(keys.to_vec())
        .verify(jwt)
        .map(|_| ())
        .map_err(|e| TrustError::InvalidTrustChain(format!("statement {position}: {e}")))
}

fn check_validity_window(statement: &EntityStatement, now: i64, position: usize) -> Result<(), TrustError> {
    if statement.exp <= now {
        return Err(TrustError::ExpiredTrustChain(format!(
            "statement {} about {} expired at {}",
            position, statement.sub, statement.exp
        )));
    }
    if let Some(nbf) = statement.nbf {
        if nbf > now {
            return Err(TrustError::ExpiredTrustChain(format!(
                "statement {} about {} not valid before {}",
                position, statement.sub, nbf
            )));
        }
    }
    Ok(())
}

async fn fetch_statement(
    http: &dyn HttpClient,
    url: &str,
    params: &HttpcParams,
) -> Result<String, TrustError> {
    let HttpResponse { body, .. } = http.get(url, params).await?.ok()?;
    Ok(body.trim().to_string())
}

/// The superior's entity configuration and its statement about `sub`.
async fn fetch_subordinate(
    http: &dyn HttpClient,
    superior: &str,
    sub: &str,
    params: &HttpcParams,
) -> Result<(String, String), TrustError> {
    let superior_jwt = fetch_statement(http, &entity_configuration_url(superior), params).await?;
    let statement = EntityStatement::decode_unverified(&superior_jwt)?;
    let endpoint = statement.federation_fetch_endpoint().ok_or_else(|| {
        TrustError::InvalidTrustChain(format!("{superior} has no federation_fetch_endpoint"))
    })?;
    let url = reqwest::Url::parse_with_params(endpoint, &[("sub", sub)]).map_err(|e| {
        TrustError::Http(HttpError::Request {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })
    })?;
    let subordinate_jwt = fetch_statement(http, url.as_str(), params).await?;
    Ok((superior_jwt, subordinate_jwt))
}

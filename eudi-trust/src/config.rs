use eudi_jwk::{Algorithm, JWK};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_SDJWTVC_METADATA_ENDPOINT: &str = "/.well-known/jwt-vc-issuer";
pub const DEFAULT_OPENID4VCI_METADATA_ENDPOINT: &str = "/.well-known/openid-credential-issuer";
pub const DEFAULT_METADATA_TYPE: &str = "openid_credential_issuer";
pub const HTTPC_SSL_ENV: &str = "EUDI_HTTPC_SSL";
pub const HTTPC_TIMEOUT_ENV: &str = "EUDI_HTTPC_TIMEOUT";

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpcParams {
    /// Verify TLS certificates.
    pub ssl: bool,
    /// Per request timeout, in seconds.
    pub timeout: u64,
}

impl Default for HttpcParams {
    fn default() -> Self {
        Self {
            ssl: true,
            timeout: 6,
        }
    }
}

impl HttpcParams {
    /// Defaults, overridden by `EUDI_HTTPC_SSL` and `EUDI_HTTPC_TIMEOUT` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut params = Self::default();
        if let Some(ssl) = lookup(HTTPC_SSL_ENV) {
            match ssl.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => params.ssl = true,
                "0" | "false" | "no" => params.ssl = false,
                other => log::warn!("ignoring {}={}", HTTPC_SSL_ENV, other),
            }
        }
        if let Some(timeout) = lookup(HTTPC_TIMEOUT_ENV) {
            match timeout.trim().parse() {
                Ok(timeout) => params.timeout = timeout,
                Err(_) => log::warn!("ignoring {}={}", HTTPC_TIMEOUT_ENV, timeout),
            }
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectTrustConfig {
    pub httpc_params: HttpcParams,
    pub jwk_endpoint: String,
    pub metadata_endpoint: String,
    /// Seconds. `0` disables caching.
    pub cache_ttl: u64,
    /// Static issuer keys; when set no network access happens.
    pub jwks: Option<Vec<JWK>>,
    /// Take the issuer key from an `x5c` header when one is presented.
    pub trust_x5c_hint: bool,
}

impl Default for DirectTrustConfig {
    fn default() -> Self {
        Self {
            httpc_params: HttpcParams::from_env(),
            jwk_endpoint: DEFAULT_SDJWTVC_METADATA_ENDPOINT.to_string(),
            metadata_endpoint: DEFAULT_OPENID4VCI_METADATA_ENDPOINT.to_string(),
            cache_ttl: 0,
            jwks: None,
            trust_x5c_hint: false,
        }
    }
}

fn default_metadata_type() -> String {
    DEFAULT_METADATA_TYPE.to_string()
}

fn default_sig_alg() -> Algorithm {
    Algorithm::ES256
}

fn default_entity_configuration_exp() -> i64 {
    800
}

/// Settings of this entity as an OpenID Federation participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationConfig {
    pub entity_id: String,
    /// Protocol metadata published under `metadata_type`.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default = "default_metadata_type")]
    pub metadata_type: String,
    #[serde(default)]
    pub authority_hints: Vec<String>,
    /// Accepted anchors. Empty accepts every anchor known to the trust store.
    #[serde(default)]
    pub trust_anchors: Vec<String>,
    #[serde(default = "default_sig_alg")]
    pub default_sig_alg: Algorithm,
    /// Private keys signing the entity configuration.
    #[serde(default)]
    pub federation_jwks: Vec<JWK>,
    #[serde(default)]
    pub trust_marks: Vec<Value>,
    #[serde(default)]
    pub federation_entity_metadata: Map<String, Value>,
    /// Minutes.
    #[serde(default = "default_entity_configuration_exp")]
    pub entity_configuration_exp: i64,
    #[serde(default = "HttpcParams::from_env")]
    pub httpc_params: HttpcParams,
    #[serde(default)]
    pub cache_ttl: u64,
}

//! Error types for `eudi-trust` crate
use thiserror::Error;

/// Failure talking to a remote endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Error building HTTP client: {0}")]
    Client(String),
    #[error("Error sending HTTP request ({url}): {reason}")]
    Request { url: String, reason: String },
    #[error("HTTP error {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Invalid JSON from {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Metadata policy that cannot be combined or is violated by the metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Unknown policy operator `{operator}` on `{claim}`")]
    UnknownOperator { claim: String, operator: String },
    #[error("Policy operator `{operator}` on `{claim}` has an invalid value")]
    InvalidOperatorValue { claim: String, operator: String },
    #[error("Policies for `{claim}` conflict on `{operator}`")]
    Conflict { claim: String, operator: String },
    #[error("Metadata parameter `{claim}` violates `{operator}`")]
    Violation { claim: String, operator: String },
    #[error("Essential metadata parameter `{0}` is missing")]
    MissingEssential(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No entry for {0}")]
    EntryNotFound(String),
    #[error("Trust store failure: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrustError {
    #[error("Unknown trust anchor: {0}")]
    UnknownTrustAnchor(String),
    #[error("Trust anchor {0} publishes no keys")]
    MissingProtocolSpecificJwks(String),
    #[error("Expired trust chain: {0}")]
    ExpiredTrustChain(String),
    #[error("Invalid trust chain: {0}")]
    InvalidTrustChain(String),
    /// Both endpoint conventions failed.
    #[error("Unable to fetch issuer metadata: {}", join(.0))]
    MetadataFetchError(Vec<HttpError>),
    #[error("Invalid issuer metadata: {0}")]
    InvalidMetadata(String),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Missing trust material `{0}`")]
    MissingTrustMaterial(String),
    #[error("Trust handler {0} resolved no keys")]
    NoKeys(String),
    /// Every handler of a composite failed; each error is kept with the name
    /// of the handler that raised it.
    #[error("No trust handler resolved keys for {issuer}: {}", describe(.errors))]
    NoHandlerSucceeded {
        issuer: String,
        errors: Vec<(String, TrustError)>,
    },
    #[error(transparent)]
    InvalidKey(#[from] eudi_jwk::Error),
    #[error(transparent)]
    JWS(#[from] eudi_jws::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn join(errors: &[HttpError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe(errors: &[(String, TrustError)]) -> String {
    errors
        .iter()
        .map(|(handler, e)| format!("{handler}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}

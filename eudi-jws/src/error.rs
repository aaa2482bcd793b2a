//! Error types for `eudi-jws` crate
use thiserror::Error;

/// Failure to pick a key out of a key set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeySelectionError {
    #[error("no key with kid `{0}`")]
    UnknownKeyId(String),
    #[error("unable to select a key among {0} without a kid")]
    Ambiguous(usize),
    #[error("no key available")]
    Empty,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    JWK(#[from] eudi_jwk::Error),
    #[error(transparent)]
    KeySelection(#[from] KeySelectionError),
    /// No usable key, or the signature check failed.
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),
    #[error("Algorithm in JWS header does not match JWK")]
    AlgorithmMismatch,
    #[error("Key type does not support algorithm {0}")]
    KeyTypeMismatch(eudi_jwk::Algorithm),
    #[error("Missing algorithm")]
    MissingAlgorithm,
    #[error("Unsupported algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    #[error("Invalid JWS")]
    InvalidJWS,
    #[error("Invalid JWS header: {0}")]
    InvalidHeader(String),
    #[error("Unknown critical header name in JWS header")]
    UnknownCriticalHeader,
    #[error("Invalid critical header name in JWS header")]
    InvalidCriticalHeader,
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Error from the signature primitives of p256, p384, k256, rsa and ed25519-dalek
    #[error(transparent)]
    Crypto(#[from] p256::ecdsa::Error),
}

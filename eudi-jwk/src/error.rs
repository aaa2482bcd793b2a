//! Error types for `eudi-jwk` crate
use base64::DecodeError as Base64Error;
use rsa::errors::Error as RsaError;
use simple_asn1::ASN1DecodeErr as ASN1DecodeError;
use thiserror::Error;

/// Error type for `eudi-jwk`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Key material could not be normalized into a JWK
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Missing curve in JWK
    #[error("Missing curve in JWK")]
    MissingCurve,
    /// Missing elliptic curve point in JWK
    #[error("Missing elliptic curve point in JWK")]
    MissingPoint,
    /// Missing key value for symmetric key
    #[error("Missing key value for symmetric key")]
    MissingKeyValue,
    /// Key type is not supported
    #[error("Key type not supported")]
    UnsupportedKeyType,
    /// Curve not implemented
    #[error("Curve not implemented: '{0}'")]
    CurveNotImplemented(String),
    /// Missing private key parameter in JWK
    #[error("Missing private key parameter in JWK")]
    MissingPrivateKey,
    /// Missing modulus in RSA key
    #[error("Missing modulus in RSA key")]
    MissingModulus,
    /// Missing exponent in RSA key
    #[error("Missing exponent in RSA key")]
    MissingExponent,
    /// Missing prime in RSA key
    #[error("Missing prime in RSA key")]
    MissingPrime,
    /// Invalid key length
    #[error("Invalid key length: {0}")]
    InvalidKeyLength(usize),
    /// Error from `rsa` crate
    #[error(transparent)]
    Rsa(#[from] RsaError),
    /// Error decoding ASN.1 data structure.
    #[error(transparent)]
    ASN1Decode(#[from] ASN1DecodeError),
    /// Error decoding Base64
    #[error(transparent)]
    Base64(#[from] Base64Error),
    /// Error from `elliptic-curve` crate, shared by p256, p384 and k256
    #[error(transparent)]
    EC(#[from] p256::elliptic_curve::Error),
    /// Error from `ed25519-dalek`
    #[error(transparent)]
    Ed25519(#[from] ed25519_dalek::SignatureError),
    /// Error (de)serializing a JWK
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

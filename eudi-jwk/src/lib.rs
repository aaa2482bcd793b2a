#![cfg_attr(docsrs, feature(doc_auto_cfg))]
//! JSON Web Key model and key-material normalization.
//!
//! Every key that reaches the signature engine or a trust handler goes through
//! [`JWK`], whatever form it was supplied in: an inline JSON map, an already
//! typed key, a key object from one of the curve crates, or the leaf
//! certificate of an `x5c` chain.

use num_bigint::Sign;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::convert::TryFrom;
use zeroize::Zeroize;

pub mod algorithm;
pub mod der;
pub mod error;
pub mod normalize;
pub mod x509;

pub use algorithm::Algorithm;
pub use error::Error;
pub use normalize::{normalize, normalize_value, KeyInput, ToJwk};
pub use x509::parse_from_certificate_chain;

// RFC 7517 - JSON Web Key (JWK)
// RFC 7518 - JSON Web Algorithms (JWA)
// RFC 7638 - JSON Web Key (JWK) Thumbprint
// RFC 8037 - CFRG ECDH and Signatures in JOSE

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq)]
pub struct JWK {
    #[serde(rename = "use")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_use: Option<String>,
    #[serde(rename = "key_ops")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_operations: Option<Vec<String>>,
    #[serde(rename = "alg")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(rename = "x5u")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_url: Option<String>,
    #[serde(rename = "x5c")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_certificate_chain: Option<Vec<String>>,
    #[serde(rename = "x5t")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint_sha1: Option<Base64urlUInt>,
    #[serde(rename = "x5t#S256")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509_thumbprint_sha256: Option<Base64urlUInt>,
    #[serde(flatten)]
    pub params: Params,
}

/// A JWK Set, `{"keys": [...]}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct JWKSet {
    pub keys: Vec<JWK>,
}

impl JWKSet {
    pub fn to_public(&self) -> Self {
        Self {
            keys: self.keys.iter().map(JWK::to_public).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    RSA(RSAParams),
    #[serde(rename = "oct")]
    Symmetric(SymmetricParams),
    OKP(OctetParams),
}

impl Drop for ECParams {
    fn drop(&mut self) {
        if let Some(ref mut d) = self.ecc_private_key {
            d.zeroize();
        }
    }
}

impl Drop for RSAParams {
    fn drop(&mut self) {
        for secret in [
            &mut self.private_exponent,
            &mut self.first_prime_factor,
            &mut self.second_prime_factor,
            &mut self.first_prime_factor_crt_exponent,
            &mut self.second_prime_factor_crt_exponent,
            &mut self.first_crt_coefficient,
        ]
        .into_iter()
        .flatten()
        {
            secret.zeroize();
        }
    }
}

impl Drop for OctetParams {
    fn drop(&mut self) {
        if let Some(ref mut d) = self.private_key {
            d.zeroize();
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
pub struct ECParams {
    #[serde(rename = "crv")]
    pub curve: Option<String>,
    #[serde(rename = "x")]
    pub x_coordinate: Option<Base64urlUInt>,
    #[serde(rename = "y")]
    pub y_coordinate: Option<Base64urlUInt>,
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecc_private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
pub struct RSAParams {
    #[serde(rename = "n")]
    pub modulus: Option<Base64urlUInt>,
    #[serde(rename = "e")]
    pub exponent: Option<Base64urlUInt>,
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_exponent: Option<Base64urlUInt>,
    #[serde(rename = "p")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_prime_factor: Option<Base64urlUInt>,
    #[serde(rename = "q")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_prime_factor: Option<Base64urlUInt>,
    #[serde(rename = "dp")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_prime_factor_crt_exponent: Option<Base64urlUInt>,
    #[serde(rename = "dq")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_prime_factor_crt_exponent: Option<Base64urlUInt>,
    #[serde(rename = "qi")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_crt_coefficient: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
pub struct SymmetricParams {
    #[serde(rename = "k")]
    pub key_value: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
pub struct OctetParams {
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(rename = "x")]
    pub public_key: Base64urlUInt,
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Hash, Eq, Zeroize)]
#[serde(try_from = "String")]
#[serde(into = "Base64urlUIntString")]
pub struct Base64urlUInt(pub Vec<u8>);
type Base64urlUIntString = String;

impl JWK {
    pub fn generate_ed25519() -> Result<JWK, Error> {
        let mut csprng = rand::rngs::OsRng {};
        let secret = ed25519_dalek::SigningKey::generate(&mut csprng);
        let public = secret.verifying_key();
        Ok(JWK::from(Params::OKP(OctetParams {
            curve: "Ed25519".to_string(),
            public_key: Base64urlUInt(public.as_bytes().to_vec()),
            private_key: Some(Base64urlUInt(secret.to_bytes().to_vec())),
        })))
    }

    pub fn generate_p256() -> Result<JWK, Error> {
        let mut rng = rand::rngs::OsRng {};
        let secret_key = p256::SecretKey::random(&mut rng);
        let ec_params = ECParams::try_from(&secret_key)?;
        Ok(JWK::from(Params::EC(ec_params)))
    }

    pub fn generate_p384() -> Result<JWK, Error> {
        let mut rng = rand::rngs::OsRng {};
        let secret_key = p384::SecretKey::random(&mut rng);
        let ec_params = ECParams::try_from(&secret_key)?;
        Ok(JWK::from(Params::EC(ec_params)))
    }

    /// Set the key identifier to the [RFC 7638] thumbprint of the key.
    ///
    /// [RFC 7638]: https://www.rfc-editor.org/rfc/rfc7638
    pub fn with_thumbprint_kid(mut self) -> Result<Self, Error> {
        self.key_id = Some(self.thumbprint()?);
        Ok(self)
    }

    /// Algorithm to use with this key: the `alg` member when present,
    /// otherwise the default for the key type and curve.
    pub fn get_algorithm(&self) -> Option<Algorithm> {
        if let Some(algorithm) = self.algorithm {
            return Some(algorithm);
        }
        match &self.params {
            Params::RSA(_) => Some(Algorithm::RS256),
            Params::OKP(okp_params) if okp_params.curve == "Ed25519" => Some(Algorithm::EdDSA),
            Params::EC(ec_params) => match ec_params.curve.as_deref() {
                Some("P-256") => Some(Algorithm::ES256),
                Some("P-384") => Some(Algorithm::ES384),
                Some("secp256k1") => Some(Algorithm::ES256K),
                _ => None,
            },
            _ => None,
        }
    }

    /// Strip private key material
    pub fn to_public(&self) -> Self {
        let mut key = self.clone();
        key.params = key.params.to_public();
        key
    }

    pub fn is_public(&self) -> bool {
        self.params.is_public()
    }

    /// Compare JWK equality by public key properties.
    /// Equivalent to comparing by [JWK Thumbprint][Self::thumbprint].
    pub fn equals_public(&self, other: &JWK) -> bool {
        match (&self.params, &other.params) {
            (Params::RSA(a), Params::RSA(b)) => {
                a.modulus.is_some()
                    && a.exponent.is_some()
                    && a.modulus == b.modulus
                    && a.exponent == b.exponent
            }
            (Params::OKP(a), Params::OKP(b)) => {
                a.curve == b.curve && a.public_key == b.public_key
            }
            (Params::EC(a), Params::EC(b)) => {
                a.curve.is_some()
                    && a.x_coordinate.is_some()
                    && a.curve == b.curve
                    && a.x_coordinate == b.x_coordinate
                    && a.y_coordinate == b.y_coordinate
            }
            (Params::Symmetric(a), Params::Symmetric(b)) => {
                a.key_value.is_some() && a.key_value == b.key_value
            }
            _ => false,
        }
    }

    pub fn thumbprint(&self) -> Result<String, Error> {
        // JWK parameters for thumbprint hashing must be in lexicographical order, and without
        // string escaping.
        // https://datatracker.ietf.org/doc/html/rfc7638#section-3.1
        let json_string = match &self.params {
            Params::RSA(rsa_params) => {
                let n = rsa_params.modulus.as_ref().ok_or(Error::MissingModulus)?;
                let e = rsa_params.exponent.as_ref().ok_or(Error::MissingExponent)?;
                format!(
                    r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
                    String::from(e),
                    String::from(n)
                )
            }
            Params::OKP(okp_params) => {
                format!(
                    r#"{{"crv":"{}","kty":"OKP","x":"{}"}}"#,
                    okp_params.curve,
                    String::from(&okp_params.public_key)
                )
            }
            Params::EC(ec_params) => {
                let curve = ec_params.curve.as_ref().ok_or(Error::MissingCurve)?;
                let x = ec_params.x_coordinate.as_ref().ok_or(Error::MissingPoint)?;
                let y = ec_params.y_coordinate.as_ref().ok_or(Error::MissingPoint)?;
                format!(
                    r#"{{"crv":"{}","kty":"EC","x":"{}","y":"{}"}}"#,
                    curve,
                    String::from(x),
                    String::from(y)
                )
            }
            Params::Symmetric(sym_params) => {
                let k = sym_params
                    .key_value
                    .as_ref()
                    .ok_or(Error::MissingKeyValue)?;
                format!(r#"{{"k":"{}","kty":"oct"}}"#, String::from(k))
            }
        };
        let hash = Sha256::digest(json_string.as_bytes());
        Ok(String::from(Base64urlUInt(hash.to_vec())))
    }
}

impl From<Params> for JWK {
    fn from(params: Params) -> Self {
        Self {
            params,
            public_key_use: None,
            key_operations: None,
            algorithm: None,
            key_id: None,
            x509_url: None,
            x509_certificate_chain: None,
            x509_thumbprint_sha1: None,
            x509_thumbprint_sha256: None,
        }
    }
}

impl Params {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        match self {
            Self::EC(params) => Self::EC(params.to_public()),
            Self::RSA(params) => Self::RSA(params.to_public()),
            Self::Symmetric(_) => Self::Symmetric(SymmetricParams { key_value: None }),
            Self::OKP(params) => Self::OKP(params.to_public()),
        }
    }

    pub fn is_public(&self) -> bool {
        match self {
            Self::EC(params) => params.ecc_private_key.is_none(),
            Self::RSA(params) => params.private_exponent.is_none(),
            Self::Symmetric(params) => params.key_value.is_none(),
            Self::OKP(params) => params.private_key.is_none(),
        }
    }
}

impl ECParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            x_coordinate: self.x_coordinate.clone(),
            y_coordinate: self.y_coordinate.clone(),
            ecc_private_key: None,
        }
    }

    fn sec1_bytes(&self, expected_curve: &str) -> Result<Vec<u8>, Error> {
        const EC_UNCOMPRESSED_POINT_TAG: &[u8] = &[0x04];
        let curve = self.curve.as_ref().ok_or(Error::MissingCurve)?;
        if curve != expected_curve {
            return Err(Error::CurveNotImplemented(curve.to_string()));
        }
        let x = &self.x_coordinate.as_ref().ok_or(Error::MissingPoint)?.0;
        let y = &self.y_coordinate.as_ref().ok_or(Error::MissingPoint)?.0;
        Ok([EC_UNCOMPRESSED_POINT_TAG, x.as_slice(), y.as_slice()].concat())
    }

    fn private_key_bytes(&self, expected_curve: &str) -> Result<&[u8], Error> {
        let curve = self.curve.as_ref().ok_or(Error::MissingCurve)?;
        if curve != expected_curve {
            return Err(Error::CurveNotImplemented(curve.to_string()));
        }
        let private_key = self
            .ecc_private_key
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?;
        Ok(&private_key.0)
    }
}

impl RSAParams {
    /// Construct a RSA public key
    pub fn new_public(exponent: &[u8], modulus: &[u8]) -> Self {
        Self {
            modulus: Some(Base64urlUInt(modulus.to_vec())),
            exponent: Some(Base64urlUInt(exponent.to_vec())),
            private_exponent: None,
            first_prime_factor: None,
            second_prime_factor: None,
            first_prime_factor_crt_exponent: None,
            second_prime_factor_crt_exponent: None,
            first_crt_coefficient: None,
        }
    }

    /// Strip private key material
    pub fn to_public(&self) -> Self {
        match (&self.exponent, &self.modulus) {
            (Some(e), Some(n)) => Self::new_public(&e.0, &n.0),
            _ => Self {
                modulus: self.modulus.clone(),
                exponent: self.exponent.clone(),
                private_exponent: None,
                first_prime_factor: None,
                second_prime_factor: None,
                first_prime_factor_crt_exponent: None,
                second_prime_factor_crt_exponent: None,
                first_crt_coefficient: None,
            },
        }
    }

    /// Validate key size is at least 2048 bits, per [RFC 7518 section 3.3](https://www.rfc-editor.org/rfc/rfc7518#section-3.3).
    pub fn validate_key_size(&self) -> Result<(), Error> {
        let n = &self.modulus.as_ref().ok_or(Error::MissingModulus)?.0;
        if n.len() < 256 {
            return Err(Error::InvalidKeyLength(n.len()));
        }
        Ok(())
    }
}

impl OctetParams {
    /// Strip private key material
    pub fn to_public(&self) -> Self {
        Self {
            curve: self.curve.clone(),
            public_key: self.public_key.clone(),
            private_key: None,
        }
    }
}

impl TryFrom<&der::RSAPublicKey> for RSAParams {
    type Error = Error;
    fn try_from(pk: &der::RSAPublicKey) -> Result<Self, Self::Error> {
        let (sign, n) = pk.modulus.to_bytes_be();
        if sign != Sign::Plus {
            return Err(Error::InvalidKey("negative RSA modulus".to_string()));
        }
        let (sign, e) = pk.public_exponent.to_bytes_be();
        if sign != Sign::Plus {
            return Err(Error::InvalidKey("negative RSA exponent".to_string()));
        }
        Ok(RSAParams::new_public(&e, &n))
    }
}

impl From<&Base64urlUInt> for rsa::BigUint {
    fn from(uint: &Base64urlUInt) -> Self {
        Self::from_bytes_be(&uint.0)
    }
}

impl TryFrom<&RSAParams> for rsa::RsaPublicKey {
    type Error = Error;
    fn try_from(params: &RSAParams) -> Result<Self, Self::Error> {
        let n = params.modulus.as_ref().ok_or(Error::MissingModulus)?;
        let e = params.exponent.as_ref().ok_or(Error::MissingExponent)?;
        Ok(Self::new(n.into(), e.into())?)
    }
}

impl TryFrom<&RSAParams> for rsa::RsaPrivateKey {
    type Error = Error;
    #[allow(clippy::many_single_char_names)]
    fn try_from(params: &RSAParams) -> Result<Self, Self::Error> {
        let n = params.modulus.as_ref().ok_or(Error::MissingModulus)?;
        let e = params.exponent.as_ref().ok_or(Error::MissingExponent)?;
        let d = params
            .private_exponent
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?;
        let p = params
            .first_prime_factor
            .as_ref()
            .ok_or(Error::MissingPrime)?;
        let q = params
            .second_prime_factor
            .as_ref()
            .ok_or(Error::MissingPrime)?;
        Ok(Self::from_components(
            n.into(),
            e.into(),
            d.into(),
            vec![p.into(), q.into()],
        )?)
    }
}

impl TryFrom<&ECParams> for p256::PublicKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        Ok(Self::from_sec1_bytes(&params.sec1_bytes("P-256")?)?)
    }
}

impl TryFrom<&ECParams> for p384::PublicKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        Ok(Self::from_sec1_bytes(&params.sec1_bytes("P-384")?)?)
    }
}

impl TryFrom<&ECParams> for k256::PublicKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        Ok(Self::from_sec1_bytes(&params.sec1_bytes("secp256k1")?)?)
    }
}

impl TryFrom<&ECParams> for p256::SecretKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        Ok(Self::from_slice(params.private_key_bytes("P-256")?)?)
    }
}

impl TryFrom<&ECParams> for p384::SecretKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        Ok(Self::from_slice(params.private_key_bytes("P-384")?)?)
    }
}

impl TryFrom<&ECParams> for k256::SecretKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        Ok(Self::from_slice(params.private_key_bytes("secp256k1")?)?)
    }
}

macro_rules! ec_params_from_curve {
    ($curve:ident, $name:literal) => {
        impl From<&$curve::PublicKey> for ECParams {
            fn from(pk: &$curve::PublicKey) -> Self {
                use $curve::elliptic_curve::sec1::ToEncodedPoint;
                let encoded_point = pk.to_encoded_point(false);
                ECParams {
                    curve: Some($name.to_string()),
                    x_coordinate: encoded_point.x().map(|x| Base64urlUInt(x.to_vec())),
                    y_coordinate: encoded_point.y().map(|y| Base64urlUInt(y.to_vec())),
                    ecc_private_key: None,
                }
            }
        }

        impl TryFrom<&$curve::SecretKey> for ECParams {
            type Error = Error;
            fn try_from(k: &$curve::SecretKey) -> Result<Self, Self::Error> {
                let mut params = ECParams::from(&k.public_key());
                if params.x_coordinate.is_none() || params.y_coordinate.is_none() {
                    return Err(Error::MissingPoint);
                }
                params.ecc_private_key = Some(Base64urlUInt(k.to_bytes().to_vec()));
                Ok(params)
            }
        }
    };
}

ec_params_from_curve!(p256, "P-256");
ec_params_from_curve!(p384, "P-384");
ec_params_from_curve!(k256, "secp256k1");

impl TryFrom<&OctetParams> for ed25519_dalek::VerifyingKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != *"Ed25519" {
            return Err(Error::CurveNotImplemented(params.curve.to_string()));
        }
        let bytes: &[u8; 32] = params
            .public_key
            .0
            .as_slice()
            .try_into()
            .map_err(|_| Error::InvalidKeyLength(params.public_key.0.len()))?;
        Ok(Self::from_bytes(bytes)?)
    }
}

impl TryFrom<&OctetParams> for ed25519_dalek::SigningKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        if params.curve != *"Ed25519" {
            return Err(Error::CurveNotImplemented(params.curve.to_string()));
        }
        let private_key = params.private_key.as_ref().ok_or(Error::MissingPrivateKey)?;
        let bytes: &[u8; 32] = private_key
            .0
            .as_slice()
            .try_into()
            .map_err(|_| Error::InvalidKeyLength(private_key.0.len()))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl TryFrom<String> for Base64urlUInt {
    type Error = base64::DecodeError;
    fn try_from(data: String) -> Result<Self, Self::Error> {
        Ok(Base64urlUInt(base64::decode_config(
            data,
            base64::URL_SAFE,
        )?))
    }
}

impl From<&Base64urlUInt> for String {
    fn from(data: &Base64urlUInt) -> String {
        base64::encode_config(&data.0, base64::URL_SAFE_NO_PAD)
    }
}

impl From<Base64urlUInt> for Base64urlUIntString {
    fn from(data: Base64urlUInt) -> Base64urlUIntString {
        String::from(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P256_JSON: &str = r#"{
        "crv": "P-256",
        "d": "qIVMRJ0ioosFjCFhBw-kLBuip9tV0Y2D6iYD42nCKBA",
        "kid": "ppBQZHPUTaEPdiLsj99gadhfqLtYMwiU9bmDCfAsWfI",
        "kty": "EC",
        "use": "sig",
        "x": "_336mq5GanihcG_V40tiLDq2sFJ83w-vxaPAZtfCr40",
        "y": "CYUM4Q1YlSTTgSp6OnJZt-O4YlzPf430AgVAM0oNlQk"
    }"#;

    #[test]
    fn p256_from_str() {
        let key: JWK = serde_json::from_str(P256_JSON).unwrap();
        assert_eq!(key.get_algorithm(), Some(Algorithm::ES256));
        assert_eq!(key.public_key_use.as_deref(), Some("sig"));
        assert!(!key.is_public());
        let public = key.to_public();
        assert!(public.is_public());
        assert!(public.equals_public(&key));
        let _pk = match &public.params {
            Params::EC(ec) => p256::PublicKey::try_from(ec).unwrap(),
            _ => panic!("expected an EC key"),
        };
    }

    #[test]
    fn public_serialization_omits_private_key() {
        let key: JWK = serde_json::from_str(P256_JSON).unwrap();
        let value = serde_json::to_value(key.to_public()).unwrap();
        assert!(value.get("d").is_none());
        assert_eq!(value["kty"], "EC");
        assert_eq!(value["kid"], "ppBQZHPUTaEPdiLsj99gadhfqLtYMwiU9bmDCfAsWfI");
    }

    #[test]
    fn generated_keys_round_trip_through_curve_types() {
        let key = JWK::generate_p256().unwrap();
        let secret = match &key.params {
            Params::EC(ec) => p256::SecretKey::try_from(ec).unwrap(),
            _ => panic!("expected an EC key"),
        };
        let params = ECParams::from(&secret.public_key());
        assert!(JWK::from(Params::EC(params)).equals_public(&key));

        let key = JWK::generate_ed25519().unwrap();
        assert_eq!(key.get_algorithm(), Some(Algorithm::EdDSA));
        let okp = match &key.params {
            Params::OKP(okp) => okp,
            _ => panic!("expected an OKP key"),
        };
        let signing = ed25519_dalek::SigningKey::try_from(okp).unwrap();
        let verifying = ed25519_dalek::VerifyingKey::try_from(okp).unwrap();
        assert_eq!(signing.verifying_key(), verifying);
    }

    #[test]
    fn jwk_thumbprint() {
        // https://www.rfc-editor.org/rfc/rfc7638#section-3.1
        let key: JWK = serde_json::from_value(serde_json::json!({
            "kty": "RSA",
            "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
            "e": "AQAB",
            "alg": "RS256",
            "kid": "2011-04-29"
        }))
        .unwrap();
        assert_eq!(
            key.thumbprint().unwrap(),
            "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs"
        );
        let key = key.with_thumbprint_kid().unwrap();
        assert_eq!(
            key.key_id.as_deref(),
            Some("NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs")
        );
    }

    #[test]
    fn jwk_set_serialization() {
        let key: serde_json::Value = serde_json::from_str(P256_JSON).unwrap();
        let set: JWKSet = serde_json::from_value(serde_json::json!({ "keys": [key] })).unwrap();
        assert_eq!(set.keys.len(), 1);
        assert!(set.to_public().keys[0].is_public());
    }
}

//! Compact JSON Web Signatures ([RFC 7515]).
//!
//! The free functions sign and verify with one explicit key. [`JwsHelper`]
//! holds a key set and applies the key selection rules used throughout the
//! verifier.
//!
//! [RFC 7515]: https://www.rfc-editor.org/rfc/rfc7515
use eudi_jwk::{Base64urlUInt, Params as JWKParams};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Sha256, Sha384, Sha512};
use std::collections::BTreeMap;
use std::convert::TryFrom;

pub mod error;
pub mod helper;

pub use eudi_jwk::{Algorithm, JWK};
pub use error::{Error, KeySelectionError};
pub use helper::JwsHelper;

/// JOSE header of a decoded JWS.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: Algorithm,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "jku")]
    pub jwk_set_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwk: Option<JWK>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "kid")]
    pub key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "x5u")]
    pub x509_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "x5c")]
    pub x509_certificate_chain: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "x5t")]
    pub x509_thumbprint_sha1: Option<Base64urlUInt>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "x5t#S256")]
    pub x509_thumbprint_sha256: Option<Base64urlUInt>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "typ")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "cty")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "crit")]
    pub critical: Option<Vec<String>>,

    /// Everything else, e.g. the `trust_chain` of OpenID Federation.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(flatten)]
    pub additional_parameters: BTreeMap<String, Value>,
}

impl Header {
    /// Decode a JWS Protected Header.
    pub fn decode(base_64: &[u8]) -> Result<Self, Error> {
        let header_json = base64::decode_config(base_64, base64::URL_SAFE_NO_PAD)?;
        serde_json::from_slice(&header_json).map_err(|e| Error::InvalidHeader(e.to_string()))
    }

    /// Header member as a list of strings, e.g. `trust_chain`.
    pub fn string_list(&self, name: &str) -> Option<Vec<String>> {
        let values = self.additional_parameters.get(name)?.as_array()?;
        values
            .iter()
            .map(|value| value.as_str().map(ToOwned::to_owned))
            .collect()
    }
}

pub fn sign_bytes(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<Vec<u8>, Error> {
    use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer};
    if let Some(key_algorithm) = key.algorithm {
        if key_algorithm != algorithm {
            return Err(Error::AlgorithmMismatch);
        }
    }
    let signature = match &key.params {
        JWKParams::RSA(rsa_params) => {
            rsa_params.validate_key_size()?;
            let private_key = rsa::RsaPrivateKey::try_from(rsa_params)?;
            let mut rng = rand::rngs::OsRng {};
            match algorithm {
                Algorithm::RS256 => rsa::pkcs1v15::SigningKey::<Sha256>::new(private_key)
                    .try_sign(data)?
                    .to_vec(),
                Algorithm::RS384 => rsa::pkcs1v15::SigningKey::<Sha384>::new(private_key)
                    .try_sign(data)?
                    .to_vec(),
                Algorithm::RS512 => rsa::pkcs1v15::SigningKey::<Sha512>::new(private_key)
                    .try_sign(data)?
                    .to_vec(),
                Algorithm::PS256 => rsa::pss::BlindedSigningKey::<Sha256>::new(private_key)
                    .try_sign_with_rng(&mut rng, data)?
                    .to_vec(),
                Algorithm::PS384 => rsa::pss::BlindedSigningKey::<Sha384>::new(private_key)
                    .try_sign_with_rng(&mut rng, data)?
                    .to_vec(),
                Algorithm::PS512 => rsa::pss::BlindedSigningKey::<Sha512>::new(private_key)
                    .try_sign_with_rng(&mut rng, data)?
                    .to_vec(),
                _ => return Err(Error::KeyTypeMismatch(algorithm)),
            }
        }
        JWKParams::OKP(okp) => {
            if algorithm != Algorithm::EdDSA {
                return Err(Error::KeyTypeMismatch(algorithm));
            }
            let signing_key = ed25519_dalek::SigningKey::try_from(okp)?;
            ed25519_dalek::Signer::try_sign(&signing_key, data)?
                .to_bytes()
                .to_vec()
        }
        JWKParams::EC(ec) => match algorithm {
            Algorithm::ES256 => {
                let secret_key = p256::SecretKey::try_from(ec)?;
                let signing_key = p256::ecdsa::SigningKey::from(secret_key);
                let sig: p256::ecdsa::Signature = signing_key.try_sign(data)?;
                sig.to_bytes().to_vec()
            }
            Algorithm::ES384 => {
                let secret_key = p384::SecretKey::try_from(ec)?;
                let signing_key = p384::ecdsa::SigningKey::from(secret_key);
                let sig: p384::ecdsa::Signature = signing_key.try_sign(data)?;
                sig.to_bytes().to_vec()
            }
            Algorithm::ES256K => {
                let secret_key = k256::SecretKey::try_from(ec)?;
                let signing_key = k256::ecdsa::SigningKey::from(secret_key);
                let sig: k256::ecdsa::Signature = signing_key.try_sign(data)?;
                sig.to_bytes().to_vec()
            }
            _ => return Err(Error::KeyTypeMismatch(algorithm)),
        },
        JWKParams::Symmetric(_) => return Err(Error::UnsupportedAlgorithm(algorithm.to_string())),
    };
    Ok(signature)
}

pub fn sign_bytes_b64(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<String, Error> {
    let signature = sign_bytes(algorithm, data, key)?;
    Ok(base64::encode_config(signature, base64::URL_SAFE_NO_PAD))
}

pub fn verify_bytes(
    algorithm: Algorithm,
    data: &[u8],
    key: &JWK,
    signature: &[u8],
) -> Result<(), Error> {
    use rsa::signature::Verifier;
    if let Some(key_algorithm) = key.algorithm {
        if key_algorithm != algorithm {
            return Err(Error::AlgorithmMismatch);
        }
    }
    match &key.params {
        JWKParams::RSA(rsa_params) => {
            rsa_params.validate_key_size()?;
            let public_key = rsa::RsaPublicKey::try_from(rsa_params)?;
            match algorithm {
                Algorithm::RS256 => rsa::pkcs1v15::VerifyingKey::<Sha256>::new(public_key)
                    .verify(data, &rsa::pkcs1v15::Signature::try_from(signature)?)?,
                Algorithm::RS384 => rsa::pkcs1v15::VerifyingKey::<Sha384>::new(public_key)
                    .verify(data, &rsa::pkcs1v15::Signature::try_from(signature)?)?,
                Algorithm::RS512 => rsa::pkcs1v15::VerifyingKey::<Sha512>::new(public_key)
                    .verify(data, &rsa::pkcs1v15::Signature::try_from(signature)?)?,
                Algorithm::PS256 => rsa::pss::VerifyingKey::<Sha256>::new(public_key)
                    .verify(data, &rsa::pss::Signature::try_from(signature)?)?,
                Algorithm::PS384 => rsa::pss::VerifyingKey::<Sha384>::new(public_key)
                    .verify(data, &rsa::pss::Signature::try_from(signature)?)?,
                Algorithm::PS512 => rsa::pss::VerifyingKey::<Sha512>::new(public_key)
                    .verify(data, &rsa::pss::Signature::try_from(signature)?)?,
                _ => return Err(Error::KeyTypeMismatch(algorithm)),
            }
        }
        JWKParams::OKP(okp) => {
            if algorithm != Algorithm::EdDSA {
                return Err(Error::KeyTypeMismatch(algorithm));
            }
            let verifying_key = ed25519_dalek::VerifyingKey::try_from(okp)?;
            let sig = ed25519_dalek::Signature::from_slice(signature)?;
            verifying_key.verify(data, &sig)?;
        }
        JWKParams::EC(ec) => match algorithm {
            Algorithm::ES256 => {
                let public_key = p256::PublicKey::try_from(ec)?;
                let verifying_key = p256::ecdsa::VerifyingKey::from(public_key);
                let sig = p256::ecdsa::Signature::from_slice(signature)?;
                verifying_key.verify(data, &sig)?;
            }
            Algorithm::ES384 => {
                let public_key = p384::PublicKey::try_from(ec)?;
                let verifying_key = p384::ecdsa::VerifyingKey::from(public_key);
                let sig = p384::ecdsa::Signature::from_slice(signature)?;
                verifying_key.verify(data, &sig)?;
            }
            Algorithm::ES256K => {
                let public_key = k256::PublicKey::try_from(ec)?;
                let verifying_key = k256::ecdsa::VerifyingKey::from(public_key);
                let sig = k256::ecdsa::Signature::from_slice(signature)?;
                verifying_key.verify(data, &sig)?;
            }
            _ => return Err(Error::KeyTypeMismatch(algorithm)),
        },
        JWKParams::Symmetric(_) => return Err(Error::UnsupportedAlgorithm(algorithm.to_string())),
    }
    Ok(())
}

/// Sign `payload` with a caller-built protected header. The header must carry `alg`.
pub fn encode_sign_custom_header(
    payload: &[u8],
    key: &JWK,
    header: &Map<String, Value>,
) -> Result<String, Error> {
    let algorithm = match header.get("alg") {
        Some(Value::String(alg)) => alg
            .parse::<Algorithm>()
            .map_err(|e| Error::UnsupportedAlgorithm(e.0))?,
        Some(_) => return Err(Error::InvalidHeader("`alg` must be a string".to_string())),
        None => return Err(Error::MissingAlgorithm),
    };
    let header_b64 = base64::encode_config(serde_json::to_vec(header)?, base64::URL_SAFE_NO_PAD);
    let payload_b64 = base64::encode_config(payload, base64::URL_SAFE_NO_PAD);
    let signing_input = header_b64 + "." + &payload_b64;
    let sig_b64 = sign_bytes_b64(algorithm, signing_input.as_bytes(), key)?;
    Ok([signing_input, sig_b64].join("."))
}

pub fn split_jws(jws: &str) -> Result<(&str, &str, &str), Error> {
    let mut parts = jws.splitn(3, '.');
    Ok(
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c), None) if !a.is_empty() && !c.is_empty() => (a, b, c),
            _ => return Err(Error::InvalidJWS),
        },
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedJws {
    pub header: Header,
    pub signing_input: Vec<u8>,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Decode JWS parts (JOSE header, payload, and signature) into useful values.
/// "crit" (critical) header parameters are disallowed: none are supported.
pub fn decode_jws_parts(
    header_b64: &str,
    payload_b64: &str,
    signature_b64: &str,
) -> Result<DecodedJws, Error> {
    let signature = base64::decode_config(signature_b64, base64::URL_SAFE_NO_PAD)?;
    let header = Header::decode(header_b64.as_bytes())?;
    let payload = base64::decode_config(payload_b64, base64::URL_SAFE_NO_PAD)?;
    for name in header.critical.iter().flatten() {
        match name.as_str() {
            "alg" | "jku" | "jwk" | "kid" | "x5u" | "x5c" | "x5t" | "x5t#S256" | "typ" | "cty"
            | "crit" => return Err(Error::InvalidCriticalHeader),
            _ => return Err(Error::UnknownCriticalHeader),
        }
    }
    let signing_input = [header_b64.as_bytes(), b".", payload_b64.as_bytes()].concat();
    Ok(DecodedJws {
        header,
        signing_input,
        payload,
        signature,
    })
}

pub fn decode_verify(jws: &str, key: &JWK) -> Result<(Header, Vec<u8>), Error> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let DecodedJws {
        header,
        signing_input,
        payload,
        signature,
    } = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    verify_bytes(header.algorithm, &signing_input, key, &signature)?;
    Ok((header, payload))
}

pub fn decode_unverified(jws: &str) -> Result<(Header, Vec<u8>), Error> {
    let (header_b64, payload_b64, signature_b64) = split_jws(jws)?;
    let decoded = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
    Ok((decoded.header, decoded.payload))
}

/// Decode the payload of a JWS as a JSON object, without verifying it.
pub fn decode_payload_unverified(jws: &str) -> Result<Map<String, Value>, Error> {
    let (_, payload) = decode_unverified(jws)?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Decode the protected header as a raw JSON object, without interpreting any member.
pub fn decode_header_map(jws: &str) -> Result<Map<String, Value>, Error> {
    let header_b64 = jws.split('.').next().unwrap_or_default();
    let header_json = base64::decode_config(header_b64, base64::URL_SAFE_NO_PAD)?;
    Ok(serde_json::from_slice(&header_json)?)
}

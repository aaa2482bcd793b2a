use eudi_jws::JwsHelper;
use rand::{CryptoRng, Rng};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::*;

/// Disclosure as encoded
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
    /// Base64url of the disclosure array
    pub encoded: String,

    /// Digest referencing the disclosure
    pub hash: String,
}

/// Represents a disclosure before encoding
#[derive(Clone, Debug)]
pub enum UnencodedDisclosure {
    /// Top level claim, referenced from `_sd`
    Property(String, Value),

    /// Element appended to the named top level array
    ArrayItem(String, Value),
}

impl UnencodedDisclosure {
    pub fn new_property<S: AsRef<str>, V: Serialize>(
        name: S,
        value: &V,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::Property(
            name.as_ref().to_owned(),
            serde_json::to_value(value)?,
        ))
    }

    pub fn new_array_item<S: AsRef<str>, V: Serialize>(
        parent: S,
        value: &V,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::ArrayItem(
            parent.as_ref().to_owned(),
            serde_json::to_value(value)?,
        ))
    }

    fn encode_with_rng<R: Rng + CryptoRng>(
        &self,
        rng: &mut R,
        sd_alg: SdAlg,
    ) -> Result<Disclosure, serde_json::Error> {
        let encoded = match self {
            Self::Property(name, value) => encode_disclosure_with_rng(rng, Some(name.as_str()), value)?,
            Self::ArrayItem(_, value) => encode_disclosure_with_rng(rng, None, value)?,
        };
        let hash = hash_encoded_disclosure(sd_alg, &encoded);
        Ok(Disclosure { encoded, hash })
    }
}

fn encode_disclosure_with_salt(
    salt: &str,
    claim_name: Option<&str>,
    claim_value: &Value,
) -> Result<String, serde_json::Error> {
    let disclosure = match claim_name {
        Some(claim_name) => serde_json::json!([salt, claim_name, claim_value]),
        None => serde_json::json!([salt, claim_value]),
    };
    let json_string = serde_json::to_string(&disclosure)?;
    Ok(base64::encode_config(json_string, base64::URL_SAFE_NO_PAD))
}

pub fn encode_disclosure_with_rng<R: Rng + CryptoRng>(
    rng: &mut R,
    claim_name: Option<&str>,
    claim_value: &Value,
) -> Result<String, serde_json::Error> {
    const DEFAULT_SALT_SIZE: usize = 128 / 8;

    let mut salt_bytes = [0u8; DEFAULT_SALT_SIZE];
    rng.fill_bytes(&mut salt_bytes);
    let salt = base64::encode_config(salt_bytes, base64::URL_SAFE_NO_PAD);

    encode_disclosure_with_salt(&salt, claim_name, claim_value)
}

/// Issue an SD-JWT: hide `disclosures` from `base_claims` behind digests and
/// sign the result with `signer`.
///
/// Returns the issuer-signed JWT and the disclosures in input order.
pub fn encode_sign<Claims: Serialize>(
    signer: &JwsHelper,
    protected: Map<String, Value>,
    kid_in_header: bool,
    base_claims: &Claims,
    disclosures: &[UnencodedDisclosure],
) -> Result<(String, Vec<Disclosure>), EncodeError> {
    let sd_alg = SdAlg::Sha256;
    let mut rng = rand::rngs::OsRng {};

    let mut claims = match serde_json::to_value(base_claims)? {
        Value::Object(claims) => claims,
        _ => return Err(EncodeError::EncodedAsNonObject),
    };
    if claims.contains_key(SD_CLAIM_NAME) || claims.contains_key(SD_ALG_CLAIM_NAME) {
        return Err(EncodeError::EncodedClaimsContainsReservedProperty);
    }

    let mut sd_claim = vec![];
    let mut encoded = Vec::with_capacity(disclosures.len());
    for disclosure in disclosures {
        let full = disclosure.encode_with_rng(&mut rng, sd_alg)?;
        match disclosure {
            UnencodedDisclosure::Property(name, _) => {
                claims.remove(name);
                sd_claim.push(Value::String(full.hash.clone()));
            }
            UnencodedDisclosure::ArrayItem(parent, _) => {
                let array = claims
                    .entry(parent.clone())
                    .or_insert_with(|| Value::Array(vec![]))
                    .as_array_mut()
                    .ok_or(EncodeError::ExpectedArray)?;
                array.push(serde_json::json!({ ARRAY_CLAIM_ITEM_PROPERTY_NAME: full.hash.clone() }));
            }
        }
        encoded.push(full);
    }

    claims.insert(SD_CLAIM_NAME.to_owned(), Value::Array(sd_claim));
    claims.insert(
        SD_ALG_CLAIM_NAME.to_owned(),
        Value::String(sd_alg.to_str().to_owned()),
    );

    let jwt = signer.sign_claims(&claims, protected, kid_in_header)?;
    Ok((jwt, encoded))
}

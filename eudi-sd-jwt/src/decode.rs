use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::disclosure::{DecodedDisclosure, DisclosureKind};
use crate::{
    hash_encoded_disclosure, Error, SdAlg, ARRAY_CLAIM_ITEM_PROPERTY_NAME, SD_ALG_CLAIM_NAME,
    SD_CLAIM_NAME,
};

/// Read `_sd_alg`, defaulting to `sha-256` when absent.
pub fn sd_alg(claims: &Map<String, Value>) -> Result<SdAlg, Error> {
    match claims.get(SD_ALG_CLAIM_NAME) {
        None => Ok(SdAlg::default()),
        Some(Value::String(alg)) => SdAlg::try_from(alg.as_str()),
        Some(other) => Err(Error::UnsupportedSdAlg(other.to_string())),
    }
}

/// Rebuild the disclosed claim set of an issuer-signed payload.
///
/// Digests in `_sd` arrays and `{"...": digest}` array elements are replaced
/// with the matching disclosure, recursively. Digests without a disclosure are
/// decoys or undisclosed claims and are dropped. Every disclosure must be
/// referenced exactly once.
pub fn decode_disclosures<S: AsRef<str>>(
    mut claims: Map<String, Value>,
    disclosures: &[S],
) -> Result<Map<String, Value>, Error> {
    let sd_alg = sd_alg(&claims)?;
    claims.remove(SD_ALG_CLAIM_NAME);

    let mut pending = translate_to_in_progress_disclosures(disclosures, sd_alg)?;
    visit_object(&mut claims, &mut pending)?;

    if let Some(unused) = pending.values().find(|d| !d.found) {
        log::debug!("disclosure {} is not referenced", unused.encoded);
        return Err(Error::UnusedDisclosure);
    }
    Ok(claims)
}

#[derive(Debug)]
struct InProgressDisclosure {
    encoded: String,
    decoded: DecodedDisclosure,
    found: bool,
}

fn translate_to_in_progress_disclosures<S: AsRef<str>>(
    disclosures: &[S],
    sd_alg: SdAlg,
) -> Result<BTreeMap<String, InProgressDisclosure>, Error> {
    let mut pending = BTreeMap::new();
    for disclosure in disclosures {
        let encoded = disclosure.as_ref();
        let decoded = DecodedDisclosure::new(encoded)?;
        let hash = hash_encoded_disclosure(sd_alg, encoded);
        let previous = pending.insert(
            hash,
            InProgressDisclosure {
                encoded: encoded.to_owned(),
                decoded,
                found: false,
            },
        );
        if previous.is_some() {
            return Err(Error::MultipleDisclosuresWithSameHash);
        }
    }
    Ok(pending)
}

/// Mark the disclosure behind `digest` as used and hand out its content.
fn claim(
    pending: &mut BTreeMap<String, InProgressDisclosure>,
    digest: &str,
) -> Result<Option<DisclosureKind>, Error> {
    match pending.get_mut(digest) {
        None => Ok(None),
        Some(disclosure) if disclosure.found => Err(Error::DisclosureUsedMultipleTimes),
        Some(disclosure) => {
            disclosure.found = true;
            Ok(Some(disclosure.decoded.kind.clone()))
        }
    }
}

fn visit(value: &mut Value, pending: &mut BTreeMap<String, InProgressDisclosure>) -> Result<(), Error> {
    match value {
        Value::Object(object) => visit_object(object, pending),
        Value::Array(items) => visit_array(items, pending),
        _ => Ok(()),
    }
}

fn visit_object(
    object: &mut Map<String, Value>,
    pending: &mut BTreeMap<String, InProgressDisclosure>,
) -> Result<(), Error> {
    if let Some(sd_claims) = object.remove(SD_CLAIM_NAME) {
        let digests = match sd_claims {
            Value::Array(digests) => digests,
            _ => {
                return Err(Error::InvalidDisclosure(
                    "`_sd` is not an array".to_string(),
                ))
            }
        };
        for digest in digests {
            let digest = digest.as_str().ok_or_else(|| {
                Error::InvalidDisclosure("`_sd` digest is not a string".to_string())
            })?;
            match claim(pending, digest)? {
                None => {}
                Some(DisclosureKind::Property { name, value }) => {
                    if object.contains_key(&name) {
                        return Err(Error::DisclosureClaimCollidesWithJwtClaim(name));
                    }
                    object.insert(name, value);
                }
                Some(DisclosureKind::ArrayItem(_)) => {
                    return Err(Error::ArrayDisclosureWhenExpectingProperty)
                }
            }
        }
    }

    // Disclosed values may themselves carry digests.
    for value in object.values_mut() {
        visit(value, pending)?;
    }
    Ok(())
}

fn visit_array(
    items: &mut Vec<Value>,
    pending: &mut BTreeMap<String, InProgressDisclosure>,
) -> Result<(), Error> {
    let mut disclosed = Vec::with_capacity(items.len());
    for mut item in items.drain(..) {
        match array_item_digest(&item)? {
            Some(digest) => match claim(pending, &digest)? {
                None => {}
                Some(DisclosureKind::ArrayItem(mut value)) => {
                    visit(&mut value, pending)?;
                    disclosed.push(value);
                }
                Some(DisclosureKind::Property { .. }) => {
                    return Err(Error::PropertyDisclosureWhenExpectingArray)
                }
            },
            None => {
                visit(&mut item, pending)?;
                disclosed.push(item);
            }
        }
    }
    *items = disclosed;
    Ok(())
}

/// Digest of an array element of the form `{"...": digest}`.
fn array_item_digest(item: &Value) -> Result<Option<String>, Error> {
    let object = match item {
        Value::Object(object) => object,
        _ => return Ok(None),
    };
    match object.get(ARRAY_CLAIM_ITEM_PROPERTY_NAME) {
        None => Ok(None),
        Some(Value::String(digest)) if object.len() == 1 => Ok(Some(digest.clone())),
        Some(_) => Err(Error::InvalidDisclosure(
            "array element digest must be the only, string valued, member".to_string(),
        )),
    }
}

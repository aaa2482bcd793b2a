//! Public keys carried by an `x5c` certificate chain.
use crate::der::{self, RSAPublicKey, SubjectPublicKeyInfo};
use crate::{ECParams, Error, Params, RSAParams, JWK};
use std::convert::TryFrom;

/// Extract the verifying key from the first certificate of an `x5c` chain.
///
/// The certificate is tried as an RSA key first, then as an EC key. The chain
/// itself is not validated.
pub fn parse_from_certificate_chain(x5c: &[String]) -> Result<JWK, Error> {
    let params = leaf_public_key(x5c).map_err(|e| {
        log::debug!("unable to import a key from x5c: {}", e);
        Error::InvalidKey(format!("invalid key in x5c certificate chain {:?}: {}", x5c, e))
    })?;
    let mut jwk = JWK::from(params);
    jwk.x509_certificate_chain = Some(x5c.to_vec());
    Ok(jwk)
}

fn leaf_public_key(x5c: &[String]) -> Result<Params, Error> {
    let leaf = x5c
        .first()
        .ok_or_else(|| Error::InvalidKey("empty certificate chain".to_string()))?;
    let der = base64::decode(leaf)?;
    let spki = SubjectPublicKeyInfo::from_certificate(&der)?
        .ok_or_else(|| Error::InvalidKey("no subject public key info".to_string()))?;
    match import_rsa(&spki) {
        Ok(params) => Ok(params),
        Err(rsa_err) => import_ec(&spki).map_err(|ec_err| {
            Error::InvalidKey(format!("not an RSA key ({rsa_err}) nor an EC key ({ec_err})"))
        }),
    }
}

fn import_rsa(spki: &SubjectPublicKeyInfo) -> Result<Params, Error> {
    if spki.algorithm != der::rsa_encryption() {
        return Err(Error::UnsupportedKeyType);
    }
    let rsa_pk = simple_asn1::der_decode::<RSAPublicKey>(&spki.subject_public_key)
        .map_err(|e| Error::InvalidKey(e.to_string()))?;
    Ok(Params::RSA(RSAParams::try_from(&rsa_pk)?))
}

fn import_ec(spki: &SubjectPublicKeyInfo) -> Result<Params, Error> {
    if spki.algorithm != der::ec_public_key() {
        return Err(Error::UnsupportedKeyType);
    }
    let curve = spki.parameters.as_ref().ok_or(Error::MissingCurve)?;
    let point = &spki.subject_public_key;
    let params = if *curve == der::prime256v1() {
        ECParams::from(&p256::PublicKey::from_sec1_bytes(point)?)
    } else if *curve == der::secp384r1() {
        ECParams::from(&p384::PublicKey::from_sec1_bytes(point)?)
    } else if *curve == der::secp256k1() {
        ECParams::from(&k256::PublicKey::from_sec1_bytes(point)?)
    } else {
        return Err(Error::CurveNotImplemented(format!("{curve:?}")));
    };
    Ok(Params::EC(params))
}

//! DER structures needed to pull a public key out of an X.509 certificate.
//!
//! Only the parts of [RFC 5280] and [RFC 8017] required to locate the
//! `SubjectPublicKeyInfo` of a certificate and to decode an RSA public key are
//! modelled. The certificate itself is walked with [simple_asn1] without
//! validating anything else.
//!
//! [RFC 5280]: https://datatracker.ietf.org/doc/html/rfc5280#section-4.1
//! [RFC 8017]: https://datatracker.ietf.org/doc/html/rfc8017#appendix-A.1.1
//! [simple_asn1]: https://crates.io/crates/simple_asn1

use num_bigint::BigInt;
use simple_asn1::{ASN1Block, ASN1DecodeErr, BigUint, FromASN1, OID};

fn oid(arcs: &[u64]) -> OID {
    OID::new(arcs.iter().map(|arc| BigUint::from(*arc)).collect())
}

/// rsaEncryption 1.2.840.113549.1.1.1
pub fn rsa_encryption() -> OID {
    oid(&[1, 2, 840, 113549, 1, 1, 1])
}

/// id-ecPublicKey 1.2.840.10045.2.1
pub fn ec_public_key() -> OID {
    oid(&[1, 2, 840, 10045, 2, 1])
}

/// prime256v1 1.2.840.10045.3.1.7
pub fn prime256v1() -> OID {
    oid(&[1, 2, 840, 10045, 3, 1, 7])
}

/// secp384r1 1.3.132.0.34
pub fn secp384r1() -> OID {
    oid(&[1, 3, 132, 0, 34])
}

/// secp256k1 1.3.132.0.10
pub fn secp256k1() -> OID {
    oid(&[1, 3, 132, 0, 10])
}

/// RSA public key, as specified in [RFC 8017].
///
/// [RFC 8017]: https://datatracker.ietf.org/doc/html/rfc8017#appendix-A.1.1
#[derive(Debug, Clone)]
pub struct RSAPublicKey {
    pub modulus: BigInt,
    pub public_exponent: BigInt,
}

#[derive(thiserror::Error, Debug)]
pub enum RSAPublicKeyFromASN1Error {
    #[error("Expected single sequence")]
    ExpectedSingleSequence,
    #[error("Expected two integers")]
    ExpectedTwoIntegers,
    #[error("ASN1 decoding error: {0:?}")]
    ASN1Decode(#[from] ASN1DecodeErr),
}

impl FromASN1 for RSAPublicKey {
    type Error = RSAPublicKeyFromASN1Error;
    fn from_asn1(v: &[ASN1Block]) -> Result<(Self, &[ASN1Block]), Self::Error> {
        let (items, rest) = match v {
            [ASN1Block::Sequence(_, items), rest @ ..] => (items, rest),
            _ => return Err(RSAPublicKeyFromASN1Error::ExpectedSingleSequence),
        };
        let (n, e) = match items.as_slice() {
            [ASN1Block::Integer(_, n), ASN1Block::Integer(_, e)] => (n, e),
            _ => return Err(RSAPublicKeyFromASN1Error::ExpectedTwoIntegers),
        };
        let pk = Self {
            modulus: n.clone(),
            public_exponent: e.clone(),
        };
        Ok((pk, rest))
    }
}

/// `SubjectPublicKeyInfo` of a certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: OID,
    /// Named curve for EC keys, absent (NULL) for RSA.
    pub parameters: Option<OID>,
    /// Content of the `subjectPublicKey` bit string.
    pub subject_public_key: Vec<u8>,
}

impl SubjectPublicKeyInfo {
    /// Find the first `SubjectPublicKeyInfo` in a DER encoded certificate.
    pub fn from_certificate(der: &[u8]) -> Result<Option<Self>, ASN1DecodeErr> {
        let blocks = simple_asn1::from_der(der)?;
        Ok(blocks.iter().find_map(Self::find))
    }

    fn find(block: &ASN1Block) -> Option<Self> {
        match block {
            ASN1Block::Sequence(_, items) => {
                Self::from_sequence(items).or_else(|| items.iter().find_map(Self::find))
            }
            ASN1Block::Explicit(_, _, _, inner) => Self::find(inner),
            _ => None,
        }
    }

    fn from_sequence(items: &[ASN1Block]) -> Option<Self> {
        let (algorithm, key) = match items {
            [ASN1Block::Sequence(_, algorithm), ASN1Block::BitString(_, _, key)] => {
                (algorithm, key)
            }
            _ => return None,
        };
        let (oid, parameters) = match algorithm.as_slice() {
            [ASN1Block::ObjectIdentifier(_, oid)] => (oid, None),
            [ASN1Block::ObjectIdentifier(_, oid), ASN1Block::Null(_)] => (oid, None),
            [ASN1Block::ObjectIdentifier(_, oid), ASN1Block::ObjectIdentifier(_, params)] => {
                (oid, Some(params.clone()))
            }
            _ => return None,
        };
        if *oid != rsa_encryption() && *oid != ec_public_key() {
            return None;
        }
        Some(Self {
            algorithm: oid.clone(),
            parameters,
            subject_public_key: key.clone(),
        })
    }
}

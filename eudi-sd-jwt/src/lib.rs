//! Selective Disclosure JWT presentations with Key Binding.
//!
//! A presentation is `issuer-jwt~disclosure~...~disclosure~kb-jwt`. This crate
//! splits it, rebuilds the disclosed claims from the digests in the
//! issuer-signed payload and checks the Key Binding JWT against a verifier
//! [`Challenge`]. Signature checks on the issuer JWT are left to the caller,
//! who knows which keys to trust.
use serde_json::{Map, Value};

mod decode;
pub mod digest;
pub mod disclosure;
mod encode;
mod error;
pub mod key_binding;

pub use decode::{decode_disclosures, sd_alg};
pub use digest::{hash_encoded_disclosure, SdAlg};
pub use disclosure::{DecodedDisclosure, DisclosureKind};
pub use encode::{encode_disclosure_with_rng, encode_sign, Disclosure, UnencodedDisclosure};
pub use error::{EncodeError, Error};
pub use key_binding::{create_key_binding, sd_hash, verify_key_binding, Challenge, KB_JWT_TYP};

pub const SD_CLAIM_NAME: &str = "_sd";
pub const SD_ALG_CLAIM_NAME: &str = "_sd_alg";
pub const ARRAY_CLAIM_ITEM_PROPERTY_NAME: &str = "...";

/// An SD-JWT presentation split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdJwtKb {
    pub issuer_jwt: String,
    pub disclosures: Vec<String>,
    pub key_binding_jwt: String,
}

impl SdJwtKb {
    /// Split a presentation. The last segment must be a compact JWS; an
    /// SD-JWT without Key Binding (trailing `~`) is refused.
    pub fn parse(token: &str) -> Result<Self, Error> {
        let mut segments: Vec<&str> = token.split('~').collect();
        if segments.len() < 2 {
            return Err(Error::MalformedToken("no `~` separator".to_string()));
        }
        let key_binding_jwt = segments.pop().unwrap_or_default();
        if key_binding_jwt.is_empty() {
            return Err(Error::MalformedToken("missing key binding JWT".to_string()));
        }
        eudi_jws::split_jws(key_binding_jwt)
            .map_err(|_| Error::MalformedToken("key binding JWT is not a JWS".to_string()))?;

        let issuer_jwt = segments.remove(0);
        eudi_jws::split_jws(issuer_jwt)
            .map_err(|_| Error::MalformedToken("issuer JWT is not a JWS".to_string()))?;
        if segments.iter().any(|disclosure| disclosure.is_empty()) {
            return Err(Error::MalformedToken("empty disclosure".to_string()));
        }

        Ok(Self {
            issuer_jwt: issuer_jwt.to_owned(),
            disclosures: segments.into_iter().map(ToOwned::to_owned).collect(),
            key_binding_jwt: key_binding_jwt.to_owned(),
        })
    }

    /// Holder side: bind `issuer_jwt` and the chosen `disclosures` to a challenge.
    pub fn present(
        issuer_jwt: &str,
        disclosures: &[&str],
        holder_key: &eudi_jwk::JWK,
        challenge: &Challenge,
        iat: i64,
    ) -> Result<Self, Error> {
        let mut presented = Self {
            issuer_jwt: issuer_jwt.to_owned(),
            disclosures: disclosures.iter().map(|d| d.to_string()).collect(),
            key_binding_jwt: String::new(),
        };
        presented.key_binding_jwt =
            create_key_binding(holder_key, challenge, &presented.sd_jwt_without_kb(), iat)?;
        Ok(presented)
    }

    /// `issuer-jwt~disclosure~...~`, the input of `sd_hash`.
    pub fn sd_jwt_without_kb(&self) -> String {
        let mut serialized = self.issuer_jwt.clone();
        serialized.push('~');
        for disclosure in &self.disclosures {
            serialized.push_str(disclosure);
            serialized.push('~');
        }
        serialized
    }

    pub fn issuer_header(&self) -> Result<eudi_jws::Header, Error> {
        Ok(eudi_jws::decode_unverified(&self.issuer_jwt)?.0)
    }

    /// Issuer payload as signed, digests not yet resolved.
    pub fn issuer_claims_unverified(&self) -> Result<Map<String, Value>, Error> {
        let (_, payload) = eudi_jws::decode_unverified(&self.issuer_jwt)?;
        match serde_json::from_slice(&payload)? {
            Value::Object(claims) => Ok(claims),
            _ => Err(Error::ClaimsWrongType),
        }
    }

    /// Disclosed claims, without any signature check.
    pub fn disclosed_claims(&self) -> Result<Map<String, Value>, Error> {
        decode_disclosures(self.issuer_claims_unverified()?, &self.disclosures)
    }

    pub fn verify_key_binding(
        &self,
        holder_jwk: &eudi_jwk::JWK,
        challenge: &Challenge,
    ) -> Result<Map<String, Value>, Error> {
        verify_key_binding(
            &self.key_binding_jwt,
            holder_jwk,
            challenge,
            &self.sd_jwt_without_kb(),
        )
    }
}

impl std::fmt::Display for SdJwtKb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.sd_jwt_without_kb(), self.key_binding_jwt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_segments() {
        let parsed = SdJwtKb::parse("a.b.c~d1~d2~e.f.g").unwrap();
        assert_eq!(parsed.issuer_jwt, "a.b.c");
        assert_eq!(parsed.disclosures, vec!["d1", "d2"]);
        assert_eq!(parsed.key_binding_jwt, "e.f.g");
        assert_eq!(parsed.sd_jwt_without_kb(), "a.b.c~d1~d2~");
        assert_eq!(parsed.to_string(), "a.b.c~d1~d2~e.f.g");

        let bare = SdJwtKb::parse("a.b.c~e.f.g").unwrap();
        assert!(bare.disclosures.is_empty());
        assert_eq!(bare.sd_jwt_without_kb(), "a.b.c~");
    }

    #[test]
    fn parse_rejects_malformed() {
        for token in ["a.b.c", "a.b.c~d1~", "a.b.c~d1~notajws", "~d1~e.f.g", "a.b.c~~e.f.g", ""] {
            assert!(
                matches!(SdJwtKb::parse(token), Err(Error::MalformedToken(_))),
                "{token}"
            );
        }
    }
}

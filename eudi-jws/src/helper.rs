use crate::{
    decode_jws_parts, encode_sign_custom_header, split_jws, verify_bytes, Algorithm, Error,
    Header, KeySelectionError, JWK,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Signs and verifies compact JWS with one key or a key set.
///
/// Keys are chosen as follows when signing: a forced `kid` must match exactly;
/// otherwise a `kid` found in the supplied headers must match; otherwise the
/// only held key is used. Anything else is ambiguous and refused.
#[derive(Debug, Clone)]
pub struct JwsHelper {
    keys: Vec<JWK>,
}

impl JwsHelper {
    pub fn new(keys: Vec<JWK>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[JWK] {
        &self.keys
    }

    pub fn select_signing_key(
        &self,
        headers: &[&Map<String, Value>],
        forced_kid: Option<&str>,
    ) -> Result<&JWK, KeySelectionError> {
        if self.keys.is_empty() {
            return Err(KeySelectionError::Empty);
        }
        if let Some(kid) = forced_kid {
            return self.find_by_kid(kid);
        }
        let header_kid = headers
            .iter()
            .find_map(|header| header.get("kid").and_then(Value::as_str));
        if let Some(kid) = header_kid {
            return self.find_by_kid(kid);
        }
        match self.keys.as_slice() {
            [key] => Ok(key),
            keys => Err(KeySelectionError::Ambiguous(keys.len())),
        }
    }

    /// A key without a `kid` of its own is known by its thumbprint, which is
    /// what [`JwsHelper::sign`] puts in the header for it.
    fn find_by_kid(&self, kid: &str) -> Result<&JWK, KeySelectionError> {
        let mut matching = self.keys.iter().filter(|key| match &key.key_id {
            Some(key_id) => key_id == kid,
            None => key.thumbprint().map_or(false, |thumbprint| thumbprint == kid),
        });
        match (matching.next(), matching.next()) {
            (Some(key), None) => Ok(key),
            (Some(_), Some(_)) => Err(KeySelectionError::Ambiguous(self.keys.len())),
            (None, _) => Err(KeySelectionError::UnknownKeyId(kid.to_string())),
        }
    }

    /// Sign `payload` into a compact JWS.
    ///
    /// `alg` is always set, from `protected` when given there, else from the
    /// key. `kid` is present in the output iff `kid_in_header`.
    pub fn sign(
        &self,
        payload: &[u8],
        protected: Map<String, Value>,
        kid_in_header: bool,
        signing_kid: Option<&str>,
    ) -> Result<String, Error> {
        let key = self.select_signing_key(&[&protected], signing_kid)?;
        let mut header = protected;
        let algorithm = match header.get("alg").and_then(Value::as_str) {
            Some(alg) => alg
                .parse::<Algorithm>()
                .map_err(|e| Error::UnsupportedAlgorithm(e.0))?,
            None => key.get_algorithm().ok_or(Error::MissingAlgorithm)?,
        };
        header.insert("alg".to_string(), Value::String(algorithm.to_string()));
        if kid_in_header {
            let kid = match &key.key_id {
                Some(kid) => kid.clone(),
                None => key.thumbprint()?,
            };
            header.insert("kid".to_string(), Value::String(kid));
        } else {
            header.remove("kid");
        }
        encode_sign_custom_header(payload, key, &header)
    }

    /// Serialize `claims` as JSON and sign them.
    pub fn sign_claims<T: Serialize>(
        &self,
        claims: &T,
        protected: Map<String, Value>,
        kid_in_header: bool,
    ) -> Result<String, Error> {
        let payload = serde_json::to_vec(claims)?;
        self.sign(&payload, protected, kid_in_header, None)
    }

    /// Key to verify a token with the given header, if one can be chosen with
    /// confidence.
    pub fn select_verifying_key(&self, header: &Header) -> Option<&JWK> {
        match &header.key_id {
            Some(kid) => self.find_by_kid(kid).ok(),
            None => match self.keys.as_slice() {
                [key] => Some(key),
                _ => None,
            },
        }
    }

    /// Verify `token` and return its JSON payload.
    pub fn verify(&self, token: &str) -> Result<Value, Error> {
        let (header_b64, payload_b64, signature_b64) = split_jws(token)?;
        let decoded = decode_jws_parts(header_b64, payload_b64, signature_b64)?;
        let key = self.select_verifying_key(&decoded.header).ok_or_else(|| {
            Error::SignatureInvalid(match &decoded.header.key_id {
                Some(kid) => format!("no verifying key with kid `{kid}`"),
                None => format!("unable to choose among {} keys", self.keys.len()),
            })
        })?;
        verify_bytes(
            decoded.header.algorithm,
            &decoded.signing_input,
            key,
            &decoded.signature,
        )
        .map_err(|e| {
            log::debug!("signature check failed: {}", e);
            Error::SignatureInvalid(e.to_string())
        })?;
        Ok(serde_json::from_slice(&decoded.payload)?)
    }
}

impl From<JWK> for JwsHelper {
    fn from(key: JWK) -> Self {
        Self::new(vec![key])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode_header_map;
    use serde_json::json;

    fn sign_jwks() -> Vec<JWK> {
        serde_json::from_value(json!([
            {"crv":"P-256","d":"qIVMRJ0ioosFjCFhBw-kLBuip9tV0Y2D6iYD42nCKBA","kid":"ppBQZHPUTaEPdiLsj99gadhfqLtYMwiU9bmDCfAsWfI","kty":"EC","use":"sig","x":"_336mq5GanihcG_V40tiLDq2sFJ83w-vxaPAZtfCr40","y":"CYUM4Q1YlSTTgSp6OnJZt-O4YlzPf430AgVAM0oNlQk"},
            {"crv":"P-256","d":"SW976Rpuse5crOTbM5yBifa7u1tgw46XlJCJRwon4kA","kid":"35DgiI1eugPL1QB7sHG826YLLLLGDogvHmDa2jUilas","kty":"EC","use":"sig","x":"RXQ0lfXVXikgi00Yy8Qm2EX83_1JbLTXhyUXj9M21lk","y":"xTfCwP-eelZXMBFNKwiEUQaUJeebHWcVgnGyB7fOF1M"}
        ]))
        .unwrap()
    }

    fn verify_jwks() -> Vec<JWK> {
        sign_jwks().iter().map(JWK::to_public).collect()
    }

    fn kid_header(kid: &str) -> Header {
        serde_json::from_value(json!({"alg": "ES256", "kid": kid})).unwrap()
    }

    #[test]
    fn select_signing_key_undefined() {
        let signer = JwsHelper::new(sign_jwks());
        assert_eq!(
            signer.select_signing_key(&[], None),
            Err(KeySelectionError::Ambiguous(2))
        );
    }

    #[test]
    fn select_signing_key_forced() {
        let keys = sign_jwks();
        let signer = JwsHelper::new(keys.clone());
        let k = signer
            .select_signing_key(&[&Map::new(), &Map::new()], keys[0].key_id.as_deref())
            .unwrap();
        assert_eq!(k, &keys[0]);
        assert!(matches!(
            signer.select_signing_key(&[], Some("missing")),
            Err(KeySelectionError::UnknownKeyId(_))
        ));
    }

    #[test]
    fn select_signing_key_infer_kid() {
        let keys = sign_jwks();
        let signer = JwsHelper::new(keys.clone());
        let mut header = Map::new();
        header.insert("kid".to_string(), json!(keys[1].key_id));
        let k = signer.select_signing_key(&[&header, &Map::new()], None).unwrap();
        assert_eq!(k, &keys[1]);
    }

    #[test]
    fn select_signing_key_unique() {
        let keys = sign_jwks();
        let signer = JwsHelper::from(keys[0].clone());
        let k = signer.select_signing_key(&[&Map::new()], None).unwrap();
        assert_eq!(k, &keys[0]);
    }

    #[test]
    fn signed_header_kid_only_when_requested() {
        let keys = sign_jwks();
        let signer = JwsHelper::from(keys[0].clone());

        let jws = signer.sign(b"", Map::new(), true, None).unwrap();
        let header = decode_header_map(&jws).unwrap();
        assert_eq!(header["kid"], json!(keys[0].key_id));
        assert_eq!(header["alg"], "ES256");

        let jws = signer.sign(b"", Map::new(), false, None).unwrap();
        let header = decode_header_map(&jws).unwrap();
        assert!(header.get("kid").is_none());
        assert_eq!(header["alg"], "ES256");
    }

    #[test]
    fn select_verifying_key() {
        let keys = verify_jwks();
        let verifier = JwsHelper::new(keys.clone());
        let no_kid: Header = serde_json::from_value(json!({"alg": "ES256"})).unwrap();
        assert_eq!(verifier.select_verifying_key(&no_kid), None);
        let kid = keys[1].key_id.clone().unwrap();
        assert_eq!(
            verifier.select_verifying_key(&kid_header(&kid)),
            Some(&keys[1])
        );

        let verifier = JwsHelper::from(keys[0].clone());
        assert_eq!(verifier.select_verifying_key(&no_kid), Some(&keys[0]));
        assert_eq!(verifier.select_verifying_key(&kid_header("other")), None);
    }

    #[test]
    fn sign_then_verify_returns_payload() {
        let signer = JwsHelper::new(sign_jwks());
        let claims = json!({"iss": "https://issuer.example", "n": 1});
        let mut protected = Map::new();
        protected.insert("typ".to_string(), json!("JWT"));
        let jws = signer
            .sign(
                &serde_json::to_vec(&claims).unwrap(),
                protected,
                true,
                sign_jwks()[1].key_id.as_deref(),
            )
            .unwrap();
        let verifier = JwsHelper::new(verify_jwks());
        assert_eq!(verifier.verify(&jws).unwrap(), claims);
    }

    #[test]
    fn verify_without_confident_key_is_invalid() {
        let signer = JwsHelper::from(sign_jwks()[0].clone());
        let jws = signer
            .sign_claims(&json!({"a": 1}), Map::new(), false)
            .unwrap();
        let verifier = JwsHelper::new(verify_jwks());
        assert!(matches!(
            verifier.verify(&jws),
            Err(Error::SignatureInvalid(_))
        ));

        let wrong_key = JwsHelper::from(verify_jwks()[1].clone());
        assert!(matches!(
            wrong_key.verify(&jws),
            Err(Error::SignatureInvalid(_))
        ));
    }

    #[test]
    fn key_without_kid_is_found_by_thumbprint() {
        let key = JWK::generate_p256().unwrap();
        let jws = JwsHelper::from(key.clone())
            .sign(br#"{"a":1}"#, Map::new(), true, None)
            .unwrap();
        let header = decode_header_map(&jws).unwrap();
        assert_eq!(header["kid"], json!(key.thumbprint().unwrap()));

        let mut keys = verify_jwks();
        keys.push(key.to_public());
        assert_eq!(JwsHelper::from(key.to_public()).verify(&jws).unwrap(), json!({"a": 1}));
        assert_eq!(JwsHelper::new(keys).verify(&jws).unwrap(), json!({"a": 1}));
    }
}

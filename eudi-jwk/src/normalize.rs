//! Normalization of key material supplied in any of the accepted forms.
use crate::{ECParams, Error, OctetParams, Params, RSAParams, JWK};
use serde_json::{Map, Value};
use std::convert::TryFrom;

/// Key object from another crate that can describe itself as a JWK.
pub trait ToJwk {
    fn to_jwk(&self) -> Result<JWK, Error>;
}

/// The forms key material is accepted in.
pub enum KeyInput<'a> {
    /// Already normalized.
    Jwk(JWK),
    /// Raw JSON object with JWK members.
    Map(Map<String, Value>),
    /// Key object from a curve or RSA crate.
    External(&'a dyn ToJwk),
}

impl From<JWK> for KeyInput<'_> {
    fn from(jwk: JWK) -> Self {
        Self::Jwk(jwk)
    }
}

impl From<Map<String, Value>> for KeyInput<'_> {
    fn from(map: Map<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl<'a, T: ToJwk> From<&'a T> for KeyInput<'a> {
    fn from(key: &'a T) -> Self {
        Self::External(key)
    }
}

/// Turn any accepted key form into a [`JWK`].
pub fn normalize<'a>(input: impl Into<KeyInput<'a>>) -> Result<JWK, Error> {
    match input.into() {
        KeyInput::Jwk(jwk) => Ok(jwk),
        KeyInput::Map(map) => serde_json::from_value(Value::Object(map))
            .map_err(|e| Error::InvalidKey(format!("not a JWK: {e}"))),
        KeyInput::External(key) => key.to_jwk(),
    }
}

/// Normalize a JSON value; anything but an object is rejected.
pub fn normalize_value(value: &Value) -> Result<JWK, Error> {
    match value {
        Value::Object(map) => normalize(map.clone()),
        other => Err(Error::InvalidKey(format!(
            "expected a JSON object, found {other}"
        ))),
    }
}

impl ToJwk for JWK {
    fn to_jwk(&self) -> Result<JWK, Error> {
        Ok(self.clone())
    }
}

impl ToJwk for p256::PublicKey {
    fn to_jwk(&self) -> Result<JWK, Error> {
        Ok(JWK::from(Params::EC(ECParams::from(self))))
    }
}

impl ToJwk for p256::SecretKey {
    fn to_jwk(&self) -> Result<JWK, Error> {
        Ok(JWK::from(Params::EC(ECParams::try_from(self)?)))
    }
}

impl ToJwk for p384::PublicKey {
    fn to_jwk(&self) -> Result<JWK, Error> {
        Ok(JWK::from(Params::EC(ECParams::from(self))))
    }
}

impl ToJwk for k256::PublicKey {
    fn to_jwk(&self) -> Result<JWK, Error> {
        Ok(JWK::from(Params::EC(ECParams::from(self))))
    }
}

impl ToJwk for rsa::RsaPublicKey {
    fn to_jwk(&self) -> Result<JWK, Error> {
        use rsa::traits::PublicKeyParts;
        Ok(JWK::from(Params::RSA(RSAParams::new_public(
            &self.e().to_bytes_be(),
            &self.n().to_bytes_be(),
        ))))
    }
}

impl ToJwk for ed25519_dalek::VerifyingKey {
    fn to_jwk(&self) -> Result<JWK, Error> {
        Ok(JWK::from(Params::OKP(OctetParams {
            curve: "Ed25519".to_string(),
            public_key: crate::Base64urlUInt(self.as_bytes().to_vec()),
            private_key: None,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p256_map() -> Map<String, Value> {
        match json!({
            "kty": "EC",
            "crv": "P-256",
            "kid": "323489393350363785490670228924001503025813043335",
            "x": "WSiinTNQYqYel_KKgb4sUvIA5BgFfw-urJZEmQhBZnU",
            "y": "ac_koF4ZIZOjjIBc3BwEHwnNB6fERIOugR37OlCiaNo"
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn normalize_accepts_every_form() {
        let from_map = normalize(p256_map()).unwrap();
        assert_eq!(
            from_map.key_id.as_deref(),
            Some("323489393350363785490670228924001503025813043335")
        );

        let from_jwk = normalize(from_map.clone()).unwrap();
        assert_eq!(from_jwk, from_map);

        let pk = match &from_map.params {
            Params::EC(ec) => p256::PublicKey::try_from(ec).unwrap(),
            _ => panic!("expected an EC key"),
        };
        let from_external = normalize(&pk).unwrap();
        assert!(from_external.equals_public(&from_map));
        assert_eq!(from_external.key_id, None);
    }

    #[test]
    fn normalize_rejects_non_keys() {
        let mut map = Map::new();
        map.insert("kty".to_string(), json!("nope"));
        assert!(matches!(normalize(map), Err(Error::InvalidKey(_))));
        assert!(matches!(
            normalize_value(&json!(["not", "a", "key"])),
            Err(Error::InvalidKey(_))
        ));
        assert!(normalize_value(&Value::Object(p256_map())).is_ok());
    }
}

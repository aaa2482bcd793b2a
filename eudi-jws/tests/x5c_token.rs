use eudi_jwk::parse_from_certificate_chain;
use eudi_jws::{decode_unverified, JwsHelper, JWK};
use serde_json::json;

const TOKEN: &str = include_str!("data/x5c-token.txt");

fn issuer_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "EC",
        "use": "sig",
        "crv": "P-256",
        "kid": "323489393350363785490670228924001503025813043335",
        "x": "WSiinTNQYqYel_KKgb4sUvIA5BgFfw-urJZEmQhBZnU",
        "y": "ac_koF4ZIZOjjIBc3BwEHwnNB6fERIOugR37OlCiaNo"
    }))
    .unwrap()
}

#[test_log::test]
fn verify_token_with_single_key_and_no_kid() {
    let verifier = JwsHelper::from(issuer_key());
    let claims = verifier.verify(TOKEN.trim()).unwrap();
    assert_eq!(claims["iss"], "https://qa.id.cloud.dvv.fi/pid-provider/pid/1.0");
    assert_eq!(claims["_sd_alg"], "sha-256");
}

#[test_log::test]
fn verify_token_with_key_from_its_x5c_header() {
    let (header, _) = decode_unverified(TOKEN.trim()).unwrap();
    assert_eq!(header.type_.as_deref(), Some("vc+sd-jwt"));
    let x5c = header.x509_certificate_chain.unwrap();
    let key = parse_from_certificate_chain(&x5c).unwrap();
    assert!(key.equals_public(&issuer_key()));
    JwsHelper::from(key).verify(TOKEN.trim()).unwrap();
}

use std::sync::Arc;

use eudi_jws::{JwsHelper, JWK};
use eudi_sd_jwt::{encode_sign, Challenge, SdJwtKb, UnencodedDisclosure};
use eudi_trust::{CombinedTrustEvaluator, DirectTrustConfig, DirectTrustSdJwtVc, ReqwestClient, TrustError};
use eudi_vp::{SdJwtVcVerifier, Verifier, VpError};
use serde_json::{json, Map, Value};

const ISSUER: &str = "https://issuer.example";
const VERIFIER_ID: &str = "verifier-1";
const NONCE: &str = "abc123";

struct Wallet {
    issuer_key: JWK,
    holder_key: JWK,
    exp: i64,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn key(kid: &str) -> JWK {
    let mut key = JWK::generate_p256().unwrap();
    key.key_id = Some(kid.to_string());
    key
}

impl Wallet {
    fn new() -> Self {
        Self {
            issuer_key: key("issuer-1"),
            holder_key: key("holder-1"),
            exp: now() + 7200,
        }
    }

    fn present_with(&self, typ: &str, mut claims: Value, nonce: &str) -> String {
        claims["cnf"] = json!({"jwk": self.holder_key.to_public()});
        let mut protected = Map::new();
        protected.insert("typ".to_string(), json!(typ));
        let (jwt, disclosures) = encode_sign(
            &JwsHelper::from(self.issuer_key.clone()),
            protected,
            true,
            &claims,
            &[
                UnencodedDisclosure::new_property("given_name", &"Erika").unwrap(),
                UnencodedDisclosure::new_property("family_name", &"Mustermann").unwrap(),
            ],
        )
        .unwrap();
        let encoded: Vec<&str> = disclosures.iter().map(|d| d.encoded.as_str()).collect();
        SdJwtKb::present(
            &jwt,
            &encoded,
            &self.holder_key,
            &Challenge::new(VERIFIER_ID, nonce),
            now(),
        )
        .unwrap()
        .to_string()
    }

    fn present(&self, nonce: &str) -> String {
        self.present_with(
            "vc+sd-jwt",
            json!({
                "iss": ISSUER,
                "iat": now(),
                "exp": self.exp,
                "vct": "urn:eudi:pid:1",
            }),
            nonce,
        )
    }

    fn trusting(&self, keys: Vec<JWK>) -> Verifier {
        let direct = DirectTrustSdJwtVc::new(
            DirectTrustConfig {
                jwks: Some(keys),
                ..Default::default()
            },
            Arc::new(ReqwestClient::default()),
        );
        Verifier::new(Arc::new(direct))
    }

    fn verifier(&self) -> Verifier {
        self.trusting(vec![self.issuer_key.to_public()])
    }
}

#[test_log::test(tokio::test)]
async fn valid_presentation_discloses_claims() {
    let wallet = Wallet::new();
    let claims = wallet
        .verifier()
        .verify(&wallet.present(NONCE), VERIFIER_ID, NONCE)
        .await
        .unwrap();
    assert_eq!(claims["iss"], ISSUER);
    assert_eq!(claims["given_name"], "Erika");
    assert_eq!(claims["family_name"], "Mustermann");
    assert!(!claims.contains_key("_sd"));
}

#[test_log::test(tokio::test)]
async fn wrong_nonce_breaks_holder_binding() {
    let wallet = Wallet::new();
    assert!(matches!(
        wallet
            .verifier()
            .verify(&wallet.present("wrong"), VERIFIER_ID, NONCE)
            .await,
        Err(VpError::HolderBindingInvalid(_))
    ));
    assert!(matches!(
        wallet
            .verifier()
            .verify(&wallet.present(NONCE), "verifier-2", NONCE)
            .await,
        Err(VpError::HolderBindingInvalid(_))
    ));
}

#[test_log::test(tokio::test)]
async fn expired_presentation() {
    let wallet = Wallet::new();
    assert!(matches!(
        wallet
            .verifier()
            .verify_at(&wallet.present(NONCE), VERIFIER_ID, NONCE, wallet.exp + 1)
            .await,
        Err(VpError::PresentationExpired(exp)) if exp == wallet.exp
    ));
}

#[test_log::test(tokio::test)]
async fn untrusted_issuer_key() {
    let wallet = Wallet::new();
    let verifier = wallet.trusting(vec![key("issuer-1").to_public()]);
    assert!(matches!(
        verifier.verify(&wallet.present(NONCE), VERIFIER_ID, NONCE).await,
        Err(VpError::SignatureInvalid(_))
    ));
}

#[test_log::test(tokio::test)]
async fn issuer_is_required() {
    let wallet = Wallet::new();
    let token = wallet.present_with("vc+sd-jwt", json!({"exp": wallet.exp}), NONCE);
    assert!(matches!(
        wallet.verifier().verify(&token, VERIFIER_ID, NONCE).await,
        Err(VpError::MissingIssuer)
    ));
}

#[test_log::test(tokio::test)]
async fn trust_failures_are_reported() {
    let wallet = Wallet::new();
    let verifier = Verifier::new(Arc::new(CombinedTrustEvaluator::new(vec![])));
    assert!(matches!(
        verifier.verify(&wallet.present(NONCE), VERIFIER_ID, NONCE).await,
        Err(VpError::Trust(TrustError::NoHandlerSucceeded { .. }))
    ));
}

#[test_log::test(tokio::test)]
async fn mdoc_is_not_supported() {
    let wallet = Wallet::new();
    let token = wallet.present_with("mso_mdoc", json!({"iss": ISSUER}), NONCE);
    assert!(matches!(
        wallet.verifier().verify(&token, VERIFIER_ID, NONCE).await,
        Err(VpError::VPFormatNotSupported(_))
    ));
}

#[test_log::test(tokio::test)]
async fn sd_jwt_without_key_binding_is_malformed() {
    let wallet = Wallet::new();
    let token = wallet.present(NONCE);
    let without_kb = &token[..=token.rfind('~').unwrap()];
    assert!(matches!(
        wallet.verifier().verify(without_kb, VERIFIER_ID, NONCE).await,
        Err(VpError::MalformedToken(_))
    ));
}

#[test_log::test]
fn parse_skips_verification() {
    let wallet = Wallet::new();
    let parser = SdJwtVcVerifier::new(Arc::new(CombinedTrustEvaluator::new(vec![])));
    let token = wallet.present("any");
    assert_eq!(parser.issuer(&token).unwrap(), ISSUER);
    let claims = eudi_vp::PresentationVerifier::parse(&parser, &token).unwrap();
    assert_eq!(claims["given_name"], "Erika");
    assert!(!parser.is_revoked(&token));
}

#[test_log::test(tokio::test)]
async fn live_credential_passes_revocation_check() {
    let wallet = Wallet::new();
    let token = wallet.present(NONCE);
    let verifier = SdJwtVcVerifier::new(Arc::new(DirectTrustSdJwtVc::new(
        DirectTrustConfig {
            jwks: Some(vec![wallet.issuer_key.to_public()]),
            ..Default::default()
        },
        Arc::new(ReqwestClient::default()),
    )));
    assert!(!verifier.is_revoked(&token));
    verifier.validate(&token, VERIFIER_ID, NONCE).await.unwrap();
}

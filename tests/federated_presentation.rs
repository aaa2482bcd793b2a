use std::sync::Arc;

use eudi_verifier::{
    jws::JwsHelper,
    sd_jwt::{encode_sign, Challenge, SdJwtKb, UnencodedDisclosure},
    trust::{
        DirectTrustConfig, DirectTrustSdJwtVc, FederationConfig, FederationHandler,
        InMemoryTrustStore, ReqwestClient, TrustAnchorRecord, TrustStore,
    },
    CombinedTrustEvaluator, TrustError, TrustHandler, Verifier, VpError, JWK,
};
use serde_json::{json, Map, Value};

const ANCHOR: &str = "https://anchor.example";
const ISSUER: &str = "https://issuer.example";

fn key(kid: &str) -> JWK {
    let mut key = JWK::generate_p256().unwrap();
    key.key_id = Some(kid.to_string());
    key
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn statement(signer: &JWK, claims: Value) -> String {
    let mut protected = Map::new();
    protected.insert("typ".to_string(), json!("entity-statement+jwt"));
    JwsHelper::from(signer.clone())
        .sign_claims(&claims, protected, true)
        .unwrap()
}

struct Setup {
    anchor_key: JWK,
    credential_key: JWK,
    holder_key: JWK,
    chain: Vec<String>,
}

impl Setup {
    fn new() -> Self {
        let anchor_key = key("anchor-1");
        let federation_key = key("issuer-federation-1");
        let credential_key = key("issuer-credential-1");
        let exp = now() + 3600;
        let leaf = statement(
            &federation_key,
            json!({
                "iss": ISSUER, "sub": ISSUER, "iat": now(), "exp": exp,
                "jwks": {"keys": [federation_key.to_public()]},
                "authority_hints": [ANCHOR],
                "metadata": {"openid_credential_issuer": {
                    "jwks": {"keys": [credential_key.to_public()]},
                }},
            }),
        );
        let subordinate = statement(
            &anchor_key,
            json!({
                "iss": ANCHOR, "sub": ISSUER, "iat": now(), "exp": exp,
                "jwks": {"keys": [federation_key.to_public()]},
            }),
        );
        Self {
            anchor_key,
            credential_key,
            holder_key: key("holder-1"),
            chain: vec![leaf, subordinate],
        }
    }

    fn store(&self) -> Arc<InMemoryTrustStore> {
        let store = InMemoryTrustStore::new();
        store
            .add_trust_anchor(TrustAnchorRecord {
                entity_id: ANCHOR.to_string(),
                entity_configuration: statement(
                    &self.anchor_key,
                    json!({
                        "iss": ANCHOR, "sub": ANCHOR, "iat": now(), "exp": now() + 3600,
                        "jwks": {"keys": [self.anchor_key.to_public()]},
                    }),
                ),
            })
            .unwrap();
        Arc::new(store)
    }

    fn present(&self) -> String {
        let mut protected = Map::new();
        protected.insert("typ".to_string(), json!("dc+sd-jwt"));
        protected.insert("trust_chain".to_string(), json!(self.chain));
        let (jwt, disclosures) = encode_sign(
            &JwsHelper::from(self.credential_key.clone()),
            protected,
            true,
            &json!({
                "iss": ISSUER,
                "exp": now() + 7200,
                "cnf": {"jwk": self.holder_key.to_public()},
            }),
            &[UnencodedDisclosure::new_property("age_over_18", &true).unwrap()],
        )
        .unwrap();
        SdJwtKb::present(
            &jwt,
            &[disclosures[0].encoded.as_str()],
            &self.holder_key,
            &Challenge::new("verifier-1", "abc123"),
            now(),
        )
        .unwrap()
        .to_string()
    }
}

fn federation(store: Arc<InMemoryTrustStore>) -> Arc<dyn TrustHandler> {
    let config: FederationConfig =
        serde_json::from_value(json!({"entity_id": "https://verifier.example"})).unwrap();
    Arc::new(FederationHandler::new(config, Arc::new(ReqwestClient::default()), store).unwrap())
}

#[tokio::test]
async fn issuer_trusted_through_federation() {
    let setup = Setup::new();
    let store = setup.store();
    let verifier = Verifier::new(Arc::new(CombinedTrustEvaluator::new(vec![federation(
        store.clone(),
    )])));

    let claims = verifier
        .verify(&setup.present(), "verifier-1", "abc123")
        .await
        .unwrap();
    assert_eq!(claims["age_over_18"], true);

    let record = store.get_trust_source(ISSUER).await.unwrap();
    assert_eq!(record.trust_chain, Some(setup.chain.clone()));
    assert!(record.trust_param("federation").is_some());
}

#[tokio::test]
async fn unknown_anchor_falls_through_to_direct_trust() {
    let setup = Setup::new();
    let direct = DirectTrustSdJwtVc::new(
        DirectTrustConfig {
            jwks: Some(vec![setup.credential_key.to_public()]),
            ..Default::default()
        },
        Arc::new(ReqwestClient::default()),
    );
    let handlers: Vec<Arc<dyn TrustHandler>> = vec![
        federation(Arc::new(InMemoryTrustStore::new())),
        Arc::new(direct),
    ];
    let verifier = Verifier::new(Arc::new(CombinedTrustEvaluator::new(handlers)));

    let claims = verifier
        .verify(&setup.present(), "verifier-1", "abc123")
        .await
        .unwrap();
    assert_eq!(claims["iss"], ISSUER);
}

#[tokio::test]
async fn unknown_anchor_is_reported_as_such() {
    let setup = Setup::new();
    let verifier = Verifier::new(Arc::new(CombinedTrustEvaluator::new(vec![federation(
        Arc::new(InMemoryTrustStore::new()),
    )])));
    assert!(matches!(
        verifier.verify(&setup.present(), "verifier-1", "abc123").await,
        Err(VpError::Trust(TrustError::UnknownTrustAnchor(anchor))) if anchor == ANCHOR
    ));
}

#[tokio::test]
async fn no_trust_path() {
    let setup = Setup::new();
    let direct = DirectTrustSdJwtVc::new(
        DirectTrustConfig {
            jwks: Some(vec![]),
            ..Default::default()
        },
        Arc::new(ReqwestClient::default()),
    );
    let handlers: Vec<Arc<dyn TrustHandler>> = vec![
        federation(Arc::new(InMemoryTrustStore::new())),
        Arc::new(direct),
    ];
    let verifier = Verifier::new(Arc::new(CombinedTrustEvaluator::new(handlers)));
    match verifier.verify(&setup.present(), "verifier-1", "abc123").await {
        Err(VpError::Trust(TrustError::NoHandlerSucceeded { issuer, errors })) => {
            assert_eq!(issuer, ISSUER);
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].0, "federation");
            assert!(matches!(errors[0].1, TrustError::UnknownTrustAnchor(_)));
            assert!(matches!(errors[1].1, TrustError::NoKeys(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
}

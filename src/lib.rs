//! Verification of digital-identity credential presentations.
//!
//! This crate gathers the workspace members under one roof:
//! - [`jwk`]: key material, normalized from JWK objects, curve and RSA key
//!   types, or X.509 certificate chains;
//! - [`jws`]: compact JWS signing and verification with key selection;
//! - [`sd_jwt`]: SD-JWT presentations, disclosures and Key Binding JWTs;
//! - [`trust`]: issuer trust, either published by the issuer itself or
//!   reached through an [OpenID Federation][federation] trust chain;
//! - [`vp`]: the presentation [`Verifier`].
//!
//! [federation]: <https://openid.net/specs/openid-federation-1_0.html>
//!
//! # Basic Usage
//!
//! A verifier trusting one statically configured issuer key:
//!
//! ```
//! use std::sync::Arc;
//! use eudi_verifier::{
//!     sd_jwt::{encode_sign, Challenge, SdJwtKb, UnencodedDisclosure},
//!     trust::{DirectTrustConfig, DirectTrustSdJwtVc, ReqwestClient},
//!     jws::JwsHelper,
//!     Verifier, JWK,
//! };
//! use serde_json::{json, Map};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let issuer_key = JWK::generate_p256().unwrap();
//! let holder_key = JWK::generate_p256().unwrap();
//! let now = chrono::Utc::now().timestamp();
//!
//! // Issuer side.
//! let mut protected = Map::new();
//! protected.insert("typ".to_string(), json!("vc+sd-jwt"));
//! let (jwt, disclosures) = encode_sign(
//!     &JwsHelper::from(issuer_key.clone()),
//!     protected,
//!     false,
//!     &json!({
//!         "iss": "https://issuer.example",
//!         "exp": now + 7200,
//!         "cnf": {"jwk": holder_key.to_public()},
//!     }),
//!     &[UnencodedDisclosure::new_property("given_name", &"Erika").unwrap()],
//! )
//! .unwrap();
//!
//! // Holder side.
//! let token = SdJwtKb::present(
//!     &jwt,
//!     &[disclosures[0].encoded.as_str()],
//!     &holder_key,
//!     &Challenge::new("verifier-1", "abc123"),
//!     now,
//! )
//! .unwrap()
//! .to_string();
//!
//! // Verifier side.
//! let trust = DirectTrustSdJwtVc::new(
//!     DirectTrustConfig {
//!         jwks: Some(vec![issuer_key.to_public()]),
//!         ..Default::default()
//!     },
//!     Arc::new(ReqwestClient::default()),
//! );
//! let claims = Verifier::new(Arc::new(trust))
//!     .verify(&token, "verifier-1", "abc123")
//!     .await
//!     .unwrap();
//! assert_eq!(claims["given_name"], "Erika");
//! # }
//! ```

pub use eudi_jwk as jwk;
pub use eudi_jws as jws;
pub use eudi_sd_jwt as sd_jwt;
pub use eudi_trust as trust;
pub use eudi_vp as vp;

#[doc(inline)]
pub use jwk::{JWKSet, JWK};
#[doc(inline)]
pub use trust::{CombinedTrustEvaluator, TrustError, TrustHandler};
#[doc(inline)]
pub use vp::{ClaimSet, Verifier, VpError};

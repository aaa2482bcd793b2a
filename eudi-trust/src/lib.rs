//! Issuer trust evaluation.
//!
//! A [`TrustHandler`] turns an issuer identifier, plus whatever trust hints
//! came with a credential, into the keys allowed to sign for that issuer.
//! [`DirectTrustSdJwtVc`] reads keys the issuer publishes itself;
//! [`FederationHandler`] accepts keys reached through an OpenID Federation
//! trust chain ending at a configured trust anchor. [`CombinedTrustEvaluator`]
//! asks several handlers in order.
//!
//! Network access, caching and persistence go through the [`HttpClient`],
//! [`FetchCache`] and [`TrustStore`] traits so they can be swapped in tests.
pub mod cache;
pub mod chain;
pub mod combined;
pub mod config;
pub mod direct;
pub mod error;
pub mod federation;
pub mod handler;
pub mod http;
pub mod model;
pub mod policy;
pub mod store;

pub use cache::{FetchCache, MokaFetchCache};
pub use chain::{EntityStatement, StaticTrustChainValidator};
pub use combined::CombinedTrustEvaluator;
pub use config::{DirectTrustConfig, FederationConfig, HttpcParams};
pub use direct::{build_issuer_endpoint_alternate, build_jwk_issuer_endpoint_ietf, DirectTrustSdJwtVc};
pub use error::{HttpError, PolicyError, StoreError, TrustError};
pub use federation::FederationHandler;
pub use handler::TrustHandler;
pub use http::{fetch_json, HttpClient, HttpResponse, ReqwestClient};
pub use model::{StaticTrustMaterials, TrustEvaluation, TrustSourceData};
pub use store::{InMemoryTrustStore, TrustAnchorRecord, TrustStore};

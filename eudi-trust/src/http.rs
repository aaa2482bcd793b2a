use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;

use crate::{HttpError, HttpcParams};

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn json(&self) -> Result<Value, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::Body {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }

    /// Fail with [`HttpError::Status`] unless the status is 200.
    pub fn ok(self) -> Result<Self, HttpError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::Status {
                url: self.url,
                status: self.status,
            })
        }
    }
}

/// Outbound GET requests. Injected so tests and embedders can substitute transports.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, params: &HttpcParams) -> Result<HttpResponse, HttpError>;

    async fn get_many(
        &self,
        urls: &[String],
        params: &HttpcParams,
        concurrent: bool,
    ) -> Vec<Result<HttpResponse, HttpError>> {
        if concurrent {
            futures::future::join_all(urls.iter().map(|url| self.get(url, params))).await
        } else {
            let mut responses = Vec::with_capacity(urls.len());
            for url in urls {
                responses.push(self.get(url, params).await);
            }
            responses
        }
    }
}

/// GET `url` and parse a 200 response as JSON.
pub async fn fetch_json(
    http: &dyn HttpClient,
    url: &str,
    params: &HttpcParams,
) -> Result<Value, HttpError> {
    http.get(url, params).await?.ok()?.json()
}

/// [`HttpClient`] over `reqwest`, with one pooled client per [`HttpcParams`].
#[derive(Clone)]
pub struct ReqwestClient {
    clients: Cache<HttpcParams, reqwest::Client>,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            clients: Cache::new(16),
        }
    }

    async fn client(&self, params: &HttpcParams) -> Result<reqwest::Client, HttpError> {
        self.clients
            .try_get_with(params.clone(), async { build_client(params) })
            .await
            .map_err(|e| (*e).clone())
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_client(params: &HttpcParams) -> Result<reqwest::Client, HttpError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        "User-Agent",
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(params.timeout))
        .danger_accept_invalid_certs(!params.ssl)
        .build()
        .map_err(|e| HttpError::Client(e.to_string()))
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, params: &HttpcParams) -> Result<HttpResponse, HttpError> {
        let request_error = |e: reqwest::Error| HttpError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        };
        log::debug!("GET {}", url);
        let resp = self
            .client(params)
            .await?
            .get(url)
            .send()
            .await
            .map_err(request_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(request_error)?;
        Ok(HttpResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params() -> HttpcParams {
        HttpcParams {
            ssl: false,
            timeout: 2,
        }
    }

    #[tokio::test]
    async fn get_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .and(header("User-Agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
            .mount(&mock_server)
            .await;

        let url = format!("{}/doc", mock_server.uri());
        let value = fetch_json(&ReqwestClient::new(), &url, &params()).await.unwrap();
        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn non_200_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing", mock_server.uri());
        assert_eq!(
            fetch_json(&ReqwestClient::new(), &url, &params()).await,
            Err(HttpError::Status { url, status: 404 })
        );
    }

    #[tokio::test]
    async fn get_many_keeps_order() {
        let mock_server = MockServer::start().await;
        for name in ["one", "two"] {
            Mock::given(method("GET"))
                .and(path(format!("/{name}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(name))
                .mount(&mock_server)
                .await;
        }
        let urls = vec![
            format!("{}/one", mock_server.uri()),
            format!("{}/two", mock_server.uri()),
        ];
        let http = ReqwestClient::new();
        for concurrent in [true, false] {
            let bodies: Vec<_> = http
                .get_many(&urls, &params(), concurrent)
                .await
                .into_iter()
                .map(|resp| resp.unwrap().body)
                .collect();
            assert_eq!(bodies, vec!["one", "two"]);
        }
    }

    #[tokio::test]
    async fn clients_are_reused_per_params() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let http = ReqwestClient::new();
        let url = format!("{}/doc", mock_server.uri());
        let slow = HttpcParams {
            timeout: 10,
            ..params()
        };
        for params in [params(), params(), slow.clone(), slow] {
            assert_eq!(http.get(&url, &params).await.unwrap().body, "ok");
        }
        http.clients.run_pending_tasks().await;
        assert_eq!(http.clients.entry_count(), 2);
    }
}

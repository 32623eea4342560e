//! `reqwest` implementation of the console transport.

use std::future::Future;

use admin_core::{ApiRequest, ApiResponse, ConsoleError, Transport};
use admin_model::Method;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, HeaderMap, HeaderValue};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Sends console requests to an admin backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a transport for the backend described by `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        tracing::debug!(base = %base, timeout = ?config.timeout, "HTTP transport ready");
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of `request`: the path resolved against the base URL,
    /// followed by the query pairs in order.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self
            .base
            .join(&request.path)
            .map_err(|e| ClientError::InvalidPath {
                path: request.path.clone(),
                message: e.to_string(),
            })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(err: &reqwest::Error) -> ConsoleError {
    if err.is_timeout() {
        ConsoleError::Transport(format!("request timed out: {err}"))
    } else {
        ConsoleError::Transport(err.to_string())
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = admin_core::Result<ApiResponse>> + Send {
        let client = self.client.clone();
        let url = self.url_for(&request);
        async move {
            let url = url?;
            tracing::debug!(method = %request.method, url = %url, "sending request");

            let mut builder = client.request(http_method(request.method), url);
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
            let response = builder.send().await.map_err(|e| transport_error(&e))?;

            let status = response.status();
            let content_disposition = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(&e))?
                .to_vec();

            if !status.is_success() {
                tracing::debug!(status = status.as_u16(), path = %request.path, "request failed");
            }
            Ok(ApiResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                content_disposition,
                body,
            })
        }
    }
}

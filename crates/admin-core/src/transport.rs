//! The seam between the console and the HTTP client.

use std::future::Future;

use admin_model::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ConsoleError, Result};

/// A request to the admin backend. Paths are relative to the backend base.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Query string pairs, in order.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Reason phrase of the status line.
    pub status_text: String,
    /// `Content-Disposition` header, present for file downloads.
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// A 200 response with a JSON body.
    pub fn json(body: &Value) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            content_disposition: None,
            body: body.to_string().into_bytes(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the JSON body. An empty body decodes as `null`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Message describing a failed response: the JSON `error` field, else
    /// the raw body text, else the HTTP status text.
    pub fn error_message(&self) -> String {
        let text = self.text();
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text)
            && let Some(error) = map.get("error").and_then(Value::as_str)
            && !error.is_empty()
        {
            return error.to_string();
        }
        if text.trim().is_empty() {
            self.status_text.clone()
        } else {
            text
        }
    }

    /// Turn a non-200 response into [`ConsoleError::Api`].
    pub fn check(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(ConsoleError::Api {
                status: self.status,
                message: self.error_message(),
            })
        }
    }

    /// File name announced by `Content-Disposition`, if this is a download.
    pub fn download_name(&self) -> Option<String> {
        let header = self.content_disposition.as_deref()?;
        let name = header
            .split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("filename="))
            .unwrap_or("download");
        Some(name.trim_matches('"').to_string())
    }
}

/// Sends requests to the admin backend.
///
/// Implementations return `Err` only when no response was received; HTTP
/// error statuses are reported through [`ApiResponse::status`].
pub trait Transport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send;
}

impl<T: Transport + Sync> Transport for &T {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send {
        (**self).send(request)
    }
}

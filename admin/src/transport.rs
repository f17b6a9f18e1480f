//! Executes core `HttpRequest`s over the network.
//!
//! # Design
//! One attempt per request, no retries. The whole round-trip (connect, send,
//! read body) runs under a single deadline; when it elapses the request
//! future is dropped, which aborts the connection, and the caller gets
//! `ApiError::Timeout`. Multipart bodies are encoded here so that boundary
//! generation and the `multipart/form-data` content type stay with the HTTP
//! library.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part as FormPart};
use trashclean_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Part, RequestBody};

/// Anything that can run a request to completion.
pub trait HttpTransport: Send + Sync + 'static {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn prepare(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            None => builder,
            Some(RequestBody::Json(text)) => builder.body(text),
            Some(RequestBody::Multipart(parts)) => builder.multipart(encode_form(parts)?),
        };
        Ok(builder)
    }

    async fn round_trip(builder: reqwest::RequestBuilder) -> Result<HttpResponse, reqwest::Error> {
        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await?;
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method.as_str();
        let url = request.url.clone();
        tracing::debug!(method, %url, "sending request");

        let builder = self.prepare(request)?;
        let response = match tokio::time::timeout(self.timeout, Self::round_trip(builder)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                tracing::warn!(method, %url, error = %err, "request failed");
                return Err(ApiError::Transport(err.to_string()));
            }
            Err(_) => {
                tracing::warn!(method, %url, timeout = ?self.timeout, "request timed out");
                return Err(ApiError::Timeout(self.timeout));
            }
        };

        if response.is_success() {
            tracing::debug!(method, %url, status = response.status, "response received");
        } else {
            tracing::warn!(method, %url, status = response.status, "server returned an error");
        }
        Ok(response)
    }
}

fn encode_form(parts: Vec<Part>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        let mut field = FormPart::bytes(part.data);
        if let Some(file_name) = part.file_name {
            field = field.file_name(file_name);
        }
        let field = field
            .mime_str(&part.content_type)
            .map_err(|e| ApiError::Serialization(format!("part '{}': {e}", part.name)))?;
        form = form.part(part.name, field);
    }
    Ok(form)
}

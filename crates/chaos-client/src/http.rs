//! reqwest-backed [`Transport`]

use chaos_core::{Method, Request, RequestBody, Response, Transport, TransportError};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Sends chaos requests to a live service over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url`
    ///
    /// # Errors
    /// `TransportError::Other` when the client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a request path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn classify(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let url = self.url_for(&request.path);
        let builder = self.client.request(to_reqwest_method(request.method), url);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Raw { content_type, data } => {
                builder.header(CONTENT_TYPE, content_type).body(data)
            }
        };

        let response = builder.send().await.map_err(|e| self.classify(&e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Body(e.to_string())
            }
        })?;
        Ok(Response::new(status, body))
    }
}

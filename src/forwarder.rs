//! Detection request forwarding
//!
//! Relays POST /detect to the RayService Serve endpoint. The backend's
//! status, headers, and body come back verbatim, including its own 4xx/5xx;
//! only failing to reach the backend at all is turned into a 502.

use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Response};
use futures::TryStreamExt;
use tracing::{debug, info, warn};

use crate::descriptor::ResourceDescriptor;
use crate::Error;

/// Upper bound on a full backend round trip, body included
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(60);

/// Request headers the HTTP client derives itself and must not be copied
const SKIPPED_REQUEST_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "transfer-encoding",
    "connection",
    "trailer",
];

/// Response headers tied to the backend connection rather than the payload
const HOP_BY_HOP_RESPONSE_HEADERS: &[&str] = &["connection", "transfer-encoding", "keep-alive"];

/// Where detection requests are sent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyTarget {
    /// Backend URL
    pub url: String,
    /// Round-trip timeout
    pub timeout: Duration,
}

impl ProxyTarget {
    /// Target at `url` with the standard timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: PROXY_TIMEOUT,
        }
    }

    /// Target at `url_override` if given, else the workload's in-cluster Serve URL
    pub fn resolve(url_override: Option<&str>, descriptor: &ResourceDescriptor) -> Self {
        match url_override.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Self::new(url),
            None => Self::new(descriptor.default_detect_url()),
        }
    }
}

/// Forwards inference requests to a fixed backend
#[derive(Clone)]
pub struct RequestForwarder {
    client: reqwest::Client,
    target: ProxyTarget,
}

impl RequestForwarder {
    /// Build a forwarder with its own HTTP client
    pub fn new(target: ProxyTarget) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(target.timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, target })
    }

    /// Backend this forwarder targets
    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    /// Forward `request` to the backend and stream the reply back.
    ///
    /// Non-POST requests are rejected before any network I/O. The inbound
    /// body is buffered; the response body is streamed.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        if request.method() != Method::POST {
            return Err(Error::MethodNotAllowed);
        }

        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| Error::validation(format!("Error reading request: {}", e)))?;

        debug!(
            target_url = %self.target.url,
            body_len = body.len(),
            "forwarding detection request"
        );

        let response = self
            .client
            .post(&self.target.url)
            .headers(outbound_headers(&parts.headers))
            .body(body)
            .send()
            .await
            .map_err(|source| Error::BackendUnreachable {
                target: self.target.url.clone(),
                source,
            })?;

        let status = response.status();
        let mut builder = Response::builder().status(status);
        if let Some(headers) = builder.headers_mut() {
            *headers = inbound_headers(response.headers());
        }

        let target = self.target.url.clone();
        let stream = response.bytes_stream().inspect_err(move |e| {
            // Status line is already out; all we can do is cut the body short
            warn!(target_url = %target, error = %e, "error streaming backend response body");
        });

        info!(target_url = %self.target.url, status = %status, "proxied detection request");

        builder
            .body(Body::from_stream(stream))
            .map_err(|e| Error::internal(format!("Failed to build response: {}", e)))
    }
}

/// Copy inbound request headers minus those the client computes itself
fn outbound_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in SKIPPED_REQUEST_HEADERS {
        out.remove(*name);
    }
    out
}

/// Copy backend response headers minus hop-by-hop ones
fn inbound_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in HOP_BY_HOP_RESPONSE_HEADERS {
        out.remove(*name);
    }
    out
}

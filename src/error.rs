//! Error types for spotter-manager
//!
//! One enum covers every failure a request can hit. The HTTP status each
//! variant maps to is decided here, so handlers only ever propagate with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::control_plane::ControlPlaneError;
use crate::descriptor::ResourceDescriptor;
use crate::manifest::DecodeError;
use crate::template::TemplateError;

/// Message returned for any non-POST request to a mutating endpoint
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Only POST requests are allowed.";

/// Main error type for spotter-manager operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bad caller input; nothing was attempted
    #[error("validation error: {0}")]
    Validation(String),

    /// Endpoint only accepts POST
    #[error("{}", METHOD_NOT_ALLOWED_MESSAGE)]
    MethodNotAllowed,

    /// Manifest template could not be loaded or rendered
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Rendered manifest could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Control plane rejected the apply
    #[error("failed to apply {descriptor}: {source}")]
    Apply {
        /// Workload the apply targeted
        descriptor: ResourceDescriptor,
        /// Underlying control-plane failure
        source: ControlPlaneError,
    },

    /// Control plane rejected the delete for a reason other than not-found
    #[error("failed to delete {descriptor}: {source}")]
    Delete {
        /// Workload the delete targeted
        descriptor: ResourceDescriptor,
        /// Underlying control-plane failure
        source: ControlPlaneError,
    },

    /// Inference backend could not be reached or timed out
    #[error("bad gateway: failed to communicate with detection service at {target}: {source}")]
    BackendUnreachable {
        /// Backend URL that was tried
        target: String,
        /// Underlying transport failure
        source: reqwest::Error,
    },

    /// Internal/operational error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status this error surfaces as
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::BackendUnreachable { .. } => StatusCode::BAD_GATEWAY,
            Error::Template(_)
            | Error::Decode(_)
            | Error::Apply { .. }
            | Error::Delete { .. }
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure happened before anything was sent to the control plane
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::MethodNotAllowed | Error::Template(_) | Error::Decode(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

//! Error types on both sides of the adapter.
//!
//! # Design
//! `NativeError` is what a native client reports: either a typed status error
//! carrying the response, or a transport failure. Callers never see it
//! directly. They see exactly two shapes: `FatalRequestException` when no
//! usable response exists, and `RequestException` when a well-formed response
//! has a status the caller's `FailurePolicy` rejects. `SendError` is the union
//! returned by the async path, which is the only path that raises the latter
//! eagerly.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::native::NativeResponse;
use crate::request::PendingRequest;
use crate::response::Response;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Broad class of a native transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// DNS, TCP or TLS could not establish a connection.
    Connect,
    Timeout,
    Io,
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportKind::Connect => "connection",
            TransportKind::Timeout => "timeout",
            TransportKind::Io => "i/o",
            TransportKind::Other => "transport",
        })
    }
}

/// A failure reported by a native client.
#[derive(Debug, Error)]
pub enum NativeError {
    /// The native client's own typed HTTP error: a response arrived but its
    /// status is an error by the native client's rules.
    #[error("HTTP request returned status code {}", .response.status)]
    Status { response: NativeResponse },

    /// No response could be obtained.
    #[error("{kind} error: {source}")]
    Transport {
        kind: TransportKind,
        #[source]
        source: BoxError,
    },
}

impl NativeError {
    pub fn transport(kind: TransportKind, source: impl Into<BoxError>) -> Self {
        NativeError::Transport {
            kind,
            source: source.into(),
        }
    }

    pub fn connect(source: impl Into<BoxError>) -> Self {
        Self::transport(TransportKind::Connect, source)
    }

    pub fn is_status(&self) -> bool {
        matches!(self, NativeError::Status { .. })
    }

    pub fn is_connect(&self) -> bool {
        matches!(
            self,
            NativeError::Transport {
                kind: TransportKind::Connect,
                ..
            }
        )
    }

    /// The response attached to a status error.
    pub fn response(&self) -> Option<&NativeResponse> {
        match self {
            NativeError::Status { response } => Some(response),
            NativeError::Transport { .. } => None,
        }
    }
}

/// The request could not be completed at the transport level.
#[derive(Debug, Error)]
#[error("request to {url} failed: {source}", url = .request.url())]
pub struct FatalRequestException {
    #[source]
    source: NativeError,
    request: Box<PendingRequest>,
}

impl FatalRequestException {
    pub fn new(source: NativeError, request: PendingRequest) -> Self {
        Self {
            source,
            request: Box::new(request),
        }
    }

    pub fn pending_request(&self) -> &PendingRequest {
        &self.request
    }

    pub fn native_error(&self) -> &NativeError {
        &self.source
    }
}

/// Classification of a failed response by status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestExceptionKind {
    Unauthorized,
    PaymentRequired,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    RequestTimeout,
    UnprocessableEntity,
    TooManyRequests,
    /// Any other 4xx.
    ClientError,
    InternalServerError,
    ServiceUnavailable,
    GatewayTimeout,
    /// Any other 5xx.
    ServerError,
    /// A status outside 4xx/5xx that the caller's policy still rejects.
    Other,
}

impl RequestExceptionKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            402 => Self::PaymentRequired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            408 => Self::RequestTimeout,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            400..=499 => Self::ClientError,
            500 => Self::InternalServerError,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::PaymentRequired
                | Self::Forbidden
                | Self::NotFound
                | Self::MethodNotAllowed
                | Self::RequestTimeout
                | Self::UnprocessableEntity
                | Self::TooManyRequests
                | Self::ClientError
        )
    }

    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::InternalServerError | Self::ServiceUnavailable | Self::GatewayTimeout | Self::ServerError
        )
    }
}

impl fmt::Display for RequestExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unauthorized => "unauthorized",
            Self::PaymentRequired => "payment required",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::RequestTimeout => "request timeout",
            Self::UnprocessableEntity => "unprocessable entity",
            Self::TooManyRequests => "too many requests",
            Self::ClientError => "client error",
            Self::InternalServerError => "internal server error",
            Self::ServiceUnavailable => "service unavailable",
            Self::GatewayTimeout => "gateway timeout",
            Self::ServerError => "server error",
            Self::Other => "request failed",
        })
    }
}

/// A well-formed response whose status the caller treats as a failure.
#[derive(Debug, Error)]
#[error("{kind} (status {status}) from {url}", status = .response.status(), url = .response.pending_request().url())]
pub struct RequestException {
    kind: RequestExceptionKind,
    response: Box<Response>,
    #[source]
    source: Option<Arc<NativeError>>,
}

impl RequestException {
    pub(crate) fn new(response: Response, source: Option<Arc<NativeError>>) -> Self {
        Self {
            kind: RequestExceptionKind::from_status(response.status()),
            response: Box::new(response),
            source,
        }
    }

    pub fn kind(&self) -> RequestExceptionKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.response.status()
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        *self.response
    }

    /// The native client's own error for this response, when it produced one.
    pub fn native_error(&self) -> Option<&NativeError> {
        self.source.as_deref()
    }
}

/// Failure of an asynchronous send.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Fatal(#[from] FatalRequestException),
    #[error(transparent)]
    Request(#[from] RequestException),
}

impl SendError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SendError::Fatal(_))
    }

    /// The failed response, for status failures.
    pub fn response(&self) -> Option<&Response> {
        match self {
            SendError::Fatal(_) => None,
            SendError::Request(e) => Some(e.response()),
        }
    }
}

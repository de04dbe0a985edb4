//! The native client seam.
//!
//! # Design
//! The adapter talks to the underlying HTTP client only through
//! `NativeClient`. A native client has its own conventions, and they are kept
//! visible here rather than smoothed over:
//!
//! - `send` raises `NativeError::Status` for error statuses unless the
//!   request's `http_errors` option is off.
//! - `send_async` returns a promise that usually *fulfills* even when the call
//!   failed, with `Settled::Failed` carrying the error. Rejection is reserved
//!   for failures of the promise machinery itself.
//!
//! Reconciling those conventions with the caller's contract is the job of
//! `Sender` and `chain`, not of the clients.

mod encode;
pub mod mock;
mod ureq_3;

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::body::{BodyFormat, Payload};
use crate::error::NativeError;
use crate::http::{find_header, Headers, HttpMethod};

pub use encode::{encode, EncodedBody};
pub use mock::{MockClient, MockReply};
pub use ureq_3::UreqClient;

/// A call in the shape the native client accepts.
#[derive(Debug, Clone)]
pub struct NativeRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub options: RequestOptions,
}

/// Options understood by every native client.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Raise error statuses as `NativeError::Status`.
    pub http_errors: bool,
    pub body_format: Option<BodyFormat>,
    pub body: Option<Payload>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            http_errors: true,
            body_format: None,
            body: None,
        }
    }
}

/// A response as produced by the native client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl NativeResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Whether the native client considers this response an error: any 4xx or 5xx.
    pub fn failed(&self) -> bool {
        (400..600).contains(&self.status)
    }

    /// The native client's own exception for this response, if it failed.
    pub fn to_error(&self) -> Option<NativeError> {
        self.failed().then(|| NativeError::Status {
            response: self.clone(),
        })
    }
}

/// The value a native promise fulfills with.
#[derive(Debug)]
pub enum Settled {
    Response(NativeResponse),
    /// A failure the native client turned into a fulfilled value.
    Failed(NativeError),
}

/// A pending native call.
pub type NativePromise = BoxFuture<'static, Result<Settled, NativeError>>;

/// An underlying HTTP client.
pub trait NativeClient: Send + Sync {
    /// Execute `request`, blocking until a response or failure.
    fn send(&self, request: NativeRequest) -> Result<NativeResponse, NativeError>;

    /// Start `request` and return a promise of its outcome.
    fn send_async(&self, request: NativeRequest) -> NativePromise;
}

/// Apply a request's `http_errors` option to a completed exchange.
pub(crate) fn check_status(
    options: &RequestOptions,
    response: NativeResponse,
) -> Result<NativeResponse, NativeError> {
    if options.http_errors {
        if let Some(err) = response.to_error() {
            return Err(err);
        }
    }
    Ok(response)
}

/// Fold a native outcome into the value a native promise fulfills with.
pub(crate) fn settle(outcome: Result<NativeResponse, NativeError>) -> Settled {
    match outcome {
        Ok(response) => Settled::Response(response),
        Err(err) => Settled::Failed(err),
    }
}

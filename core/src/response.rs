//! The caller-facing response and the normalizer that produces it.
//!
//! # Design
//! `normalize` is pure: it copies what it needs out of the pending request
//! and the native response and does no I/O. Whether the response is a
//! failure is not decided here. `Response::to_exception` derives a
//! `RequestException` on demand from the caller's `FailurePolicy`, so a
//! synchronous caller chooses when (and whether) to raise it.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{NativeError, RequestException};
use crate::http::{find_header, Headers};
use crate::native::NativeResponse;
use crate::request::PendingRequest;

/// A completed exchange as the caller sees it.
#[derive(Debug, Clone)]
pub struct Response {
    request: PendingRequest,
    status: u16,
    headers: Headers,
    body: Bytes,
    native_error: Option<Arc<NativeError>>,
}

/// Wrap `raw` into a `Response` for `request`.
///
/// `native_error` is the native client's own exception for this response when
/// one is already known; it becomes the source of any derived exception.
pub fn normalize(
    request: &PendingRequest,
    raw: NativeResponse,
    native_error: Option<NativeError>,
) -> Response {
    tracing::debug!(status = raw.status, url = request.url(), "normalized response");
    Response {
        request: request.clone(),
        status: raw.status,
        headers: raw.headers,
        body: raw.body,
        native_error: native_error.map(Arc::new),
    }
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The request this response answers, as it was when sent.
    pub fn pending_request(&self) -> &PendingRequest {
        &self.request
    }

    pub fn native_error(&self) -> Option<&NativeError> {
        self.native_error.as_deref()
    }

    pub fn failed(&self) -> bool {
        self.request.failure_policy().has_failed(self.status)
    }

    pub fn successful(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// The exception this response represents, if the caller's policy says
    /// it failed.
    pub fn to_exception(&self) -> Option<RequestException> {
        self.failed()
            .then(|| RequestException::new(self.clone(), self.native_error.clone()))
    }

    /// Return the response, or its exception if it failed.
    pub fn throw(self) -> Result<Self, RequestException> {
        match self.to_exception() {
            Some(exception) => Err(exception),
            None => Ok(self),
        }
    }
}

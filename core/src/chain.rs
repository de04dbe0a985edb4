//! Re-threading of a native promise into the caller's async contract.
//!
//! # Design
//! A native promise may fulfill with a failure (`Settled::Failed`) or with a
//! response the native client itself would call an error. The first step
//! pushes both back onto the rejection path, so there is exactly one success
//! path and one failure path left. The failure path then splits on whether a
//! response exists: without one the call was fatal, with one it is normalized
//! and replaced by the caller's own exception. A response that settles the
//! chain is checked once more against the caller's policy, which may reject
//! statuses the native client was happy with.

use std::future::Future;

use futures::future;
use futures::TryFutureExt;

use crate::error::{FatalRequestException, NativeError, SendError};
use crate::native::{NativePromise, NativeResponse, Settled};
use crate::request::PendingRequest;
use crate::response::{normalize, Response};

/// Chain the caller's handling onto `promise`. Settles exactly once.
pub(crate) fn adapt(
    promise: NativePromise,
    request: PendingRequest,
) -> impl Future<Output = Result<Response, SendError>> + Send + 'static {
    let fulfilled = request.clone();
    promise
        .and_then(|settled| future::ready(surface(settled)))
        .map_ok(move |raw| normalize(&fulfilled, raw, None))
        .or_else(move |err| future::ready(reject(err, request)))
        .and_then(|response| future::ready(response.throw().map_err(SendError::from)))
}

fn surface(settled: Settled) -> Result<NativeResponse, NativeError> {
    match settled {
        Settled::Failed(err) => Err(err),
        Settled::Response(response) => match response.to_error() {
            Some(err) => Err(err),
            None => Ok(response),
        },
    }
}

fn reject(err: NativeError, request: PendingRequest) -> Result<Response, SendError> {
    match err {
        NativeError::Status { response } => {
            let raw = response.clone();
            let normalized = normalize(&request, raw, Some(NativeError::Status { response }));
            match normalized.to_exception() {
                Some(exception) => Err(exception.into()),
                // The caller accepts a status the native client rejected.
                None => Ok(normalized),
            }
        }
        err => {
            tracing::warn!(url = request.url(), error = %err, "async request failed before a response");
            Err(FatalRequestException::new(err, request).into())
        }
    }
}

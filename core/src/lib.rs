//! Sends caller-described HTTP requests through an interchangeable native
//! HTTP client.
//!
//! # Overview
//! A caller builds a `PendingRequest` and hands it to a `Sender`. The sender
//! translates it into a `NativeRequest`, runs it on the injected
//! `NativeClient`, and normalizes the outcome into a `Response`, a
//! `FatalRequestException` or a `RequestException`, whatever conventions the
//! native client follows.
//!
//! # Design
//! - `Sender::send` blocks and returns failed responses as values;
//!   `Response::throw` / `to_exception` raise them on demand.
//! - `Sender::send_async` returns a future that rejects with the caller's
//!   exception for failed statuses.
//! - The native client is a trait so tests can use `MockClient` and
//!   production code `UreqClient`.

pub mod body;
mod chain;
pub mod config;
pub mod error;
pub mod http;
pub mod native;
pub mod request;
pub mod response;
pub mod sender;

pub use body::{Body, BodyFormat, MultipartPart, Payload};
pub use config::{Config, SenderConfig};
pub use error::{FatalRequestException, NativeError, RequestException, RequestExceptionKind, SendError};
pub use http::HttpMethod;
pub use native::{MockClient, NativeClient, NativeRequest, NativeResponse, UreqClient};
pub use request::{FailurePolicy, PendingRequest};
pub use response::Response;
pub use sender::Sender;

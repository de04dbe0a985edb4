//! The request bridge between `PendingRequest` and a `NativeClient`.
//!
//! # Design
//! `Sender` owns one native client, injected at construction, and uses it
//! for every call so connection pooling is shared. Before each call it
//! switches the native client's error-status raising off: status codes are
//! judged by the caller's `FailurePolicy`, never by the native client.
//!
//! The two paths differ on purpose. `send` returns failed responses as
//! values and leaves raising to the caller (`Response::throw`). `send_async`
//! raises them as `SendError::Request`, because a future has no other way to
//! interrupt the caller's chain.

use std::future::Future;

use crate::body::translate;
use crate::chain;
use crate::config::{SenderConfig, HTTP_ERRORS};
use crate::error::{FatalRequestException, NativeError, SendError};
use crate::native::{NativeClient, NativeRequest, RequestOptions, UreqClient};
use crate::request::PendingRequest;
use crate::response::{normalize, Response};

/// Sends pending requests through a native client.
#[derive(Debug, Clone)]
pub struct Sender<C = UreqClient> {
    client: C,
}

impl Sender<UreqClient> {
    /// A sender over a fresh ureq agent built from `config`.
    pub fn from_config(config: &SenderConfig) -> Self {
        Self::new(UreqClient::from_config(config))
    }
}

impl<C: NativeClient> Sender<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Send `request` and block until the exchange completes.
    ///
    /// Only a failure without a response is an error here. `request`'s
    /// config is modified (`http_errors` is forced off).
    pub fn send(&self, request: &mut PendingRequest) -> Result<Response, FatalRequestException> {
        let native = bridge(request);
        match self.client.send(native) {
            Ok(raw) => {
                let native_error = raw.to_error();
                Ok(normalize(request, raw, native_error))
            }
            // Only reachable when the native client ignored `http_errors`.
            Err(NativeError::Status { response }) => {
                let raw = response.clone();
                Ok(normalize(request, raw, Some(NativeError::Status { response })))
            }
            Err(err) => {
                tracing::warn!(url = request.url(), error = %err, "request failed before a response");
                Err(FatalRequestException::new(err, request.clone()))
            }
        }
    }

    /// Send `request` and return a future of the normalized response.
    ///
    /// The future fails with `SendError::Fatal` when no response was obtained
    /// and with `SendError::Request` when the caller's policy rejects the
    /// response's status.
    pub fn send_async(
        &self,
        mut request: PendingRequest,
    ) -> impl Future<Output = Result<Response, SendError>> + Send + 'static {
        let native = bridge(&mut request);
        chain::adapt(self.client.send_async(native), request)
    }
}

/// Build the native call for `request`, forcing `http_errors` off first.
fn bridge(request: &mut PendingRequest) -> NativeRequest {
    request.config_mut().merge([(HTTP_ERRORS, false)]);
    let translated = request.body().map(translate);

    tracing::debug!(
        method = %request.method(),
        url = request.url(),
        body_format = ?translated.as_ref().map(|t| t.format),
        "sending request"
    );

    let (body_format, body) = match translated {
        Some(t) => (Some(t.format), Some(t.payload)),
        None => (None, None),
    };
    NativeRequest {
        method: request.method(),
        url: request.url().to_string(),
        headers: request.headers().to_vec(),
        options: RequestOptions {
            http_errors: request.config().http_errors(),
            body_format,
            body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Body, BodyFormat, MultipartPart, Payload};
    use crate::error::{RequestExceptionKind, TransportKind};
    use crate::http::HttpMethod;
    use crate::native::{MockClient, NativeResponse};
    use serde_json::json;

    fn get_user() -> PendingRequest {
        PendingRequest::new(HttpMethod::Get, "http://mock/user")
    }

    #[test]
    fn json_body_is_sent_as_json() {
        let mock = MockClient::new();
        let sender = Sender::new(mock.clone());
        let mut request = PendingRequest::new(HttpMethod::Post, "http://mock/user")
            .with_body(Body::Json(json!({"name": "Sam"})));

        sender.send(&mut request).unwrap();

        let native = mock.last_request().unwrap();
        assert_eq!(native.method, HttpMethod::Post);
        assert_eq!(native.options.body_format, Some(BodyFormat::Json));
        assert_eq!(native.options.body, Some(Payload::Json(json!({"name": "Sam"}))));
        assert_eq!(
            native.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn raw_body_is_sent_exactly() {
        let mock = MockClient::new();
        let sender = Sender::new(mock.clone());
        let mut request = get_user()
            .header("Content-Type", "application/xml")
            .with_body(Body::text("<p>Howdy</p>"));

        sender.send(&mut request).unwrap();

        let native = mock.last_request().unwrap();
        assert_eq!(native.options.body_format, Some(BodyFormat::Raw));
        assert_eq!(native.options.body, Some(Payload::Raw("<p>Howdy</p>".to_string())));
    }

    #[test]
    fn form_and_multipart_formats() {
        let mock = MockClient::new();
        let sender = Sender::new(mock.clone());

        let mut form = get_user().with_body(Body::form([("name", "Sam")]));
        sender.send(&mut form).unwrap();
        assert_eq!(
            mock.last_request().unwrap().options.body_format,
            Some(BodyFormat::FormParams)
        );

        let mut multipart =
            get_user().with_body(Body::Multipart(vec![MultipartPart::new("nickname", "Sam")]));
        sender.send(&mut multipart).unwrap();
        assert_eq!(
            mock.last_request().unwrap().options.body_format,
            Some(BodyFormat::Multipart)
        );
    }

    #[test]
    fn no_body_means_no_format() {
        let mock = MockClient::new();
        Sender::new(mock.clone()).send(&mut get_user()).unwrap();
        let native = mock.last_request().unwrap();
        assert!(native.options.body_format.is_none());
        assert!(native.options.body.is_none());
    }

    #[test]
    fn http_errors_is_forced_off_and_left_on_the_request() {
        let mock = MockClient::new();
        let sender = Sender::new(mock.clone());
        let mut request = get_user().with_config(HTTP_ERRORS, true).with_config("debug", true);

        sender.send(&mut request).unwrap();

        assert!(!mock.last_request().unwrap().options.http_errors);
        assert!(!request.config().http_errors());
        assert_eq!(request.config().get("debug"), Some(&json!(true)));
    }

    #[test]
    fn sync_error_status_is_a_value_not_an_error() {
        let sender = Sender::new(MockClient::new().respond(NativeResponse::new(500)));
        let response = sender.send(&mut get_user()).unwrap();

        assert_eq!(response.status(), 500);
        assert!(response.failed());
        assert!(response.native_error().is_some());
        let exception = response.to_exception().unwrap();
        assert_eq!(exception.kind(), RequestExceptionKind::InternalServerError);
    }

    #[test]
    fn sync_success_has_no_exception() {
        let sender = Sender::new(MockClient::new().respond(NativeResponse::new(201)));
        let response = sender.send(&mut get_user()).unwrap();
        assert!(response.native_error().is_none());
        assert!(response.to_exception().is_none());
    }

    #[test]
    fn sync_connection_failure_is_fatal() {
        let sender = Sender::new(MockClient::new().fail(NativeError::connect("connection refused")));
        let mut request = get_user();
        let fatal = sender.send(&mut request).unwrap_err();
        assert_eq!(fatal.pending_request().url(), "http://mock/user");
        assert!(fatal.native_error().is_connect());
    }

    #[test]
    fn sync_other_transport_failure_is_fatal() {
        let sender = Sender::new(
            MockClient::new().fail(NativeError::transport(TransportKind::Timeout, "timed out")),
        );
        assert!(sender.send(&mut get_user()).is_err());
    }

    #[test]
    fn sync_native_status_error_still_yields_response() {
        let native = NativeError::Status {
            response: NativeResponse::new(404).with_body("missing"),
        };
        let sender = Sender::new(MockClient::new().fail(native));
        let response = sender.send(&mut get_user()).unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.text(), "missing");
        let exception = response.throw().unwrap_err();
        assert_eq!(exception.kind(), RequestExceptionKind::NotFound);
        assert!(exception.native_error().is_some());
    }

    #[tokio::test]
    async fn async_success_fulfills() {
        let sender = Sender::new(
            MockClient::new().respond(NativeResponse::new(200).with_body(r#"{"name":"Sam"}"#)),
        );
        let response = sender.send_async(get_user()).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({"name": "Sam"}));
    }

    #[tokio::test]
    async fn async_500_rejects_with_caller_exception() {
        let sender = Sender::new(MockClient::new().respond(NativeResponse::new(500).with_body("boom")));
        let err = sender.send_async(get_user()).await.unwrap_err();
        let exception = match err {
            SendError::Request(exception) => exception,
            other => panic!("expected a request exception, got {other:?}"),
        };
        assert_eq!(exception.status(), 500);
        assert_eq!(exception.response().text(), "boom");
    }

    #[tokio::test]
    async fn async_connection_failure_is_fatal_on_both_native_conventions() {
        let sender = Sender::new(
            MockClient::new()
                .fail(NativeError::connect("refused"))
                .reject(NativeError::connect("refused")),
        );
        for _ in 0..2 {
            let err = sender.send_async(get_user()).await.unwrap_err();
            match err {
                SendError::Fatal(fatal) => assert_eq!(fatal.pending_request().url(), "http://mock/user"),
                other => panic!("expected a fatal exception, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn async_request_is_bridged_like_sync() {
        let mock = MockClient::new();
        let sender = Sender::new(mock.clone());
        let request = get_user().with_body(Body::text("<p>Howdy</p>"));

        sender.send_async(request).await.unwrap();

        let native = mock.last_request().unwrap();
        assert!(!native.options.http_errors);
        assert_eq!(native.options.body, Some(Payload::Raw("<p>Howdy</p>".to_string())));
    }
}

use std::io::{self, Read};

use bytes::Bytes;
use futures::FutureExt;
use ureq::http;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::RequestBuilder;

use super::{check_status, encode, settle, NativeClient, NativePromise, NativeRequest, NativeResponse};
use crate::config::SenderConfig;
use crate::error::{NativeError, TransportKind};
use crate::http::{find_header, Headers, HttpMethod};

/// A native client backed by a shared `ureq::Agent`.
///
/// Clones share the agent's connection pool. Any agent works: error-status
/// raising is switched off per request, and the `http_errors` request option
/// is applied on top once the whole response has been read.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    pub fn from_config(config: &SenderConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout()))
            .timeout_connect(Some(config.connect_timeout()))
            .user_agent(config.user_agent.as_str())
            .build()
            .new_agent();
        Self::new(agent)
    }

    fn execute(&self, request: &NativeRequest) -> Result<http::Response<ureq::Body>, NativeError> {
        let mut headers = request.headers.clone();
        let body = match &request.options.body {
            Some(payload) => {
                let encoded =
                    encode(payload).map_err(|e| NativeError::transport(TransportKind::Other, e))?;
                if let Some(content_type) = encoded.content_type {
                    if find_header(&headers, "content-type").is_none() {
                        headers.push(("Content-Type".to_string(), content_type));
                    }
                }
                Some(encoded.bytes)
            }
            None => None,
        };

        let url = request.url.as_str();
        let body = body.as_deref();
        let result = match request.method {
            HttpMethod::Get => without_body(self.agent.get(url), &headers, body),
            HttpMethod::Delete => without_body(self.agent.delete(url), &headers, body),
            HttpMethod::Head => without_body(self.agent.head(url), &headers, body),
            HttpMethod::Options => without_body(self.agent.options(url), &headers, body),
            HttpMethod::Post => with_body(self.agent.post(url), &headers, body),
            HttpMethod::Put => with_body(self.agent.put(url), &headers, body),
            HttpMethod::Patch => with_body(self.agent.patch(url), &headers, body),
        };
        Ok(result?)
    }
}

impl NativeClient for UreqClient {
    fn send(&self, request: NativeRequest) -> Result<NativeResponse, NativeError> {
        let response = read(self.execute(&request)?)?;
        tracing::trace!(status = response.status, url = %request.url, "ureq exchange complete");
        check_status(&request.options, response)
    }

    /// Runs the blocking call on Tokio's blocking pool; must be polled inside
    /// a Tokio runtime.
    fn send_async(&self, request: NativeRequest) -> NativePromise {
        let client = self.clone();
        async move {
            tokio::task::spawn_blocking(move || settle(client.send(request)))
                .await
                .map_err(|e| NativeError::transport(TransportKind::Other, e))
        }
        .boxed()
    }
}

fn prepare<B>(builder: RequestBuilder<B>, headers: &Headers) -> RequestBuilder<B> {
    // ureq would otherwise drop the body of an error response.
    let mut builder = builder.config().http_status_as_error(false).build();
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn without_body(
    builder: RequestBuilder<WithoutBody>,
    headers: &Headers,
    body: Option<&[u8]>,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    let builder = prepare(builder, headers);
    match body {
        Some(bytes) => builder.force_send_body().send(bytes),
        None => builder.call(),
    }
}

fn with_body(
    builder: RequestBuilder<WithBody>,
    headers: &Headers,
    body: Option<&[u8]>,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    let builder = prepare(builder, headers);
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

fn read(response: http::Response<ureq::Body>) -> Result<NativeResponse, NativeError> {
    let (parts, body) = response.into_parts();
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    // `read_to_vec` stops at ureq's default size limit; a complete response
    // of any size is still a response.
    let mut bytes = Vec::new();
    body.into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| NativeError::transport(TransportKind::Io, e))?;
    Ok(NativeResponse {
        status: parts.status.as_u16(),
        headers,
        body: Bytes::from(bytes),
    })
}

impl From<ureq::Error> for NativeError {
    fn from(err: ureq::Error) -> Self {
        let kind = match &err {
            ureq::Error::StatusCode(status) => {
                return NativeError::Status {
                    response: NativeResponse::new(*status),
                }
            }
            ureq::Error::Timeout(_) => TransportKind::Timeout,
            ureq::Error::HostNotFound => TransportKind::Connect,
            ureq::Error::Io(e) => io_kind(e),
            _ => TransportKind::Other,
        };
        NativeError::transport(kind, err)
    }
}

fn io_kind(err: &io::Error) -> TransportKind {
    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable => TransportKind::Connect,
        io::ErrorKind::TimedOut => TransportKind::Timeout,
        _ => TransportKind::Io,
    }
}

//! Request bodies and their translation into a native transmission format.
//!
//! # Design
//! A `Body` records how the caller *declared* its payload. The native client
//! does not care about declarations, only about a `BodyFormat` and a
//! `Payload`, so `translate` picks the format and hands the payload over
//! untouched. The only payload rewritten here is the opaque variant, which
//! the native side cannot interpret and is coerced to a string instead.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::http::Headers;

/// A request body as declared by the caller.
#[derive(Clone)]
pub enum Body {
    /// A JSON document.
    Json(Value),
    /// `multipart/form-data` parts.
    Multipart(Vec<MultipartPart>),
    /// `application/x-www-form-urlencoded` fields, in order.
    Form(Vec<(String, String)>),
    /// A raw string sent as-is (XML, plain text, pre-encoded payloads).
    Text(String),
    /// Anything else that knows how to render itself.
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
}

impl Body {
    /// Build a JSON body from any serializable value.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    pub fn form<K, V, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Body::Text(value.into())
    }

    pub fn opaque(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Body::Opaque(Arc::new(value))
    }

    /// The `Content-Type` a request should carry by default for this body.
    ///
    /// Multipart has none here because the header must carry the boundary,
    /// which only the encoder knows.
    pub fn default_content_type(&self) -> Option<&'static str> {
        match self {
            Body::Json(_) => Some("application/json"),
            Body::Form(_) => Some("application/x-www-form-urlencoded"),
            Body::Multipart(_) | Body::Text(_) | Body::Opaque(_) => None,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Body::Multipart(parts) => f.debug_tuple("Multipart").field(parts).finish(),
            Body::Form(fields) => f.debug_tuple("Form").field(fields).finish(),
            Body::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Body::Opaque(v) => f.debug_tuple("Opaque").field(&v.to_string()).finish(),
        }
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    pub name: String,
    pub contents: Bytes,
    pub filename: Option<String>,
    pub headers: Headers,
}

impl MultipartPart {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
            filename: None,
            headers: Vec::new(),
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// How the native client should put a payload on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Multipart,
    FormParams,
    Raw,
}

impl BodyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFormat::Json => "json",
            BodyFormat::Multipart => "multipart",
            BodyFormat::FormParams => "form_params",
            BodyFormat::Raw => "body",
        }
    }
}

/// A payload in the shape the native client accepts for each `BodyFormat`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(Vec<MultipartPart>),
    Form(Vec<(String, String)>),
    Raw(String),
}

/// Result of `translate`: the chosen format and its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Translated {
    pub format: BodyFormat,
    pub payload: Payload,
}

/// Select the transmission format for `body`.
///
/// Infallible: every variant maps to a format, and anything the native
/// client has no dedicated format for is rendered to a raw string.
pub fn translate(body: &Body) -> Translated {
    match body {
        Body::Json(value) => Translated {
            format: BodyFormat::Json,
            payload: Payload::Json(value.clone()),
        },
        Body::Multipart(parts) => Translated {
            format: BodyFormat::Multipart,
            payload: Payload::Multipart(parts.clone()),
        },
        Body::Form(fields) => Translated {
            format: BodyFormat::FormParams,
            payload: Payload::Form(fields.clone()),
        },
        Body::Text(text) => Translated {
            format: BodyFormat::Raw,
            payload: Payload::Raw(text.clone()),
        },
        Body::Opaque(value) => Translated {
            format: BodyFormat::Raw,
            payload: Payload::Raw(value.to_string()),
        },
    }
}

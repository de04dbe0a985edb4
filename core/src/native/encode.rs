//! Wire encoding of translated payloads.
//!
//! Every native client puts a `(BodyFormat, Payload)` pair on the wire the
//! same way, so the rules live here instead of in each client.

use bytes::{BufMut, Bytes, BytesMut};
use url::form_urlencoded;
use uuid::Uuid;

use crate::body::{MultipartPart, Payload};

/// Bytes ready for the wire and the content type they need, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

pub fn encode(payload: &Payload) -> Result<EncodedBody, serde_json::Error> {
    match payload {
        Payload::Json(value) => Ok(EncodedBody {
            content_type: Some("application/json".to_string()),
            bytes: Bytes::from(serde_json::to_vec(value)?),
        }),
        Payload::Form(fields) => {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            Ok(EncodedBody {
                content_type: Some("application/x-www-form-urlencoded".to_string()),
                bytes: Bytes::from(encoded),
            })
        }
        Payload::Multipart(parts) => {
            let boundary = Uuid::new_v4().simple().to_string();
            Ok(EncodedBody {
                content_type: Some(format!("multipart/form-data; boundary={boundary}")),
                bytes: multipart(parts, &boundary),
            })
        }
        Payload::Raw(text) => Ok(EncodedBody {
            content_type: None,
            bytes: Bytes::from(text.clone()),
        }),
    }
}

fn multipart(parts: &[MultipartPart], boundary: &str) -> Bytes {
    let mut out = BytesMut::new();
    for part in parts {
        out.put_slice(format!("--{boundary}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", escape(&part.name));
        if let Some(filename) = &part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", escape(filename)));
        }
        out.put_slice(disposition.as_bytes());
        out.put_slice(b"\r\n");
        for (name, value) in &part.headers {
            let line = format!("{}: {}\r\n", escape_line(name), escape_line(value));
            out.put_slice(line.as_bytes());
        }
        out.put_slice(b"\r\n");
        out.put_slice(&part.contents);
        out.put_slice(b"\r\n");
    }
    out.put_slice(format!("--{boundary}--\r\n").as_bytes());
    out.freeze()
}

// Quotes and line breaks would end the quoted-string early.
fn escape(value: &str) -> String {
    escape_line(&value.replace('"', "%22"))
}

// A line break inside a part header would start a new header.
fn escape_line(value: &str) -> String {
    value.replace('\r', "%0D").replace('\n', "%0A")
}

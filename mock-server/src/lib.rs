use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What `/echo` saw on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub catchphrase: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/user", get(user))
        .route("/bytes/{size}", get(bytes))
}

/// Largest body `/bytes/{size}` will produce.
pub const MAX_BYTES: usize = 64 * 1024 * 1024;

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    tracing::debug!(%method, len = body.len(), "echo");
    Json(Echo {
        method: method.to_string(),
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, Json(json!({ "status": code }))),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("invalid status code {code}") })),
        ),
    }
}

async fn bytes(Path(size): Path<usize>) -> Result<Vec<u8>, StatusCode> {
    if size > MAX_BYTES {
        return Err(StatusCode::PAYLOAD_TOO_LARGE);
    }
    Ok(vec![b'a'; size])
}

async fn user() -> Json<User> {
    Json(User {
        name: "Sam".to_string(),
        catchphrase: "Yeehaw!".to_string(),
    })
}

//! The caller-owned description of an outbound call.
//!
//! # Design
//! `PendingRequest` is built per call and handed to `Sender`. The sender only
//! ever touches its `Config` (merging `http_errors = false`); method, URL,
//! headers and body are read-only from its point of view. The request also
//! carries the caller's `FailurePolicy`, so responses produced from it judge
//! status codes the way the caller does rather than the way the native
//! client does.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::body::Body;
use crate::config::Config;
use crate::http::{find_header, Headers, HttpMethod};

/// An outbound HTTP call that has not been sent yet.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: HttpMethod,
    url: String,
    headers: Headers,
    body: Option<Body>,
    config: Config,
    failure_policy: FailurePolicy,
}

impl PendingRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            config: Config::new(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Join `base_url` and `endpoint` with exactly one slash between them.
    pub fn for_endpoint(method: HttpMethod, base_url: &str, endpoint: &str) -> Self {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Self::new(method, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a body. JSON and form bodies also get their default
    /// `Content-Type` unless one was already set.
    pub fn with_body(mut self, body: Body) -> Self {
        if let Some(content_type) = body.default_content_type() {
            if find_header(&self.headers, "content-type").is_none() {
                self.headers.push(("Content-Type".to_string(), content_type.to_string()));
            }
        }
        self.body = Some(body);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.set(key, value);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn failure_policy(&self) -> &FailurePolicy {
        &self.failure_policy
    }
}

/// The caller's rule for which status codes count as failures.
#[derive(Clone)]
pub struct FailurePolicy {
    predicate: Arc<dyn Fn(u16) -> bool + Send + Sync>,
}

impl FailurePolicy {
    pub fn new(predicate: impl Fn(u16) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// The default rule, except that `statuses` are never failures.
    pub fn accepting(statuses: impl IntoIterator<Item = u16>) -> Self {
        let accepted: Vec<u16> = statuses.into_iter().collect();
        Self::new(move |status| status >= 400 && !accepted.contains(&status))
    }

    pub fn has_failed(&self, status: u16) -> bool {
        (self.predicate)(status)
    }
}

impl Default for FailurePolicy {
    /// Any 4xx or 5xx status is a failure.
    fn default() -> Self {
        Self::new(|status| status >= 400)
    }
}

impl fmt::Debug for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailurePolicy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_sets_content_type() {
        let req = PendingRequest::new(HttpMethod::Post, "http://localhost/user")
            .with_body(Body::Json(json!({"name": "Sam"})));
        assert_eq!(find_header(req.headers(), "Content-Type"), Some("application/json"));
    }

    #[test]
    fn caller_content_type_wins() {
        let req = PendingRequest::new(HttpMethod::Post, "http://localhost/user")
            .header("content-type", "application/vnd.api+json")
            .with_body(Body::Json(json!({})));
        assert_eq!(req.headers().len(), 1);
        assert_eq!(
            find_header(req.headers(), "Content-Type"),
            Some("application/vnd.api+json")
        );
    }

    #[test]
    fn text_body_leaves_headers_alone() {
        let req = PendingRequest::new(HttpMethod::Get, "http://localhost/user")
            .with_body(Body::text("<p>Howdy</p>"));
        assert!(req.headers().is_empty());
    }

    #[test]
    fn endpoint_join_uses_single_slash() {
        let req = PendingRequest::for_endpoint(HttpMethod::Get, "http://localhost:3000/", "/user");
        assert_eq!(req.url(), "http://localhost:3000/user");
    }

    #[test]
    fn default_policy_fails_on_4xx_and_5xx() {
        let policy = FailurePolicy::default();
        assert!(!policy.has_failed(200));
        assert!(!policy.has_failed(302));
        assert!(policy.has_failed(404));
        assert!(policy.has_failed(500));
    }

    #[test]
    fn accepting_policy_allows_listed_statuses() {
        let policy = FailurePolicy::accepting([404]);
        assert!(!policy.has_failed(404));
        assert!(policy.has_failed(500));
    }
}

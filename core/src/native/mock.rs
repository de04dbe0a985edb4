//! In-memory native client for tests.
//!
//! Replies are consumed in order; once the queue is empty every call gets a
//! bare `200`. Every request is recorded exactly as the client received it,
//! so tests can assert on the native call shape.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future;
use futures::FutureExt;

use super::{check_status, settle, NativeClient, NativePromise, NativeRequest, NativeResponse, Settled};
use crate::error::NativeError;

/// What the mock does with the next call.
#[derive(Debug)]
pub enum MockReply {
    /// Respond, subject to the request's `http_errors` option.
    Respond(NativeResponse),
    /// Fail. The async promise still fulfills, with `Settled::Failed`.
    Fail(NativeError),
    /// Fail. The async promise rejects.
    Reject(NativeError),
}

#[derive(Debug, Clone, Default)]
pub struct MockClient {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    recorded: Arc<Mutex<Vec<NativeRequest>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: NativeResponse) -> Self {
        self.push(MockReply::Respond(response))
    }

    pub fn fail(self, error: NativeError) -> Self {
        self.push(MockReply::Fail(error))
    }

    pub fn reject(self, error: NativeError) -> Self {
        self.push(MockReply::Reject(error))
    }

    pub fn push(self, reply: MockReply) -> Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Requests received so far, oldest first.
    pub fn recorded(&self) -> Vec<NativeRequest> {
        lock(&self.recorded).clone()
    }

    pub fn last_request(&self) -> Option<NativeRequest> {
        lock(&self.recorded).last().cloned()
    }

    fn next(&self, request: &NativeRequest) -> MockReply {
        lock(&self.recorded).push(request.clone());
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| MockReply::Respond(NativeResponse::new(200)))
    }
}

impl NativeClient for MockClient {
    fn send(&self, request: NativeRequest) -> Result<NativeResponse, NativeError> {
        match self.next(&request) {
            MockReply::Respond(response) => check_status(&request.options, response),
            MockReply::Fail(err) | MockReply::Reject(err) => Err(err),
        }
    }

    fn send_async(&self, request: NativeRequest) -> NativePromise {
        let outcome = match self.next(&request) {
            MockReply::Respond(response) => Ok(settle(check_status(&request.options, response))),
            MockReply::Fail(err) => Ok(Settled::Failed(err)),
            MockReply::Reject(err) => Err(err),
        };
        future::ready(outcome).boxed()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

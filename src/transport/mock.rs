//! In-memory transport for tests.
//!
//! `MockTransport` serves scripted responses per `(method, href)` in the order
//! they were registered and records every request it receives.
//!
//! ```rust
//! use hal_transform::transport::{MockTransport, Transport};
//! use hal_transform::link::Method;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockTransport::new();
//! mock.expect(Method::Get, "/api/v3/hello")
//!     .return_ok(json!({"hello": "world"}));
//!
//! let body = mock.request(&Method::Get, "/api/v3/hello").await.unwrap();
//! assert_eq!(body["hello"], "world");
//! assert_eq!(mock.call_count(), 1);
//! # }
//! ```

use super::{Transport, TransportError};
use crate::link::Method;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Scripted transport.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<(Method, String)>>,
}

struct Scripted {
    delay: Option<Duration>,
    reply: Reply,
}

enum Reply {
    Body(JsonValue),
    Status(u16),
}

/// Builder for a single scripted response.
#[must_use = "an expectation does nothing until a return value is set"]
pub struct Expectation<'a> {
    mock: &'a MockTransport,
    method: Method,
    href: String,
    delay: Option<Duration>,
}

impl<'a> Expectation<'a> {
    /// Hold the response back for `delay` before settling.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Respond with `body`.
    pub fn return_ok(self, body: JsonValue) {
        self.push(Reply::Body(body));
    }

    /// Fail with an HTTP status.
    pub fn return_status(self, status: u16) {
        self.push(Reply::Status(status));
    }

    fn push(self, reply: Reply) {
        lock(&self.mock.responses)
            .entry((self.method, self.href))
            .or_default()
            .push_back(Scripted {
                delay: self.delay,
                reply,
            });
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for `method href`.
    pub fn expect(&self, method: Method, href: impl Into<String>) -> Expectation<'_> {
        Expectation {
            mock: self,
            method,
            href: href.into(),
            delay: None,
        }
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<(Method, String)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of scripted responses not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.responses).values().map(VecDeque::len).sum()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, method: &Method, href: &str) -> Result<JsonValue, TransportError> {
        lock(&self.calls).push((method.clone(), href.to_string()));

        let scripted = lock(&self.responses)
            .get_mut(&(method.clone(), href.to_string()))
            .and_then(VecDeque::pop_front);

        let Some(scripted) = scripted else {
            return Err(TransportError::Unexpected {
                method: method.to_string(),
                href: href.to_string(),
            });
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        match scripted.reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(TransportError::Status {
                method: method.to_string(),
                href: href.to_string(),
                status,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock_transport"
    }
}

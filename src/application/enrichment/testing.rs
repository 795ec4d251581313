//! In-memory transport and clock for exercising cache and fallback rules.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

use super::{Clock, HttpResponse, Transport, TransportError};

#[derive(Debug)]
pub(crate) struct FakeClock {
    now: Mutex<OffsetDateTime>,
}

impl FakeClock {
    pub(crate) fn at(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().expect("clock lock")
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Response(HttpResponse),
    Failure,
}

/// Routes are matched by exact path; unrouted paths answer 404.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, path: &str, status: u16, body: impl Into<String>) {
        let body: String = body.into();
        let response = HttpResponse::new(status, body);
        self.routes
            .lock()
            .expect("routes lock")
            .insert(path.to_string(), Reply::Response(response));
    }

    pub(crate) fn fail(&self, path: &str) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(path.to_string(), Reply::Failure);
    }

    pub(crate) fn calls(&self, path: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").values().sum()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry(path.to_string())
            .or_default() += 1;

        let reply = self.routes.lock().expect("routes lock").get(path).cloned();
        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure) => Err(TransportError::Request {
                path: path.to_string(),
                message: "connection reset".to_string(),
            }),
            None => Ok(HttpResponse::new(404, "{\"message\":\"Not Found\"}")),
        }
    }
}

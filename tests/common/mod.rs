#![allow(dead_code)]

use greener_reporter::domain::{ReporterError, SessionRequest, TestcaseRequest, TestcaseStatus};
use greener_reporter::sender::IngressTransport;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::time::Duration;

/// In-memory ingress that records every batch it is handed.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    batches: Mutex<Vec<Vec<TestcaseRequest>>>,
    sessions: Mutex<Vec<SessionRequest>>,
    should_fail: AtomicBool,
    failures: AtomicU16,
    delay: Option<Duration>,
    session_id: String,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            session_id: "session-1".to_string(),
            ..Default::default()
        }
    }

    /// Every request fails with `Ingress { status: 500 + n }` for the n-th failure.
    pub fn failing() -> Self {
        let transport = Self::new();
        transport.should_fail.store(true, Ordering::SeqCst);
        transport
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_session_id(mut self, id: &str) -> Self {
        self.session_id = id.to_string();
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn batches(&self) -> Vec<Vec<TestcaseRequest>> {
        self.batches.lock().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().iter().map(Vec::len).collect()
    }

    pub fn delivered_names(&self) -> Vec<String> {
        self.batches
            .lock()
            .iter()
            .flatten()
            .map(|testcase| testcase.testcase_name.clone())
            .collect()
    }

    pub fn sessions(&self) -> Vec<SessionRequest> {
        self.sessions.lock().clone()
    }

    fn next_failure(&self) -> Option<ReporterError> {
        if !self.should_fail.load(Ordering::SeqCst) {
            return None;
        }
        let n = self.failures.fetch_add(1, Ordering::SeqCst);
        Some(ReporterError::Ingress {
            status: 500 + n,
            message: format!("failure {n}"),
        })
    }
}

impl IngressTransport for RecordingTransport {
    async fn create_session(&self, session: SessionRequest) -> Result<String, ReporterError> {
        self.sessions.lock().push(session);
        match self.next_failure() {
            Some(err) => Err(err),
            None => Ok(self.session_id.clone()),
        }
    }

    async fn send_testcases(&self, testcases: Vec<TestcaseRequest>) -> Result<(), ReporterError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.batches.lock().push(testcases);
        match self.next_failure() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn testcase(name: &str) -> TestcaseRequest {
    TestcaseRequest::new("session-1", name, TestcaseStatus::Pass)
}

pub fn testcases(prefix: &str, count: usize) -> Vec<TestcaseRequest> {
    (0..count)
        .map(|i| testcase(&format!("{prefix}_{i}")))
        .collect()
}

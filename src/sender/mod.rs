pub mod client;
pub mod wire;

pub use client::{ClientConfig, ClientStats, ConnectionStats, IngressClient};
pub use wire::{ErrorResponse, SessionResponse, TestcasesRequest};

use crate::domain::{ReporterError, SessionRequest, TestcaseRequest};
use std::future::Future;

/// Request/response contract the reporter needs from the ingress.
///
/// Implementations must be shareable across the caller's thread and the
/// batcher worker, and the returned futures must be `Send` so they can run
/// on the worker task.
pub trait IngressTransport: Send + Sync + 'static {
    /// Creates a session and returns the identifier assigned by the ingress.
    fn create_session(
        &self,
        session: SessionRequest,
    ) -> impl Future<Output = Result<String, ReporterError>> + Send;

    /// Sends one batch of test cases. Order of `testcases` is transmission order.
    fn send_testcases(
        &self,
        testcases: Vec<TestcaseRequest>,
    ) -> impl Future<Output = Result<(), ReporterError>> + Send;
}

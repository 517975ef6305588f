use super::config::ReporterConfig;
use crate::buffer::{Batcher, BatcherConfig};
use crate::domain::{ReporterError, Session, SessionRequest, TestcaseRequest};
use crate::sender::{ConnectionStats, IngressClient, IngressTransport};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::info;

/// Synchronous entry point for test-runner integrations.
///
/// Owns a private tokio runtime that hosts the batcher worker, so every
/// method can be called from plain (non-async) code on any thread.
/// Calling any method from inside another tokio runtime panics.
///
/// Call [`Reporter::shutdown`] before dropping the reporter; dropping it
/// without shutdown discards any test cases that were not flushed yet.
pub struct Reporter<T: IngressTransport = IngressClient> {
    ingress: Arc<T>,
    batcher: Batcher,
    runtime: Runtime,
}

impl Reporter<IngressClient> {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ReporterError> {
        Self::from_config(&ReporterConfig::new(endpoint, api_key))
    }

    pub fn from_config(config: &ReporterConfig) -> Result<Self, ReporterError> {
        config.validate()?;
        let ingress = IngressClient::new(config.client_config())?;
        Self::with_transport(ingress, config.batcher_config())
    }

    pub fn connection_stats(&self) -> ConnectionStats {
        self.ingress.connection_stats()
    }
}

impl<T: IngressTransport> Reporter<T> {
    pub fn with_transport(transport: T, config: BatcherConfig) -> Result<Self, ReporterError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("greener-reporter")
            .enable_all()
            .build()
            .map_err(|e| ReporterError::Unknown(format!("error creating runtime: {e}")))?;

        let ingress = Arc::new(transport);
        let batcher = Batcher::new(runtime.handle(), ingress.clone(), config)?;

        info!("Reporter started");
        Ok(Self {
            ingress,
            batcher,
            runtime,
        })
    }

    /// Creates a session synchronously. Transport errors are returned unchanged.
    pub fn create_session(&self, session: SessionRequest) -> Result<Session, ReporterError> {
        let id = self.runtime.block_on(self.ingress.create_session(session))?;
        Ok(Session { id })
    }

    /// Creates a session described by the `GREENER_SESSION_*` environment.
    pub fn create_session_from_env(&self) -> Result<Session, ReporterError> {
        self.create_session(SessionRequest::from_env()?)
    }

    /// Queues a test case for delivery. Only fails when the intake queue is full.
    pub fn add_testcase(&self, testcase: TestcaseRequest) -> Result<(), ReporterError> {
        self.batcher.add(testcase)
    }

    /// Oldest delivery error not yet observed, if any.
    pub fn pop_error(&self) -> Option<ReporterError> {
        self.batcher.pop_error()
    }

    /// Flushes everything added so far and stops the batcher.
    ///
    /// Delivery errors from the final flush are available via
    /// [`Reporter::pop_error`] afterwards.
    pub fn shutdown(&self) -> Result<(), ReporterError> {
        self.runtime.block_on(self.batcher.shutdown())
    }

    pub fn transport(&self) -> &T {
        &self.ingress
    }
}

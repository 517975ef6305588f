use super::batch::{FlushTrigger, PendingBatch};
use crate::domain::{ReporterError, TestcaseRequest};
use crate::sender::IngressTransport;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct BatcherConfig {
    /// Records per flush; reaching it flushes immediately.
    pub max_batch_size: usize,
    /// Longest a partial batch waits before a time-based flush.
    pub batch_timeout: Duration,
    /// In-flight records the intake queue holds before `add` reports backpressure.
    pub queue_capacity: usize,
    /// Upper bound on how long `shutdown` waits for the worker. `None` waits forever.
    pub shutdown_timeout: Option<Duration>,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            batch_timeout: Duration::from_secs(5),
            queue_capacity: 100,
            shutdown_timeout: Some(Duration::from_secs(60)),
        }
    }
}

type ErrorQueue = Arc<Mutex<VecDeque<ReporterError>>>;

enum BatcherMessage {
    Testcase(TestcaseRequest),
    Shutdown,
}

/// Asynchronous batching engine between test-case producers and the ingress.
///
/// `add` never performs network I/O: it enqueues into a bounded channel
/// drained by a single worker task, which owns the pending batch and
/// flushes it when it fills up, when the batch timeout elapses, or on
/// shutdown. Delivery failures are queued and retrieved with `pop_error`.
pub struct Batcher {
    sender: mpsc::Sender<BatcherMessage>,
    is_accepting: AtomicBool,
    errors: ErrorQueue,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown_timeout: Option<Duration>,
}

impl Batcher {
    /// Starts the worker on `runtime`.
    pub fn new<T: IngressTransport>(
        runtime: &Handle,
        transport: Arc<T>,
        config: BatcherConfig,
    ) -> Result<Self, ReporterError> {
        if config.queue_capacity == 0 {
            return Err(ReporterError::InvalidArgument(
                "queue capacity must be greater than 0".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let errors: ErrorQueue = Arc::new(Mutex::new(VecDeque::new()));

        let worker = BatchWorker {
            transport,
            receiver,
            batch: PendingBatch::new(config.max_batch_size),
            batch_timeout: config.batch_timeout,
            errors: errors.clone(),
        };
        let worker_handle = runtime.spawn(worker.run());

        debug!(
            "Batcher started (max_batch_size={}, batch_timeout={:?}, queue_capacity={})",
            config.max_batch_size, config.batch_timeout, config.queue_capacity
        );

        Ok(Self {
            sender,
            is_accepting: AtomicBool::new(true),
            errors,
            worker: Mutex::new(Some(worker_handle)),
            shutdown_timeout: config.shutdown_timeout,
        })
    }

    /// Hands a test case to the worker without blocking.
    ///
    /// After shutdown has begun the record is dropped and `Ok(())` is
    /// returned. A full intake queue is reported as an invalid-argument error.
    pub fn add(&self, testcase: TestcaseRequest) -> Result<(), ReporterError> {
        if !self.is_accepting.load(Ordering::SeqCst) {
            debug!(
                "Batcher is shut down, dropping testcase {}",
                testcase.testcase_name
            );
            return Ok(());
        }

        match self.sender.try_send(BatcherMessage::Testcase(testcase)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("Batcher queue is full, rejecting testcase");
                Err(ReporterError::queue_full())
            }
            Err(TrySendError::Closed(_)) if !self.is_accepting() => {
                debug!("Batcher shut down while adding, dropping testcase");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(ReporterError::Unknown(
                "batcher worker is not running".to_string(),
            )),
        }
    }

    /// Stops accepting records, flushes the partial batch and waits for the worker.
    ///
    /// The shutdown timeout covers both handing the shutdown signal to a
    /// full intake queue and the final drain. Errors from the final flush
    /// land in the error queue like any other flush failure. Calling this
    /// again after it completed is a no-op.
    pub async fn shutdown(&self) -> Result<(), ReporterError> {
        self.is_accepting.store(false, Ordering::SeqCst);
        let deadline = self
            .shutdown_timeout
            .map(|limit| (limit, Instant::now() + limit));

        let worker_handle = self.worker.lock().take();
        let Some(mut worker_handle) = worker_handle else {
            return Ok(());
        };

        let drain = async {
            if self.sender.send(BatcherMessage::Shutdown).await.is_err() {
                warn!("Batcher worker already stopped before shutdown signal");
            }
            (&mut worker_handle).await
        };

        let joined = match deadline {
            Some((limit, deadline)) => {
                let outcome = time::timeout_at(deadline, drain).await;
                match outcome {
                    Ok(joined) => joined,
                    Err(_) => {
                        worker_handle.abort();
                        error!("Batcher worker did not drain within {:?}", limit);
                        return Err(ReporterError::Unknown(format!(
                            "timed out after {limit:?} waiting for batcher worker to drain"
                        )));
                    }
                }
            }
            None => drain.await,
        };

        joined.map_err(|e| {
            ReporterError::Unknown(format!("error joining batcher worker: {e}"))
        })?;

        info!("Batcher shut down");
        Ok(())
    }

    /// Removes and returns the oldest delivery error, if any.
    pub fn pop_error(&self) -> Option<ReporterError> {
        self.errors.lock().pop_front()
    }

    pub fn pending_errors(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn is_accepting(&self) -> bool {
        self.is_accepting.load(Ordering::SeqCst)
    }
}

struct BatchWorker<T> {
    transport: Arc<T>,
    receiver: mpsc::Receiver<BatcherMessage>,
    batch: PendingBatch,
    batch_timeout: Duration,
    errors: ErrorQueue,
}

impl<T: IngressTransport> BatchWorker<T> {
    async fn run(mut self) {
        let mut ticker = time::interval_at(Instant::now() + self.batch_timeout, self.batch_timeout);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                message = self.receiver.recv() => match message {
                    Some(BatcherMessage::Testcase(testcase)) => {
                        self.batch.push(testcase);
                        if self.batch.is_full() {
                            self.flush(FlushTrigger::SizeBased).await;
                            ticker.reset();
                        }
                    }
                    Some(BatcherMessage::Shutdown) => {
                        self.flush(FlushTrigger::Shutdown).await;
                        break;
                    }
                    None => {
                        // Batcher dropped without shutdown
                        self.flush(FlushTrigger::Shutdown).await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.flush(FlushTrigger::TimeBased).await;
                }
            }
        }

        debug!("Batcher worker stopped");
    }

    async fn flush(&mut self, trigger: FlushTrigger) {
        let Some(batch) = self.batch.take(trigger) else {
            return;
        };

        let batch_id = batch.id().to_string();
        let size = batch.size();
        debug!(
            "Flushing batch {} ({} testcases, trigger={}, age={:?})",
            batch_id,
            size,
            trigger,
            batch.age()
        );

        match self.transport.send_testcases(batch.into_entries()).await {
            Ok(()) => {
                debug!("Batch {} delivered", batch_id);
            }
            Err(e) => {
                warn!("Batch {} ({} testcases) failed: {}", batch_id, size, e);
                self.errors.lock().push_back(e);
            }
        }
    }
}

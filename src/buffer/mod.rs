pub mod batch;
pub mod batcher;

pub use batch::{Batch, FlushTrigger, PendingBatch};
pub use batcher::{Batcher, BatcherConfig};

#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Durations and counters stay well within u64
    clippy::missing_errors_doc,       // Error taxonomy is documented on ReporterError
    clippy::module_name_repetitions,  // e.g. ReporterConfig in the app module
    clippy::must_use_candidate
)]

pub mod app;
pub mod buffer;
pub mod domain;
pub mod sender;

// Re-export main types for easy access
pub use app::{Reporter, ReporterConfig};
pub use buffer::{Batcher, BatcherConfig};
pub use domain::{ReporterError, Session, SessionRequest, TestcaseRequest, TestcaseStatus};
pub use sender::{IngressClient, IngressTransport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

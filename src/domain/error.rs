use thiserror::Error;

/// Numeric code of [`ReporterError::Unknown`] for foreign callers.
pub const ERROR_CODE_UNKNOWN: i32 = 1;
/// Numeric code of [`ReporterError::InvalidArgument`] for foreign callers.
pub const ERROR_CODE_INVALID_ARGUMENT: i32 = 2;
/// Numeric code of [`ReporterError::Ingress`] for foreign callers.
pub const ERROR_CODE_INGRESS: i32 = 3;

/// Top-level error type for the reporter.
///
/// Invalid-argument errors are always returned to the caller of the
/// operation that raised them. Ingress and unknown errors raised while
/// flushing a batch end up in the batcher's pending error queue instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReporterError {
    #[error("InvalidArgument error: {0}")]
    InvalidArgument(String),

    #[error("Ingress error: code={status}, {message}")]
    Ingress { status: u16, message: String },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ReporterError {
    pub fn queue_full() -> Self {
        ReporterError::InvalidArgument("batcher queue is full".to_string())
    }

    pub fn code(&self) -> i32 {
        match self {
            ReporterError::Unknown(_) => ERROR_CODE_UNKNOWN,
            ReporterError::InvalidArgument(_) => ERROR_CODE_INVALID_ARGUMENT,
            ReporterError::Ingress { .. } => ERROR_CODE_INGRESS,
        }
    }

    /// HTTP status reported by the ingress, 0 for every other kind.
    pub fn ingress_code(&self) -> u16 {
        match self {
            ReporterError::Ingress { status, .. } => *status,
            _ => 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ReporterError::InvalidArgument(message)
            | ReporterError::Unknown(message)
            | ReporterError::Ingress { message, .. } => message,
        }
    }
}

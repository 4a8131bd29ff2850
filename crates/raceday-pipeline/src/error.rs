use std::fmt;

use raceday_db::WriteError;
use raceday_transform::TransformError;
use raceday_upstream::UpstreamError;

/// The three stages named in §4.6, each contributing its own typed error.
/// `stage()` is attached to every propagated error so logs and metrics can
/// attribute a failure to fetch/transform/write without string matching.
#[derive(Debug)]
pub enum PipelineError {
    Fetch(UpstreamError),
    Transform(TransformError),
    Write(WriteError),
    /// The transform worker task panicked or was cancelled.
    TransformTaskFailed(String),
    /// The race pipeline or batch runner hit its wall-clock cap (§5). The
    /// in-flight transaction, if any, is rolled back by `Transaction`'s
    /// drop glue before this variant is returned.
    Cancelled(String),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Transform(_) | PipelineError::TransformTaskFailed(_) => "transform",
            PipelineError::Write(_) => "write",
            PipelineError::Cancelled(_) => "cancelled",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Fetch(e) => e.kind(),
            PipelineError::Transform(e) => e.kind(),
            PipelineError::Write(e) => e.kind(),
            PipelineError::TransformTaskFailed(_) => "transform_validation",
            PipelineError::Cancelled(_) => "cancelled",
        }
    }

    pub fn retryable(&self) -> bool {
        match self {
            PipelineError::Fetch(e) => e.retryable(),
            PipelineError::Transform(_) | PipelineError::TransformTaskFailed(_) => false,
            PipelineError::Write(_) => false,
            PipelineError::Cancelled(_) => false,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Fetch(e) => write!(f, "fetch stage: {e}"),
            PipelineError::Transform(e) => write!(f, "transform stage: {e}"),
            PipelineError::Write(e) => write!(f, "write stage: {e}"),
            PipelineError::TransformTaskFailed(detail) => {
                write!(f, "transform stage: worker task failed: {detail}")
            }
            PipelineError::Cancelled(detail) => write!(f, "cancelled: {detail}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<UpstreamError> for PipelineError {
    fn from(e: UpstreamError) -> Self {
        PipelineError::Fetch(e)
    }
}

impl From<TransformError> for PipelineError {
    fn from(e: TransformError) -> Self {
        PipelineError::Transform(e)
    }
}

impl From<WriteError> for PipelineError {
    fn from(e: WriteError) -> Self {
        PipelineError::Write(e)
    }
}

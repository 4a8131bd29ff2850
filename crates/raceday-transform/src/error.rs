use std::fmt;

/// Typed transform error per §7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A required field was missing or had the wrong shape. Terminal for
    /// the race (the whole pipeline invocation fails).
    Validation { field_path: String, reason: String },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Validation { field_path, reason } => {
                write!(f, "transform validation failed at '{field_path}': {reason}")
            }
        }
    }
}

impl std::error::Error for TransformError {}

impl TransformError {
    pub fn kind(&self) -> &'static str {
        "transform_validation"
    }
}

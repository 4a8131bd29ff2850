use std::fmt;

/// Typed upstream error, surfaced with `{kind, retryable, status_code?}` per
/// §4.1 / §7.
#[derive(Debug, Clone)]
pub enum UpstreamError {
    /// Network or transport failure (DNS, connect, timeout).
    Network { message: String, retryable: bool },
    /// Non-2xx HTTP status. `408/429/500/502/503/504` are retryable.
    HttpStatus { status: u16, retryable: bool },
    /// Response payload failed field-presence/type validation.
    Validation {
        field_path: String,
        code: String,
        reason: String,
    },
    /// The circuit breaker is `open` and is rejecting calls.
    CircuitOpen,
}

impl UpstreamError {
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Network { .. } => "fetch_network",
            UpstreamError::HttpStatus { .. } => "fetch_http_status",
            UpstreamError::Validation { .. } => "fetch_validation",
            UpstreamError::CircuitOpen => "fetch_circuit_open",
        }
    }

    pub fn retryable(&self) -> bool {
        match self {
            UpstreamError::Network { retryable, .. } => *retryable,
            UpstreamError::HttpStatus { retryable, .. } => *retryable,
            UpstreamError::Validation { .. } => false,
            UpstreamError::CircuitOpen => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `408/429/500/502/503/504` are retryable; everything else terminal.
    pub fn http_status(status: u16) -> Self {
        let retryable = matches!(status, 408 | 429 | 500 | 502 | 503 | 504);
        UpstreamError::HttpStatus { status, retryable }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Network { message, .. } => write!(f, "upstream network error: {message}"),
            UpstreamError::HttpStatus { status, .. } => {
                write!(f, "upstream returned HTTP {status}")
            }
            UpstreamError::Validation {
                field_path,
                code,
                reason,
            } => write!(f, "validation failed at '{field_path}' [{code}]: {reason}"),
            UpstreamError::CircuitOpen => write!(f, "circuit breaker is open"),
        }
    }
}

impl std::error::Error for UpstreamError {}

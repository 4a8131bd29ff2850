use std::fmt;

/// §7 error taxonomy entries owned by this crate: both terminate the
/// current run gracefully rather than retrying.
#[derive(Debug)]
pub enum LockError {
    /// Another owner holds a live lock; this attempt yielded without work.
    Unavailable { lock_name: String },
    /// Outside the 09:00–23:59 NZ racing-hours window.
    BoundaryBlocked,
    Db(sqlx::Error),
}

impl LockError {
    pub fn kind(&self) -> &'static str {
        match self {
            LockError::Unavailable { .. } => "lock_unavailable",
            LockError::BoundaryBlocked => "lock_boundary_blocked",
            LockError::Db(_) => "lock_db_error",
        }
    }
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Unavailable { lock_name } => {
                write!(f, "lock '{lock_name}' is held by another owner")
            }
            LockError::BoundaryBlocked => write!(f, "outside the racing-hours acquisition window"),
            LockError::Db(e) => write!(f, "lock db error: {e}"),
        }
    }
}

impl std::error::Error for LockError {}

impl From<sqlx::Error> for LockError {
    fn from(e: sqlx::Error) -> Self {
        LockError::Db(e)
    }
}

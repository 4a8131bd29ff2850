use std::fmt;

/// Typed write-stage error per §7. All three variants cause the enclosing
/// transaction to roll back; none of them leave partial state behind.
#[derive(Debug)]
pub enum WriteError {
    PartitionNotFound { table: String, partition: String },
    ForeignKey { detail: String },
    Serialization { detail: String },
    Connection { detail: String },
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::PartitionNotFound { table, partition } => {
                write!(f, "partition {partition} missing on {table}")
            }
            WriteError::ForeignKey { detail } => write!(f, "foreign key violation: {detail}"),
            WriteError::Serialization { detail } => write!(f, "serialization failure: {detail}"),
            WriteError::Connection { detail } => write!(f, "connection error: {detail}"),
        }
    }
}

impl std::error::Error for WriteError {}

impl WriteError {
    pub fn kind(&self) -> &'static str {
        match self {
            WriteError::PartitionNotFound { .. } => "write_partition_not_found",
            WriteError::ForeignKey { .. } => "write_foreign_key",
            WriteError::Serialization { .. } => "write_serialization",
            WriteError::Connection { .. } => "write_connection",
        }
    }

    /// Classifies a raw sqlx error by Postgres SQLSTATE / message, per §7.
    /// `table`/`partition` are supplied by the caller since Postgres's error
    /// message format for a missing partition names the parent relation, not
    /// a structured code we can rely on across versions.
    pub fn from_sqlx(err: sqlx::Error, table: &str, partition: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let message = db_err.message();
            if message.contains("no partition of relation") || message.contains("no partition found") {
                return WriteError::PartitionNotFound {
                    table: table.to_string(),
                    partition: partition.to_string(),
                };
            }
            match db_err.code().as_deref() {
                Some("23503") => {
                    return WriteError::ForeignKey {
                        detail: message.to_string(),
                    }
                }
                Some("40001") => {
                    return WriteError::Serialization {
                        detail: message.to_string(),
                    }
                }
                _ => {}
            }
        }
        WriteError::Connection {
            detail: err.to_string(),
        }
    }
}

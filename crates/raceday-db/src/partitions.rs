use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::error::WriteError;

/// The two parent tables the partition manager owns (§4.3). The enum keeps
/// partition/table names out of caller-supplied strings — `ensure_partition`
/// interpolates them into DDL, so only these two fixed identifiers are ever
/// reachable, never user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionedTable {
    MoneyFlowHistory,
    OddsHistory,
}

impl PartitionedTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            PartitionedTable::MoneyFlowHistory => "money_flow_history",
            PartitionedTable::OddsHistory => "odds_history",
        }
    }
}

/// `"<table>_YYYY_MM_DD"`, the date taken in UTC, per §4.3.
pub fn get_partition_name(table: PartitionedTable, event_timestamp: DateTime<Utc>) -> String {
    format!(
        "{}_{}",
        table.table_name(),
        event_timestamp.format("%Y_%m_%d")
    )
}

/// Idempotently creates the daily partition covering `event_timestamp`'s UTC
/// calendar day. Concurrent callers race benignly: Postgres's
/// `CREATE TABLE IF NOT EXISTS` absorbs the "already exists" case.
pub async fn ensure_partition(
    pool: &PgPool,
    table: PartitionedTable,
    event_timestamp: DateTime<Utc>,
) -> Result<(), WriteError> {
    let (sql, partition_name) = create_partition_sql(table, event_timestamp);
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| WriteError::from_sqlx(e, table.table_name(), &partition_name))?;

    info!(table = table.table_name(), partition = %partition_name, "partition ensured");
    Ok(())
}

/// Same as [`ensure_partition`] but runs inside an already-open transaction,
/// so a pipeline that creates tomorrow's partition mid-write rolls the DDL
/// back along with everything else on failure (§4.6 "one transaction").
pub async fn ensure_partition_tx(
    tx: &mut Transaction<'_, Postgres>,
    table: PartitionedTable,
    event_timestamp: DateTime<Utc>,
) -> Result<(), WriteError> {
    let (sql, partition_name) = create_partition_sql(table, event_timestamp);
    sqlx::query(&sql)
        .execute(&mut **tx)
        .await
        .map_err(|e| WriteError::from_sqlx(e, table.table_name(), &partition_name))?;

    info!(table = table.table_name(), partition = %partition_name, "partition ensured");
    Ok(())
}

fn create_partition_sql(table: PartitionedTable, event_timestamp: DateTime<Utc>) -> (String, String) {
    let day = event_timestamp.date_naive();
    let next_day = day + Duration::days(1);
    let partition_name = get_partition_name(table, event_timestamp);

    let sql = format!(
        "create table if not exists {partition} partition of {parent} for values from ('{from}') to ('{to}')",
        partition = partition_name,
        parent = table.table_name(),
        from = day.format("%Y-%m-%d"),
        to = next_day.format("%Y-%m-%d"),
    );
    (sql, partition_name)
}

//! C3 (time-series partition manager) + C4 (bulk upsert layer), plus the
//! connection/migration plumbing every other crate builds on.

mod connection;
mod error;
mod history;
pub mod partitions;
pub mod upsert;

pub use connection::{connect, connect_from_env, migrate, status, testkit_db_pool, DbStatus, ENV_DB_URL};
pub use error::WriteError;
pub use history::{insert_money_flow_records, insert_odds_records};
pub use partitions::{ensure_partition, ensure_partition_tx, get_partition_name, PartitionedTable};
pub use upsert::{
    bulk_upsert_entrants, bulk_upsert_meetings, bulk_upsert_race_pools, bulk_upsert_races,
    UpsertCounts,
};

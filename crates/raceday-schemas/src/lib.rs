//! Domain entities for the raceday ingestion pipeline.
//!
//! Pure data types only: no IO, no SQL, no HTTP. Each type mirrors the
//! relational shape described for the entity in the data model, plus the
//! derived time-series records that back the client API.

mod entrant;
mod meeting;
mod money_flow;
mod odds;
mod race;
mod race_pool;
mod alert_config;

pub use entrant::Entrant;
pub use meeting::{Meeting, RaceCategory};
pub use money_flow::{IntervalType, MoneyFlowRecord};
pub use odds::{OddsRecord, OddsType};
pub use race::{Race, RaceStatus};
pub use race_pool::RacePool;
pub use alert_config::{AlertConfigRow, AlertConfigUpdate};

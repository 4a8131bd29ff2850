//! C10 single-instance lock: a database-row CAS keyed by function name,
//! gated by the racing-hours acquisition window.

mod error;
mod lock;
mod racing_hours;

pub use error::LockError;
pub use lock::{try_acquire, try_acquire_unconditional, LockHandle, LEASE_SECONDS, STALE_HEARTBEAT_SECONDS};
pub use racing_hours::{is_past_daily_init_time, is_within_racing_hours};

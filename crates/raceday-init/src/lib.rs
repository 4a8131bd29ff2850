//! C9 daily initializer / evening backfill.

mod error;
mod evening;
mod meetings;
mod morning;

pub use error::InitError;
pub use evening::run_evening_backfill;
pub use meetings::extract_race_ids;
pub use morning::{DailyInitializer, MorningInitSummary};

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Pacific::Auckland;

/// §4.10 "racing hours" window: 09:00–23:59 NZ local time, inclusive.
///
/// NZ is always ahead of UTC (+12:00 or +13:00 DST), so the local day
/// rolls over well before UTC midnight — a naive UTC-hour check would
/// misclassify the first ~9-13 hours of the UTC day. Converting through
/// `chrono_tz::Pacific::Auckland` keeps the DST transition (and the
/// explicit UTC-midnight boundary it creates) correct without a hardcoded
/// offset table.
pub fn is_within_racing_hours(now_utc: DateTime<Utc>) -> bool {
    let local = now_utc.with_timezone(&Auckland);
    let minutes_since_midnight = local.num_seconds_from_midnight() / 60;
    let window_start = 9 * 60;
    // 23:59 inclusive, i.e. up to (but not including) 00:00 the next day.
    let window_end = 24 * 60;
    minutes_since_midnight >= window_start && minutes_since_midnight < window_end
}

/// §4.9's morning-init boundary: 06:00 NZ local, three hours ahead of the
/// racing-hours acquisition window `is_within_racing_hours` gates. Callers
/// that schedule the daily initializer must check this independently —
/// the initializer's own lock must not be gated by racing hours, since it
/// has to be acquirable before racing hours open.
pub fn is_past_daily_init_time(now_utc: DateTime<Utc>) -> bool {
    let local = now_utc.with_timezone(&Auckland);
    local.num_seconds_from_midnight() / 60 >= 6 * 60
}

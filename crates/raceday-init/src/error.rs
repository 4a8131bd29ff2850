use std::fmt;

use raceday_upstream::UpstreamError;

#[derive(Debug)]
pub enum InitError {
    /// §4.9 "always runs at most once concurrently" — a second caller
    /// while a run is already in flight.
    AlreadyRunning,
    /// The 15-minute ceiling elapsed before the run finished.
    Timeout,
    Fetch(UpstreamError),
    /// The meetings payload didn't match the expected
    /// `{"meetings": [{"races": [{"id": ...}]}]}` shape.
    MeetingsShapeInvalid(String),
    Db(sqlx::Error),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::AlreadyRunning => write!(f, "daily initializer is already running"),
            InitError::Timeout => write!(f, "daily initializer exceeded its 15 minute ceiling"),
            InitError::Fetch(e) => write!(f, "fetching today's meetings failed: {e}"),
            InitError::MeetingsShapeInvalid(reason) => {
                write!(f, "meetings payload did not match the expected shape: {reason}")
            }
            InitError::Db(e) => write!(f, "daily initializer db error: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

impl From<sqlx::Error> for InitError {
    fn from(e: sqlx::Error) -> Self {
        InitError::Db(e)
    }
}

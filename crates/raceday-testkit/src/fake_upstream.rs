use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use raceday_schemas::RaceStatus;
use raceday_upstream::{validate_race_payload, RacePayload, UpstreamClient, UpstreamError};
use serde_json::Value;

/// Canned response for one `fetch_race` call.
enum RaceResponse {
    Ok(Value),
    Err(UpstreamError),
}

/// In-memory [`UpstreamClient`] double. Responses are queued per race id and
/// consumed in order, so a test can script a sequence of polls (e.g. "fail
/// once, then succeed") the way `mqk-testkit::FakeBroker` scripts broker
/// replies.
#[derive(Default)]
pub struct FakeUpstreamClient {
    race_responses: Mutex<HashMap<String, Vec<RaceResponse>>>,
    meetings_response: Mutex<Option<Value>>,
    fetch_count: Mutex<usize>,
}

impl FakeUpstreamClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful payload for the next `fetch_race(race_id, ..)` call.
    pub fn push_race_ok(&self, race_id: &str, raw: Value) {
        self.race_responses
            .lock()
            .unwrap()
            .entry(race_id.to_string())
            .or_default()
            .push(RaceResponse::Ok(raw));
    }

    /// Queues a failing response for the next `fetch_race(race_id, ..)` call.
    pub fn push_race_err(&self, race_id: &str, err: UpstreamError) {
        self.race_responses
            .lock()
            .unwrap()
            .entry(race_id.to_string())
            .or_default()
            .push(RaceResponse::Err(err));
    }

    pub fn set_meetings_response(&self, raw: Value) {
        *self.meetings_response.lock().unwrap() = Some(raw);
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstreamClient {
    async fn fetch_meetings(&self, _date: &str) -> Result<Value, UpstreamError> {
        self.meetings_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| UpstreamError::Validation {
                field_path: "/".to_string(),
                code: "no_fixture".to_string(),
                reason: "FakeUpstreamClient has no meetings response queued".to_string(),
            })
    }

    async fn fetch_race(
        &self,
        race_id: &str,
        _expected_status: Option<RaceStatus>,
    ) -> Result<RacePayload, UpstreamError> {
        *self.fetch_count.lock().unwrap() += 1;

        let response = {
            let mut responses = self.race_responses.lock().unwrap();
            let queue = responses.get_mut(race_id).ok_or_else(|| UpstreamError::Validation {
                field_path: "/".to_string(),
                code: "no_fixture".to_string(),
                reason: format!("FakeUpstreamClient has no response queued for race '{race_id}'"),
            })?;
            if queue.is_empty() {
                return Err(UpstreamError::Validation {
                    field_path: "/".to_string(),
                    code: "exhausted_fixture".to_string(),
                    reason: format!("FakeUpstreamClient response queue for race '{race_id}' is exhausted"),
                });
            }
            queue.remove(0)
        };

        match response {
            RaceResponse::Ok(raw) => validate_race_payload(raw),
            RaceResponse::Err(err) => Err(err),
        }
    }
}

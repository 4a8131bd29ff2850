use serde_json::Value;

use crate::error::UpstreamError;

/// A validated entrant payload. Only the fields the transformer must have
/// are pulled out; everything else stays in `raw` so passthrough fields
/// survive untouched (§9 "dynamic field access and passthrough typing").
#[derive(Debug, Clone)]
pub struct EntrantPayload {
    pub id: String,
    pub runner_number: i64,
    pub raw: Value,
}

/// A validated race payload: a closed set of critical fields checked for
/// presence and type, plus the original JSON for anything else (pool
/// totals, jockey/trainer detail, money-tracker snapshots, ...) that the
/// transformer reads directly.
#[derive(Debug, Clone)]
pub struct RacePayload {
    pub race_id: String,
    pub name: String,
    pub status: String,
    /// `YYYY-MM-DD`, NZ calendar date.
    pub nz_date: String,
    /// `HH:MM` or `HH:MM:SS`.
    pub nz_time: String,
    pub entrants: Vec<EntrantPayload>,
    /// The full, unmodified upstream JSON payload (the "opaque bag").
    pub raw: Value,
}

/// Validates a raw JSON race payload against the closed set of critical
/// fields named in §4.1. Unknown fields are tolerated and preserved in
/// `raw`/`EntrantPayload::raw`.
pub fn validate_race_payload(raw: Value) -> Result<RacePayload, UpstreamError> {
    let race_id = require_str(&raw, "/id")?;
    let name = require_str(&raw, "/name")?;
    let status = require_str(&raw, "/status")?;
    let nz_date = require_str(&raw, "/meeting/date")?;
    let nz_time = require_str(&raw, "/start_time")?;

    let entrants_val = raw.pointer("/entrants").ok_or_else(|| UpstreamError::Validation {
        field_path: "/entrants".to_string(),
        code: "missing_field".to_string(),
        reason: "entrants array is required".to_string(),
    })?;
    let entrants_arr = entrants_val
        .as_array()
        .ok_or_else(|| UpstreamError::Validation {
            field_path: "/entrants".to_string(),
            code: "wrong_type".to_string(),
            reason: "entrants must be an array".to_string(),
        })?;

    let mut entrants = Vec::with_capacity(entrants_arr.len());
    for (idx, e) in entrants_arr.iter().enumerate() {
        let id = require_str(e, "/id").map_err(|_| UpstreamError::Validation {
            field_path: format!("/entrants/{idx}/id"),
            code: "missing_field".to_string(),
            reason: "entrant id is required".to_string(),
        })?;
        let runner_number = e
            .pointer("/runner_number")
            .and_then(Value::as_i64)
            .ok_or_else(|| UpstreamError::Validation {
                field_path: format!("/entrants/{idx}/runner_number"),
                code: "wrong_type".to_string(),
                reason: "runner_number must be an integer".to_string(),
            })?;
        entrants.push(EntrantPayload {
            id,
            runner_number,
            raw: e.clone(),
        });
    }

    Ok(RacePayload {
        race_id,
        name,
        status,
        nz_date,
        nz_time,
        entrants,
        raw,
    })
}

fn require_str(v: &Value, pointer: &str) -> Result<String, UpstreamError> {
    v.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| UpstreamError::Validation {
            field_path: pointer.to_string(),
            code: "missing_or_wrong_type".to_string(),
            reason: format!("expected a string at '{pointer}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "id": "story-2-10d-race-1",
            "name": "Race 1",
            "status": "open",
            "start_time": "14:05",
            "meeting": { "date": "2024-05-01" },
            "entrants": [
                { "id": "entrant-1", "runner_number": 1, "jockey": "J Smith" },
                { "id": "entrant-2", "runner_number": 2 }
            ],
            "unknown_future_field": { "nested": true }
        })
    }

    #[test]
    fn valid_payload_parses_and_preserves_unknown_fields() {
        let payload = validate_race_payload(sample()).unwrap();
        assert_eq!(payload.race_id, "story-2-10d-race-1");
        assert_eq!(payload.entrants.len(), 2);
        assert_eq!(payload.entrants[0].runner_number, 1);
        assert!(payload.raw.get("unknown_future_field").is_some());
    }

    #[test]
    fn missing_entrants_fails_validation() {
        let mut v = sample();
        v.as_object_mut().unwrap().remove("entrants");
        let err = validate_race_payload(v).unwrap_err();
        assert_eq!(err.kind(), "fetch_validation");
    }

    #[test]
    fn entrants_not_an_array_fails_validation() {
        let mut v = sample();
        v["entrants"] = json!("not-an-array");
        let err = validate_race_payload(v).unwrap_err();
        assert_eq!(err.kind(), "fetch_validation");
    }

    #[test]
    fn entrant_missing_runner_number_fails_validation() {
        let mut v = sample();
        v["entrants"][0].as_object_mut().unwrap().remove("runner_number");
        let err = validate_race_payload(v).unwrap_err();
        assert_eq!(err.kind(), "fetch_validation");
    }
}

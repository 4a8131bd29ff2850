use serde_json::Value;

use crate::error::InitError;

/// Pulls every race id out of a `fetch_meetings` payload.
///
/// The meetings endpoint nests races under meetings (the inverse of the
/// per-race payload, which nests its meeting under the race): each element
/// of `/meetings` carries a `races` array of `{id, ...}` skeleton objects.
/// Only `id` is read here — the morning init's job is to discover the
/// day's race ids and hand each one to `process_race` for the real
/// transform/write, not to duplicate that work against the skeleton.
pub fn extract_race_ids(raw: &Value) -> Result<Vec<String>, InitError> {
    let meetings = raw
        .get("meetings")
        .and_then(Value::as_array)
        .ok_or_else(|| InitError::MeetingsShapeInvalid("missing /meetings array".to_string()))?;

    let mut race_ids = Vec::new();
    for meeting in meetings {
        let races = meeting
            .get("races")
            .and_then(Value::as_array)
            .ok_or_else(|| InitError::MeetingsShapeInvalid("meeting missing races array".to_string()))?;
        for race in races {
            let id = race
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| InitError::MeetingsShapeInvalid("race missing id".to_string()))?;
            race_ids.push(id.to_string());
        }
    }
    Ok(race_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_race_ids_across_multiple_meetings() {
        let raw = json!({
            "meetings": [
                { "id": "meeting-1", "races": [{ "id": "race-1" }, { "id": "race-2" }] },
                { "id": "meeting-2", "races": [{ "id": "race-3" }] }
            ]
        });
        assert_eq!(
            extract_race_ids(&raw).unwrap(),
            vec!["race-1".to_string(), "race-2".to_string(), "race-3".to_string()]
        );
    }

    #[test]
    fn missing_meetings_array_is_an_error() {
        let raw = json!({});
        assert!(extract_race_ids(&raw).is_err());
    }

    #[test]
    fn meeting_with_no_races_array_is_an_error() {
        let raw = json!({ "meetings": [{ "id": "meeting-1" }] });
        assert!(extract_race_ids(&raw).is_err());
    }
}

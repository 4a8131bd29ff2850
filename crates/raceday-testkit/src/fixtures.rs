use serde_json::{json, Value};

/// Builds a raw race payload JSON in the shape `validate_race_payload`
/// accepts, with two entrants and a money-tracker/pool-totals block so a
/// single fixture exercises the whole transform path.
pub fn sample_race_payload_json(race_id: &str) -> Value {
    json!({
        "id": race_id,
        "name": "Race 1",
        "status": "open",
        "start_time": "14:05",
        "race_number": 1,
        "meeting": {
            "id": "meeting-1",
            "date": "2024-05-01",
            "category": "R",
            "name": "Ellerslie",
            "country": "NZ",
            "track_condition": "good",
            "tote_status": "open"
        },
        "pool_totals": {
            "win": 1500.0,
            "place": 600.0,
            "quinella": 0.0,
            "trifecta": 0.0,
            "exacta": 0.0,
            "first4": 0.0,
            "currency": "NZD",
            "quality_score": 1.0,
            "extracted_pool_count": 2
        },
        "entrants": [
            {
                "id": "entrant-1",
                "runner_number": 1,
                "name": "Fast Runner",
                "barrier": 3,
                "scratched": false,
                "fixed_win_odds": 3.5,
                "fixed_place_odds": 1.4,
                "pool_win_odds": 3.2,
                "pool_place_odds": 1.3,
                "win_pool_percentage": 60.0,
                "jockey": "J Smith",
                "trainer": "T Jones",
                "money_tracker": [
                    { "time_interval": 5.0, "win_pool_amount": 100.0, "place_pool_amount": 40.0, "hold_percentage": 20.0, "bet_percentage": 18.0 }
                ]
            },
            {
                "id": "entrant-2",
                "runner_number": 2,
                "name": "Steady Pace",
                "barrier": 5,
                "scratched": false,
                "fixed_win_odds": 5.0,
                "fixed_place_odds": 2.1,
                "pool_win_odds": 4.6,
                "pool_place_odds": 1.9,
                "win_pool_percentage": 40.0,
                "money_tracker": [
                    { "time_interval": 5.0, "win_pool_amount": 50.0, "place_pool_amount": 20.0, "hold_percentage": 10.0, "bet_percentage": 9.0 }
                ]
            }
        ]
    })
}

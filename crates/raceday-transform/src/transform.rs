use chrono::{DateTime, NaiveDate, Utc};
use raceday_schemas::{Entrant, Meeting, OddsRecord, OddsType, Race, RaceCategory, RaceStatus};
use raceday_upstream::RacePayload;
use tracing::warn;

use crate::bundle::TransformBundle;
use crate::error::TransformError;
use crate::money_flow::{derive_money_flow, RawBucket};
use crate::numeric::{coerce_number, dollars_to_cents};
use crate::quality::{check_win_pool_percentage_sum, QualityWarning};

/// Transforms a validated race payload into the normalized bundle described
/// in §4.2. Pure and side-effect-free: no IO, no clock reads other than the
/// caller-supplied `polling_timestamp` (the moment the snapshot was
/// captured, used verbatim as the event timestamp for every derived row).
pub fn transform_race(
    payload: &RacePayload,
    polling_timestamp: DateTime<Utc>,
) -> Result<TransformBundle, TransformError> {
    let mut quality_warnings = Vec::new();

    let meeting_raw = payload.raw.pointer("/meeting").ok_or_else(|| TransformError::Validation {
        field_path: "/meeting".to_string(),
        reason: "race payload missing meeting object".to_string(),
    })?;

    let meeting_id = require_str(meeting_raw, "/id")?;
    let meeting_category_code = require_str(meeting_raw, "/category")?;

    let scheduled_start_date =
        NaiveDate::parse_from_str(&payload.nz_date, "%Y-%m-%d").map_err(|_| {
            TransformError::Validation {
                field_path: "/meeting/date".to_string(),
                reason: format!("unparseable NZ calendar date: {}", payload.nz_date),
            }
        })?;

    let meeting = match RaceCategory::from_upstream_code(&meeting_category_code) {
        Some(category) => Some(Meeting {
            id: meeting_id.clone(),
            name: meeting_raw
                .pointer("/name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            country: meeting_raw
                .pointer("/country")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            category,
            date: scheduled_start_date,
            track_condition: meeting_raw
                .pointer("/track_condition")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            tote_status: meeting_raw
                .pointer("/tote_status")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }),
        None => {
            warn!(meeting_id, code = %meeting_category_code, "unsupported race category, dropping meeting");
            quality_warnings.push(QualityWarning::UnsupportedCategory {
                meeting_id: meeting_id.clone(),
                code: meeting_category_code,
            });
            None
        }
    };

    let race = Race {
        id: payload.race_id.clone(),
        meeting_id: meeting_id.clone(),
        name: payload.name.clone(),
        race_number: coerce_number(payload.raw.pointer("/race_number"))
            .map(|n| n as i32)
            .unwrap_or(0),
        scheduled_start_date,
        scheduled_start_time: Race::parse_start_time(&payload.nz_time),
        actual_start_time: payload
            .raw
            .pointer("/actual_start_time")
            .and_then(|v| v.as_str())
            .map(Race::parse_start_time),
        status: RaceStatus::normalize(&payload.status),
    };

    let mut entrants = Vec::with_capacity(payload.entrants.len());
    let mut money_flow_records = Vec::new();
    let mut odds_records = Vec::new();
    let mut win_pool_percentages = Vec::with_capacity(payload.entrants.len());

    for e in &payload.entrants {
        let raw = &e.raw;

        let buckets: Vec<RawBucket> = raw
            .pointer("/money_tracker")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        let entrant_money_flow = derive_money_flow(&race.id, &e.id, &buckets, polling_timestamp);

        let (current_win_amount, current_place_amount) = entrant_money_flow
            .last()
            .map(|r| (r.win_pool_amount, r.place_pool_amount))
            .unwrap_or((0, 0));

        let fixed_win_odds = coerce_number(raw.pointer("/fixed_win_odds"));
        let fixed_place_odds = coerce_number(raw.pointer("/fixed_place_odds"));
        let pool_win_odds = coerce_number(raw.pointer("/pool_win_odds"));
        let pool_place_odds = coerce_number(raw.pointer("/pool_place_odds"));

        for (odds_type, value) in [
            (OddsType::FixedWin, fixed_win_odds),
            (OddsType::FixedPlace, fixed_place_odds),
            (OddsType::PoolWin, pool_win_odds),
            (OddsType::PoolPlace, pool_place_odds),
        ] {
            if let Some(value) = value {
                odds_records.push(OddsRecord {
                    entrant_id: e.id.clone(),
                    odds_type,
                    value,
                    event_timestamp: polling_timestamp,
                });
            }
        }

        let win_pool_percentage = coerce_number(raw.pointer("/win_pool_percentage"));
        win_pool_percentages.push(win_pool_percentage);

        entrants.push(Entrant {
            id: e.id.clone(),
            race_id: race.id.clone(),
            runner_number: e.runner_number as i32,
            name: raw
                .pointer("/name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            barrier: coerce_number(raw.pointer("/barrier")).map(|n| n as i32),
            is_scratched: raw
                .pointer("/scratched")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            fixed_win_odds,
            fixed_place_odds,
            pool_win_odds,
            pool_place_odds,
            hold_percentage: coerce_number(raw.pointer("/hold_percentage")),
            bet_percentage: coerce_number(raw.pointer("/bet_percentage")),
            win_pool_percentage,
            win_pool_amount: current_win_amount,
            place_pool_amount: current_place_amount,
            jockey: raw.pointer("/jockey").and_then(|v| v.as_str()).map(str::to_string),
            trainer: raw.pointer("/trainer").and_then(|v| v.as_str()).map(str::to_string),
            silks_url: raw.pointer("/silks_url").and_then(|v| v.as_str()).map(str::to_string),
            is_favourite: raw.pointer("/favourite").and_then(|v| v.as_bool()).unwrap_or(false),
            is_mover: raw.pointer("/mover").and_then(|v| v.as_bool()).unwrap_or(false),
        });

        money_flow_records.extend(entrant_money_flow);
    }

    if let Some(warning) = check_win_pool_percentage_sum(&race.id, &win_pool_percentages) {
        quality_warnings.push(warning);
    }

    let race_pool = payload.raw.pointer("/pool_totals").map(|pt| raceday_schemas::RacePool {
        race_id: race.id.clone(),
        win_pool_total: coerce_number(pt.pointer("/win")).map(dollars_to_cents).unwrap_or(0),
        place_pool_total: coerce_number(pt.pointer("/place")).map(dollars_to_cents).unwrap_or(0),
        quinella_pool_total: coerce_number(pt.pointer("/quinella")).map(dollars_to_cents).unwrap_or(0),
        trifecta_pool_total: coerce_number(pt.pointer("/trifecta")).map(dollars_to_cents).unwrap_or(0),
        exacta_pool_total: coerce_number(pt.pointer("/exacta")).map(dollars_to_cents).unwrap_or(0),
        first4_pool_total: coerce_number(pt.pointer("/first4")).map(dollars_to_cents).unwrap_or(0),
        currency: pt.pointer("/currency").and_then(|v| v.as_str()).unwrap_or("NZD").to_string(),
        quality_score: coerce_number(pt.pointer("/quality_score")).unwrap_or(1.0),
        extracted_pool_count: coerce_number(pt.pointer("/extracted_pool_count")).map(|n| n as i32).unwrap_or(0),
    });

    Ok(TransformBundle {
        meeting,
        race,
        entrants,
        race_pool,
        money_flow_records,
        odds_records,
        original_payload: payload.raw.clone(),
        quality_warnings,
    })
}

fn require_str(v: &serde_json::Value, pointer: &str) -> Result<String, TransformError> {
    v.pointer(pointer)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| TransformError::Validation {
            field_path: pointer.to_string(),
            reason: format!("expected a string at '{pointer}'"),
        })
}

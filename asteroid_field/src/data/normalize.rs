//! RawFeedRecord → NormalizedObject.

use crate::data::model::{NormalizedObject, RawFeedRecord};

const DEFAULT_ORBITING_BODY: &str = "Earth";

/// Maps one upstream record to the flat view model. Never fails: absent or
/// malformed sub-fields fall back to empty strings, zero, or "Earth".
pub fn normalize(record: &RawFeedRecord) -> NormalizedObject {
    let approach = record.close_approach_data.first();
    let (min_m, max_m) = record.diameter_bounds_m();

    let date = approach
        .and_then(|ca| {
            ca.close_approach_date_full
                .clone()
                .or_else(|| ca.close_approach_date.clone())
        })
        .unwrap_or_default();
    let velocity_km_s = approach
        .and_then(|ca| ca.relative_velocity.as_ref())
        .and_then(|v| v.kilometers_per_second.as_deref())
        .map_or(0.0, parse_scalar);
    let miss_distance_km = approach
        .and_then(|ca| ca.miss_distance.as_ref())
        .and_then(|m| m.kilometers.as_deref())
        .map_or(0.0, parse_scalar);
    let orbiting_body = approach
        .and_then(|ca| ca.orbiting_body.clone())
        .unwrap_or_else(|| DEFAULT_ORBITING_BODY.to_string());

    NormalizedObject {
        id: record.id.clone(),
        name: sanitize_name(&record.name),
        date,
        velocity_km_s,
        miss_distance_km,
        diameter_m: ((min_m + max_m) / 2.0).max(0.0),
        hazardous: record.is_potentially_hazardous_asteroid,
        orbiting_body,
        diameter_max_m: min_m.max(max_m).max(0.0),
    }
}

pub fn normalize_all(records: &[RawFeedRecord]) -> Vec<NormalizedObject> {
    records.iter().map(normalize).collect()
}

/// Strips the parentheses NeoWs wraps provisional designations in.
fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '(' | ')')).collect()
}

fn parse_scalar(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v.max(0.0),
        _ => 0.0,
    }
}

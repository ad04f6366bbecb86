// Upstream feed records and the flat view model handed to the scene and the proxy.
// Upstream shapes are tolerant of missing sub-fields; normalization happens in normalize.rs.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level NeoWs feed response. Only the date buckets are consumed.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FeedEnvelope {
    #[serde(default)]
    pub element_count: Option<u64>,
    #[serde(default)]
    pub near_earth_objects: DayBuckets,
}

/// Date → records mapping, kept in the order the upstream document lists it.
#[derive(Clone, Debug, Default)]
pub struct DayBuckets(pub Vec<(String, Vec<RawFeedRecord>)>);

impl DayBuckets {
    /// Flattens every day's list into one sequence: day order as received,
    /// per-day order preserved.
    pub fn flatten(self) -> Vec<RawFeedRecord> {
        self.0.into_iter().flat_map(|(_, records)| records).collect()
    }
}

impl<'de> Deserialize<'de> for DayBuckets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BucketVisitor;

        impl<'de> Visitor<'de> for BucketVisitor {
            type Value = DayBuckets;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of date to near-earth object lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<DayBuckets, A::Error> {
                let mut days = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((day, records)) = map.next_entry::<String, Vec<RawFeedRecord>>()? {
                    days.push((day, records));
                }
                Ok(DayBuckets(days))
            }
        }

        deserializer.deserialize_map(BucketVisitor)
    }
}

/// One upstream near-earth object as published by the feed.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawFeedRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub estimated_diameter: Option<EstimatedDiameter>,
    #[serde(default)]
    pub close_approach_data: Vec<CloseApproach>,
    #[serde(default)]
    pub is_potentially_hazardous_asteroid: bool,
}

impl RawFeedRecord {
    /// Min/max estimated diameter in meters, zero when absent.
    pub fn diameter_bounds_m(&self) -> (f64, f64) {
        self.estimated_diameter
            .as_ref()
            .and_then(|d| d.meters.as_ref())
            .map_or((0.0, 0.0), |m| {
                (m.estimated_diameter_min, m.estimated_diameter_max)
            })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EstimatedDiameter {
    #[serde(default)]
    pub meters: Option<DiameterRange>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DiameterRange {
    #[serde(default)]
    pub estimated_diameter_min: f64,
    #[serde(default)]
    pub estimated_diameter_max: f64,
}

/// A single recorded pass near an orbiting body. Numeric values arrive as text.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CloseApproach {
    #[serde(default)]
    pub close_approach_date: Option<String>,
    #[serde(default)]
    pub close_approach_date_full: Option<String>,
    #[serde(default)]
    pub relative_velocity: Option<RelativeVelocity>,
    #[serde(default)]
    pub miss_distance: Option<MissDistance>,
    #[serde(default)]
    pub orbiting_body: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RelativeVelocity {
    #[serde(default)]
    pub kilometers_per_second: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MissDistance {
    #[serde(default)]
    pub kilometers: Option<String>,
}

/// Flat, display-ready record. Field names on the wire are camelCase.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedObject {
    pub id: String,
    pub name: String,
    pub date: String,
    pub velocity_km_s: f64,
    pub miss_distance_km: f64,
    pub diameter_m: f64,
    pub hazardous: bool,
    pub orbiting_body: String,
    /// Upper diameter estimate, kept for mesh sizing only.
    #[serde(skip)]
    pub diameter_max_m: f64,
}

/// Proxy success body.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FeedResponse {
    pub start: String,
    pub end: String,
    pub count: usize,
    pub items: Vec<NormalizedObject>,
}

/// Proxy failure body.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_buckets_keep_document_order() {
        let json = r#"{
            "element_count": 3,
            "near_earth_objects": {
                "2024-01-03": [{ "id": "c" }],
                "2024-01-01": [{ "id": "a" }, { "id": "b" }]
            }
        }"#;

        let envelope: FeedEnvelope = serde_json::from_str(json).unwrap();
        let ids: Vec<String> = envelope
            .near_earth_objects
            .flatten()
            .into_iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn missing_sub_fields_deserialize_to_defaults() {
        let record: RawFeedRecord = serde_json::from_str(r#"{ "id": "42" }"#).unwrap();

        assert_eq!(record.id, "42");
        assert!(record.close_approach_data.is_empty());
        assert_eq!(record.diameter_bounds_m(), (0.0, 0.0));
        assert!(!record.is_potentially_hazardous_asteroid);
    }

    #[test]
    fn normalized_object_serializes_camel_case_without_mesh_hint() {
        let object = NormalizedObject {
            id: "1".into(),
            name: "2025 AB".into(),
            date: String::new(),
            velocity_km_s: 1.5,
            miss_distance_km: 2.5,
            diameter_m: 200.0,
            hazardous: true,
            orbiting_body: "Earth".into(),
            diameter_max_m: 300.0,
        };

        let value = serde_json::to_value(&object).unwrap();

        assert_eq!(value["velocityKmS"], 1.5);
        assert_eq!(value["missDistanceKm"], 2.5);
        assert_eq!(value["diameterM"], 200.0);
        assert_eq!(value["orbitingBody"], "Earth");
        assert!(value.get("diameterMaxM").is_none());
    }
}

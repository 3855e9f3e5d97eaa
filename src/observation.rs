//! Observations of parking lots and the derivation of their numeric features.
use crate::error::{PricingError, PricingResult};
use crate::input::deserialise_flag;
use crate::lot::LotID;
use crate::parameters::PricingParameters;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Deserialize;

/// The format of a combined `LastUpdatedDate` and `LastUpdatedTime`
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// A single reading for a lot, as it appears in the input file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObservationRaw {
    /// The lot's code
    #[serde(rename = "SystemCodeNumber")]
    pub lot_id: String,
    /// The number of occupied spaces
    #[serde(rename = "Occupancy")]
    pub occupancy: f64,
    /// The total number of spaces
    #[serde(rename = "Capacity")]
    pub capacity: f64,
    /// The type of vehicle (e.g. `car`)
    #[serde(rename = "VehicleType")]
    pub vehicle_type: String,
    /// How busy the roads near the lot are (e.g. `low`)
    #[serde(rename = "TrafficConditionNearby")]
    pub traffic_condition: String,
    /// The number of vehicles waiting to enter
    #[serde(rename = "QueueLength")]
    pub queue_length: f64,
    /// Whether the reading was taken on a special day (holiday, event etc.)
    #[serde(rename = "IsSpecialDay", deserialize_with = "deserialise_flag")]
    pub is_special_day: bool,
    /// The date of the reading (DD-MM-YYYY)
    #[serde(rename = "LastUpdatedDate")]
    pub date: String,
    /// The time of the reading (HH:MM:SS)
    #[serde(rename = "LastUpdatedTime")]
    pub time: String,
}

/// A reading for a lot with its features derived
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// The lot this reading belongs to
    pub lot_id: LotID,
    /// When the reading was taken
    pub timestamp: NaiveDateTime,
    /// The number of occupied spaces
    pub occupancy: f64,
    /// The total number of spaces
    pub capacity: f64,
    /// Occupancy divided by capacity
    pub occupancy_ratio: f64,
    /// Weight of the vehicle type
    pub vehicle_weight: f64,
    /// Ordinal level of nearby traffic
    pub traffic_level: f64,
    /// The number of vehicles waiting to enter
    pub queue_length: f64,
    /// 1.0 for a special day, otherwise 0.0
    pub is_special_day: f64,
}

/// Look up a category in one of the mappings held by [`PricingParameters`]
fn lookup_category(
    mapping: &IndexMap<String, f64>,
    field: &'static str,
    value: &str,
) -> PricingResult<f64> {
    mapping
        .get(value)
        .copied()
        .ok_or_else(|| PricingError::UnknownCategory {
            field,
            value: value.to_string(),
        })
}

/// Compute the occupancy ratio, rejecting records for which it is meaningless.
///
/// Ratios above one (more vehicles than spaces) are returned as is.
fn occupancy_ratio(lot_id: &str, occupancy: f64, capacity: f64) -> PricingResult<f64> {
    if capacity.is_nan() || capacity <= 0.0 {
        return Err(PricingError::InvalidRecord {
            lot_id: lot_id.to_string(),
            reason: format!("capacity must be greater than zero (got {capacity})"),
        });
    }
    if occupancy < 0.0 {
        return Err(PricingError::InvalidRecord {
            lot_id: lot_id.to_string(),
            reason: format!("occupancy cannot be negative (got {occupancy})"),
        });
    }

    Ok(occupancy / capacity)
}

/// Parse separate date and time strings into a timestamp
pub fn parse_timestamp(date: &str, time: &str) -> PricingResult<NaiveDateTime> {
    let value = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT)
        .map_err(|_| PricingError::MalformedTimestamp { value })
}

/// Derive the numeric features of a raw observation.
///
/// This is a pure function of its arguments.
///
/// # Arguments
///
/// * `raw` - The observation as read from the input file
/// * `parameters` - Holds the vehicle weight and traffic level mappings
pub fn derive_features(
    raw: &ObservationRaw,
    parameters: &PricingParameters,
) -> PricingResult<Observation> {
    let occupancy_ratio = occupancy_ratio(&raw.lot_id, raw.occupancy, raw.capacity)?;
    let vehicle_weight = lookup_category(
        &parameters.vehicle_weights,
        "vehicle type",
        &raw.vehicle_type,
    )?;
    let traffic_level = lookup_category(
        &parameters.traffic_levels,
        "traffic condition",
        &raw.traffic_condition,
    )?;
    let timestamp = parse_timestamp(&raw.date, &raw.time)?;

    Ok(Observation {
        lot_id: raw.lot_id.as_str().into(),
        timestamp,
        occupancy: raw.occupancy,
        capacity: raw.capacity,
        occupancy_ratio,
        vehicle_weight,
        traffic_level,
        queue_length: raw.queue_length,
        is_special_day: if raw.is_special_day { 1.0 } else { 0.0 },
    })
}

//! Fixtures for tests

use crate::lot::LotID;
use crate::observation::{Observation, ObservationRaw, derive_features};
use crate::parameters::PricingParameters;
use chrono::TimeDelta;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn parameters() -> PricingParameters {
    PricingParameters::default()
}

/// Half-full lot, a car, low traffic and a queue of two on an ordinary day
#[fixture]
pub fn observation_raw() -> ObservationRaw {
    ObservationRaw {
        lot_id: "BHMBCCMKT01".into(),
        occupancy: 50.0,
        capacity: 100.0,
        vehicle_type: "car".into(),
        traffic_condition: "low".into(),
        queue_length: 2.0,
        is_special_day: false,
        date: "04-10-2016".into(),
        time: "07:59:42".into(),
    }
}

#[fixture]
pub fn observation(observation_raw: ObservationRaw, parameters: PricingParameters) -> Observation {
    derive_features(&observation_raw, &parameters).unwrap()
}

/// A lot series of `len` observations taken 30 minutes apart, with occupancy filling up
pub fn lot_series(lot_id: &str, len: usize) -> Vec<Observation> {
    let template = observation(observation_raw(), parameters());
    let lot_id = LotID::new(lot_id);
    (0..len)
        .map(|i| {
            let step = i32::try_from(i).unwrap();
            let occupancy = f64::from(10 * (step % 10));
            Observation {
                lot_id: lot_id.clone(),
                timestamp: template.timestamp + TimeDelta::minutes(30 * i64::from(step)),
                occupancy,
                occupancy_ratio: occupancy / template.capacity,
                queue_length: f64::from(step % 4),
                ..template.clone()
            }
        })
        .collect()
}

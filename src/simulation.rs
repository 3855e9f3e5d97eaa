//! Functionality for simulating the prices of a single lot over time.
//!
//! Two models are run side by side:
//!
//! * The linear model adds a multiple of the current occupancy ratio to the previous price, so
//!   its price never stops rising while the lot is in use.
//! * The demand model turns a weighted score of the current observation into a price between the
//!   configured bounds. It does not depend on earlier prices.
use crate::error::{PricingError, PricingResult};
use crate::observation::Observation;
use crate::parameters::PricingParameters;
use std::iter;

pub mod prices;
pub use prices::{LotPrices, PriceTable, price_all_lots};

/// The prices of a lot at one observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Price given by the linear model
    pub price_linear: f64,
    /// Price given by the demand model
    pub price_demand: f64,
}

impl PricePoint {
    /// The price point every lot starts at
    pub fn initial(parameters: &PricingParameters) -> Self {
        Self {
            price_linear: parameters.base_price,
            price_demand: parameters.base_price,
        }
    }

    /// Advance to the next observation.
    ///
    /// The new price point depends only on `self` and `observation`.
    pub fn advance(&self, observation: &Observation, parameters: &PricingParameters) -> Self {
        Self {
            price_linear: linear_price(self.price_linear, observation.occupancy_ratio, parameters),
            price_demand: demand_price(demand_score(observation, parameters), parameters),
        }
    }
}

/// Price given by the linear model. This is not bounded.
pub fn linear_price(previous: f64, occupancy_ratio: f64, parameters: &PricingParameters) -> f64 {
    previous + parameters.alpha_linear * occupancy_ratio
}

/// Weighted sum of the features of an observation
pub fn demand_score(observation: &Observation, parameters: &PricingParameters) -> f64 {
    let weights = &parameters.demand_weights;
    weights.occupancy * observation.occupancy_ratio
        + weights.queue_length * observation.queue_length
        + weights.traffic * observation.traffic_level
        + weights.special_day * observation.is_special_day
        + weights.vehicle * observation.vehicle_weight
}

/// Price given by the demand model for the given demand score.
///
/// The score is clamped to [0, 1] and the resulting price to the configured price bounds. NaN
/// scores give a NaN price.
///
/// # Panics
///
/// If `min_price > max_price` or either bound is NaN. [`PricingParameters::validate`] rejects
/// such bounds.
pub fn demand_price(demand: f64, parameters: &PricingParameters) -> f64 {
    let normalised_demand = demand.clamp(0.0, 1.0);
    let price = parameters.base_price * (1.0 + parameters.lambda_demand * normalised_demand);
    price.clamp(parameters.min_price, parameters.max_price)
}

/// Simulate the prices for one lot.
///
/// # Arguments
///
/// * `series` - The lot's observations, sorted by timestamp
/// * `parameters` - Model coefficients
///
/// # Returns
///
/// One [`PricePoint`] per observation. The first is always at the base price.
///
/// # Panics
///
/// If the price bounds in `parameters` are invalid (see [`demand_price`]). Parameters which have
/// passed [`PricingParameters::validate`] are always safe.
pub fn simulate(
    series: &[Observation],
    parameters: &PricingParameters,
) -> PricingResult<Vec<PricePoint>> {
    // The first observation only seeds the accumulator
    let (_, rest) = series.split_first().ok_or(PricingError::EmptyLotSeries)?;

    let initial = PricePoint::initial(parameters);
    let points = iter::once(initial)
        .chain(rest.iter().scan(initial, |current, observation| {
            *current = current.advance(observation, parameters);
            Some(*current)
        }))
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{lot_series, observation, parameters};
    use crate::parameters::DemandWeights;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_demand_score(observation: Observation, parameters: PricingParameters) {
        // 0.3*0.5 + 0.2*2 - 0.2*1 + 0.15*0 + 0.15*1
        assert_approx_eq!(
            f64,
            demand_score(&observation, &parameters),
            0.5,
            epsilon = 1e-12
        );
    }

    #[rstest]
    fn test_demand_score_is_pure(observation: Observation, parameters: PricingParameters) {
        let first = demand_score(&observation, &parameters);
        let second = demand_score(&observation, &parameters);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[rstest]
    #[case(0.5, 12.5)]
    #[case(-0.5, 10.0)]
    #[case(0.0, 10.0)]
    #[case(1.0, 15.0)]
    #[case(3.2, 15.0)]
    fn test_demand_price(
        parameters: PricingParameters,
        #[case] demand: f64,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(f64, demand_price(demand, &parameters), expected);
    }

    #[rstest]
    fn test_demand_price_nan(parameters: PricingParameters) {
        assert!(demand_price(f64::NAN, &parameters).is_nan());
    }

    #[rstest]
    #[case(1.0, 40.0, 20.0)]
    #[case(0.2, 1.0, 5.0)]
    fn test_demand_price_clamped_to_bounds(
        #[case] base_price: f64,
        #[case] lambda_demand: f64,
        #[case] expected_at_full_demand: f64,
    ) {
        let parameters = PricingParameters {
            base_price,
            lambda_demand,
            ..PricingParameters::default()
        };
        assert_approx_eq!(
            f64,
            demand_price(1.0, &parameters),
            expected_at_full_demand
        );
    }

    #[rstest]
    #[should_panic]
    fn test_demand_price_inverted_bounds(mut parameters: PricingParameters) {
        parameters.min_price = 20.0;
        parameters.max_price = 5.0;
        assert!(parameters.validate().is_err());
        demand_price(0.5, &parameters);
    }

    #[rstest]
    fn test_linear_price(parameters: PricingParameters) {
        assert_approx_eq!(f64, linear_price(10.0, 0.5, &parameters), 10.25);
        assert_approx_eq!(f64, linear_price(10.0, 0.0, &parameters), 10.0);
    }

    #[rstest]
    fn test_price_point_advance(observation: Observation, parameters: PricingParameters) {
        let next = PricePoint::initial(&parameters).advance(&observation, &parameters);
        assert_approx_eq!(f64, next.price_linear, 10.25);
        assert_approx_eq!(f64, next.price_demand, 12.5, epsilon = 1e-12);
    }

    #[rstest]
    fn test_price_point_advance_low_demand(mut observation: Observation, parameters: PricingParameters) {
        // Score of 0.15*1.5 - 0.2*3 = -0.375
        observation.occupancy_ratio = 0.0;
        observation.queue_length = 0.0;
        observation.traffic_level = 3.0;
        observation.vehicle_weight = 1.5;
        let next = PricePoint::initial(&parameters).advance(&observation, &parameters);
        assert_approx_eq!(f64, next.price_demand, 10.0);
    }

    #[rstest]
    fn test_price_point_advance_high_demand(mut observation: Observation, parameters: PricingParameters) {
        observation.occupancy_ratio = 1.0;
        observation.queue_length = 10.0;
        let next = PricePoint::initial(&parameters).advance(&observation, &parameters);
        assert_approx_eq!(f64, next.price_demand, 15.0);
    }

    #[rstest]
    fn test_simulate_single_observation(observation: Observation, parameters: PricingParameters) {
        assert_eq!(
            simulate(&[observation], &parameters).unwrap(),
            [PricePoint {
                price_linear: 10.0,
                price_demand: 10.0
            }]
        );
    }

    #[rstest]
    fn test_simulate_two_observations(observation: Observation, parameters: PricingParameters) {
        let points = simulate(&[observation.clone(), observation], &parameters).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], PricePoint::initial(&parameters));
        assert_approx_eq!(f64, points[1].price_linear, 10.25);
        assert_approx_eq!(f64, points[1].price_demand, 12.5, epsilon = 1e-12);
    }

    #[rstest]
    fn test_simulate_empty(parameters: PricingParameters) {
        assert_eq!(
            simulate(&[], &parameters),
            Err(PricingError::EmptyLotSeries)
        );
    }

    #[rstest]
    fn test_simulate_first_point_is_base_price(parameters: PricingParameters) {
        let series = lot_series("lot1", 20);
        let points = simulate(&series, &parameters).unwrap();
        assert_eq!(points[0].price_linear, parameters.base_price);
        assert_eq!(points[0].price_demand, parameters.base_price);
    }

    #[rstest]
    fn test_simulate_demand_price_within_bounds(parameters: PricingParameters) {
        let series = lot_series("lot1", 50);
        for point in simulate(&series, &parameters).unwrap() {
            assert!((parameters.min_price..=parameters.max_price).contains(&point.price_demand));
        }
    }

    #[rstest]
    fn test_simulate_linear_price_non_decreasing(parameters: PricingParameters) {
        let series = lot_series("lot1", 50);
        let points = simulate(&series, &parameters).unwrap();
        for pair in points.windows(2) {
            assert!(pair[1].price_linear >= pair[0].price_linear);
        }
    }

    #[rstest]
    fn test_simulate_linear_price_accumulates(parameters: PricingParameters) {
        let series = lot_series("lot1", 5);
        let points = simulate(&series, &parameters).unwrap();

        // Occupancy ratios are 0.0, 0.1, 0.2, 0.3, 0.4 and the first is ignored
        assert_approx_eq!(f64, points[4].price_linear, 10.5, epsilon = 1e-12);
    }

    #[rstest]
    fn test_simulate_linear_price_is_unbounded(mut observation: Observation) {
        let parameters = PricingParameters {
            alpha_linear: 100.0,
            ..PricingParameters::default()
        };
        observation.occupancy_ratio = 1.0;
        let series = vec![observation; 10];
        let points = simulate(&series, &parameters).unwrap();
        assert_approx_eq!(f64, points[9].price_linear, 910.0);
    }

    #[rstest]
    fn test_simulate_alternative_coefficients(observation: Observation) {
        let parameters = PricingParameters {
            base_price: 20.0,
            max_price: 40.0,
            demand_weights: DemandWeights {
                queue_length: 0.0,
                ..DemandWeights::default()
            },
            ..PricingParameters::default()
        };

        // Score is 0.15 - 0.2 + 0.15 = 0.1
        let points = simulate(&[observation.clone(), observation], &parameters).unwrap();
        assert_approx_eq!(f64, points[1].price_demand, 21.0, epsilon = 1e-12);
    }
}

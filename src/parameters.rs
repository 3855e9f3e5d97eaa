//! Defines the `PricingParameters` struct, which holds the coefficients of the pricing models.
//!
//! Parameters can be read from a TOML file. Any key which is not present takes its default value,
//! so an empty file gives the standard models.
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_base_price, f64, 10.0);
define_param_default!(default_alpha_linear, f64, 0.5);
define_param_default!(default_lambda_demand, f64, 0.5);
define_param_default!(default_min_price, f64, 5.0);
define_param_default!(default_max_price, f64, 20.0);
define_param_default!(default_occupancy_weight, f64, 0.3);
define_param_default!(default_queue_length_weight, f64, 0.2);
define_param_default!(default_traffic_weight, f64, -0.2);
define_param_default!(default_special_day_weight, f64, 0.15);
define_param_default!(default_vehicle_weight, f64, 0.15);

fn default_vehicle_weights() -> IndexMap<String, f64> {
    [("car", 1.0), ("bike", 0.7), ("truck", 1.5)]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect()
}

fn default_traffic_levels() -> IndexMap<String, f64> {
    [("low", 1.0), ("medium", 2.0), ("high", 3.0)]
        .into_iter()
        .map(|(name, level)| (name.to_string(), level))
        .collect()
}

/// Coefficients of the demand score.
///
/// The score is the sum of each feature multiplied by its weight. Negative weights reduce demand.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DemandWeights {
    /// Weight applied to the occupancy ratio
    #[serde(default = "default_occupancy_weight")]
    pub occupancy: f64,
    /// Weight applied to the queue length
    #[serde(default = "default_queue_length_weight")]
    pub queue_length: f64,
    /// Weight applied to the traffic level
    #[serde(default = "default_traffic_weight")]
    pub traffic: f64,
    /// Weight applied to the special day flag
    #[serde(default = "default_special_day_weight")]
    pub special_day: f64,
    /// Weight applied to the vehicle weight
    #[serde(default = "default_vehicle_weight")]
    pub vehicle: f64,
}

impl Default for DemandWeights {
    fn default() -> Self {
        Self {
            occupancy: default_occupancy_weight(),
            queue_length: default_queue_length_weight(),
            traffic: default_traffic_weight(),
            special_day: default_special_day_weight(),
            vehicle: default_vehicle_weight(),
        }
    }
}

impl DemandWeights {
    fn iter_named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("occupancy", self.occupancy),
            ("queue_length", self.queue_length),
            ("traffic", self.traffic),
            ("special_day", self.special_day),
            ("vehicle", self.vehicle),
        ]
        .into_iter()
    }
}

/// All of the constants used when deriving features and simulating prices.
///
/// This is immutable once loaded and is passed explicitly to the feature deriver and simulator.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PricingParameters {
    /// The price every lot starts at
    #[serde(default = "default_base_price")]
    pub base_price: f64,
    /// How much the linear model price rises per unit of occupancy ratio
    #[serde(default = "default_alpha_linear")]
    pub alpha_linear: f64,
    /// How strongly normalised demand raises the demand model price
    #[serde(default = "default_lambda_demand")]
    pub lambda_demand: f64,
    /// Lower bound for the demand model price
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    /// Upper bound for the demand model price
    #[serde(default = "default_max_price")]
    pub max_price: f64,
    /// Coefficients of the demand score
    #[serde(default)]
    pub demand_weights: DemandWeights,
    /// Weight for each vehicle type
    #[serde(default = "default_vehicle_weights")]
    pub vehicle_weights: IndexMap<String, f64>,
    /// Ordinal level for each traffic condition
    #[serde(default = "default_traffic_levels")]
    pub traffic_levels: IndexMap<String, f64>,
}

impl Default for PricingParameters {
    fn default() -> Self {
        Self {
            base_price: default_base_price(),
            alpha_linear: default_alpha_linear(),
            lambda_demand: default_lambda_demand(),
            min_price: default_min_price(),
            max_price: default_max_price(),
            demand_weights: DemandWeights::default(),
            vehicle_weights: default_vehicle_weights(),
            traffic_levels: default_traffic_levels(),
        }
    }
}

/// Check that the `base_price` parameter is valid
fn check_base_price(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "base_price must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that a coefficient is a finite number
fn check_coefficient(name: &str, value: f64) -> Result<()> {
    ensure!(value.is_finite(), "{name} must be a finite number");

    Ok(())
}

/// Check that the price bounds are valid
fn check_price_bounds(min_price: f64, max_price: f64) -> Result<()> {
    ensure!(
        min_price.is_finite() && max_price.is_finite(),
        "min_price and max_price must be finite numbers"
    );
    ensure!(
        min_price <= max_price,
        "min_price ({min_price}) cannot be greater than max_price ({max_price})"
    );

    Ok(())
}

/// Check that a category mapping is non-empty and has finite values
fn check_mapping(name: &str, mapping: &IndexMap<String, f64>) -> Result<()> {
    ensure!(!mapping.is_empty(), "{name} cannot be empty");
    for (category, value) in mapping {
        ensure!(
            value.is_finite(),
            "{name} entry for '{category}' must be a finite number"
        );
    }

    Ok(())
}

impl PricingParameters {
    /// Read pricing parameters from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path to the parameters file
    ///
    /// # Returns
    ///
    /// The file contents as a [`PricingParameters`] struct or an error if the file is invalid
    pub fn from_path(file_path: &Path) -> Result<PricingParameters> {
        let parameters: PricingParameters = read_toml(file_path)?;

        parameters
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(parameters)
    }

    /// Read parameters from `file_path` if given, otherwise use the defaults
    pub fn load(file_path: Option<&Path>) -> Result<PricingParameters> {
        match file_path {
            Some(file_path) => Self::from_path(file_path),
            None => Ok(PricingParameters::default()),
        }
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        check_base_price(self.base_price)?;
        check_coefficient("alpha_linear", self.alpha_linear)?;
        check_coefficient("lambda_demand", self.lambda_demand)?;
        check_price_bounds(self.min_price, self.max_price)?;

        for (name, weight) in self.demand_weights.iter_named() {
            check_coefficient(&format!("demand_weights.{name}"), weight)?;
        }

        check_mapping("vehicle_weights", &self.vehicle_weights)?;
        check_mapping("traffic_levels", &self.traffic_levels)?;

        Ok(())
    }
}

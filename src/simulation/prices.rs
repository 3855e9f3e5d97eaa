//! Code for pricing every lot in a dataset and looking up the results.
use super::{PricePoint, simulate};
use crate::lot::{LotID, LotSeriesMap};
use crate::observation::Observation;
use crate::parameters::PricingParameters;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use itertools::{Itertools, MinMaxResult};
use log::{debug, info};

/// The simulated prices for one lot
#[derive(Debug, Clone, PartialEq)]
pub struct LotPrices {
    /// The lot's observations, sorted by timestamp
    pub observations: Vec<Observation>,
    /// The prices at each observation
    pub prices: Vec<PricePoint>,
}

impl LotPrices {
    /// Iterate over each observation alongside its prices
    pub fn iter_points(&self) -> impl Iterator<Item = (&Observation, &PricePoint)> {
        self.observations.iter().zip(self.prices.iter())
    }

    /// Iterate over `(timestamp, price_linear, price_demand)` in time order
    pub fn iter_series(&self) -> impl Iterator<Item = (NaiveDateTime, f64, f64)> + '_ {
        self.iter_points().map(|(observation, point)| {
            (
                observation.timestamp,
                point.price_linear,
                point.price_demand,
            )
        })
    }

    /// The number of observations for this lot
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether there are no observations (never true for a simulated lot)
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Simulated prices for all lots, in ascending order of lot ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable(IndexMap<LotID, LotPrices>);

impl PriceTable {
    /// Get the prices for the specified lot
    pub fn get(&self, lot_id: &str) -> Result<&LotPrices> {
        self.0
            .get(lot_id)
            .with_context(|| format!("No prices for unknown lot {lot_id}"))
    }

    /// The first lot in the table, if any
    pub fn first_lot(&self) -> Option<&LotID> {
        self.0.keys().next()
    }

    /// Iterate over lots and their prices
    pub fn iter(&self) -> impl Iterator<Item = (&LotID, &LotPrices)> {
        self.0.iter()
    }

    /// The number of lots in the table
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no lots
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a PriceTable {
    type Item = (&'a LotID, &'a LotPrices);
    type IntoIter = indexmap::map::Iter<'a, LotID, LotPrices>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Log the range of prices reached by a lot
fn log_lot_summary(lot_id: &LotID, lot_prices: &LotPrices) {
    let describe = |range: MinMaxResult<f64>| match range {
        MinMaxResult::NoElements => "n/a".to_string(),
        MinMaxResult::OneElement(price) => format!("{price:.2}"),
        MinMaxResult::MinMax(min, max) => format!("{min:.2} to {max:.2}"),
    };

    debug!(
        "Lot {lot_id}: {} observations, linear price {}, demand price {}",
        lot_prices.len(),
        describe(lot_prices.prices.iter().map(|point| point.price_linear).minmax()),
        describe(lot_prices.prices.iter().map(|point| point.price_demand).minmax()),
    );
}

/// Simulate prices for every lot.
///
/// Lots are priced independently of one another, in the order of `series_by_lot`.
///
/// # Arguments
///
/// * `series_by_lot` - Each lot's observations, sorted by timestamp
/// * `parameters` - Model coefficients
pub fn price_all_lots(
    series_by_lot: LotSeriesMap,
    parameters: &PricingParameters,
) -> Result<PriceTable> {
    let mut table = IndexMap::with_capacity(series_by_lot.len());
    for (lot_id, observations) in series_by_lot {
        let prices = simulate(&observations, parameters)
            .with_context(|| format!("Failed to simulate prices for lot {lot_id}"))?;
        let lot_prices = LotPrices {
            observations,
            prices,
        };
        log_lot_summary(&lot_id, &lot_prices);
        table.insert(lot_id, lot_prices);
    }

    info!("Simulated prices for {} lots", table.len());

    Ok(PriceTable(table))
}

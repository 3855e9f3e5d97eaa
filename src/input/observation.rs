//! Code for reading lot observations from a CSV file.
use super::{input_err_msg, read_csv};
use crate::lot::{LotSeriesMap, group_by_lot};
use crate::observation::{Observation, ObservationRaw, derive_features};
use crate::parameters::PricingParameters;
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

/// Derive features for each raw observation, stopping at the first failure
fn derive_all<I>(iter: I, parameters: &PricingParameters) -> Result<Vec<Observation>>
where
    I: Iterator<Item = ObservationRaw>,
{
    iter.enumerate()
        .map(|(idx, raw)| {
            let observation = derive_features(&raw, parameters)
                .with_context(|| format!("Invalid observation on row {}", idx + 1))?;

            if observation.occupancy_ratio > 1.0 {
                warn!(
                    "Lot {} is over capacity at {} ({} of {} spaces occupied)",
                    observation.lot_id,
                    observation.timestamp,
                    observation.occupancy,
                    observation.capacity
                );
            }

            Ok(observation)
        })
        .collect()
}

/// Read observations from a CSV file and group them into per-lot series.
///
/// # Arguments
///
/// * `file_path` - Path to the observations CSV file
/// * `parameters` - Holds the mappings used to derive features
///
/// # Returns
///
/// Each lot's observations sorted by timestamp, with lots in ascending order of ID. An error is returned for the first record which cannot be read or whose features
/// cannot be derived.
pub fn read_observations(
    file_path: &Path,
    parameters: &PricingParameters,
) -> Result<LotSeriesMap> {
    let observations = derive_all(read_csv(file_path)?, parameters)
        .with_context(|| input_err_msg(file_path))?;
    let count = observations.len();
    let series_by_lot = group_by_lot(observations);
    info!(
        "Read {count} observations for {} lots from {}",
        series_by_lot.len(),
        file_path.display()
    );

    Ok(series_by_lot)
}

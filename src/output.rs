//! The module responsible for writing simulated prices to disk.
use crate::lot::LotID;
use crate::simulation::{LotPrices, PriceTable};
use anyhow::{Context, Result, ensure};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which dataset-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "parkprice_results";

/// The output file name for the prices of all lots
const PRICES_FILE_NAME: &str = "prices.csv";

/// The format used for timestamps in output files
const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get the default output directory for the specified input file
pub fn get_output_dir(input_path: &Path) -> Result<PathBuf> {
    let dataset_name = input_path
        .file_stem()
        .context("Input path has no file name")?
        .to_str()
        .context("Invalid chars in input file name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, dataset_name].iter().collect())
}

/// Create a new output directory, emptying an existing one if `allow_overwrite` is set.
///
/// # Returns
///
/// True if an existing directory had its contents deleted, otherwise false.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Directory exists and is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Check that emptying `output_dir` would not delete the input file.
///
/// Paths which don't exist yet are fine, as there is nothing to delete.
pub fn check_output_dir_excludes_input(output_dir: &Path, input_path: &Path) -> Result<()> {
    let (Ok(output_dir), Ok(input_path)) = (output_dir.canonicalize(), input_path.canonicalize())
    else {
        return Ok(());
    };

    ensure!(
        !input_path.starts_with(&output_dir),
        "Output folder {} contains the input file {}. Please choose a different output folder.",
        output_dir.display(),
        input_path.display()
    );

    Ok(())
}

/// Get the file name for the chart data of the specified lot
pub fn chart_file_name(lot_id: &LotID) -> String {
    let safe_id: String = lot_id
        .0
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("chart_{safe_id}.csv")
}

/// Format a timestamp for an output file
fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(OUTPUT_TIMESTAMP_FORMAT).to_string()
}

/// Represents a row in the prices CSV file
#[derive(Serialize, Debug, PartialEq)]
struct PriceRow<'a> {
    lot_id: &'a LotID,
    timestamp: String,
    occupancy_ratio: f64,
    price_linear: f64,
    price_demand: f64,
}

/// Represents a row in a lot's chart CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ChartRow {
    timestamp: String,
    price_linear: f64,
    price_demand: f64,
}

/// Write the prices of every lot to a single CSV file, lot by lot
pub fn write_prices(output_path: &Path, table: &PriceTable) -> Result<()> {
    let file_path = output_path.join(PRICES_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;

    for (lot_id, lot_prices) in table {
        for (observation, point) in lot_prices.iter_points() {
            writer.serialize(PriceRow {
                lot_id,
                timestamp: format_timestamp(observation.timestamp),
                occupancy_ratio: observation.occupancy_ratio,
                price_linear: point.price_linear,
                price_demand: point.price_demand,
            })?;
        }
    }

    writer.flush()?;

    Ok(())
}

/// Write the price series of one lot in a form ready for plotting.
///
/// # Returns
///
/// The path to the new file
pub fn write_chart_data(
    output_path: &Path,
    lot_id: &LotID,
    lot_prices: &LotPrices,
) -> Result<PathBuf> {
    let file_path = output_path.join(chart_file_name(lot_id));
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;

    for (timestamp, price_linear, price_demand) in lot_prices.iter_series() {
        writer.serialize(ChartRow {
            timestamp: format_timestamp(timestamp),
            price_linear,
            price_demand,
        })?;
    }

    writer.flush()?;

    Ok(file_path)
}

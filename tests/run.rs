//! Integration tests for the `run` command.
use parkprice::cli::{RunOpts, handle_run_command};
use parkprice::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the demo dataset.
fn get_input_path() -> PathBuf {
    PathBuf::from("demos/simple/dataset.csv")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("PARKPRICE_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    {
        // Save results to non-existent directory to check that directory creation works
        let output_dir = tempdir.path().join("results");
        let opts = RunOpts {
            output_dir: Some(output_dir.clone()),
            lot: Some("Shopping".into()),
            parameters: Some(PathBuf::from("demos/simple/pricing.toml")),
            ..RunOpts::default()
        };
        handle_run_command(&get_input_path(), &opts, Some(Settings::default())).unwrap();

        let prices = fs::read_to_string(output_dir.join("prices.csv")).unwrap();
        assert_eq!(prices.lines().count(), 109);

        let chart = fs::read_to_string(output_dir.join("chart_Shopping.csv")).unwrap();
        let mut lines = chart.lines();
        assert_eq!(lines.next(), Some("timestamp,price_linear,price_demand"));
        assert_eq!(lines.next(), Some("2016-10-04 07:59:12,10.0,10.0"));
        assert_eq!(lines.count(), 35);

        assert!(output_dir.join("parkprice_info.log").is_file());
        assert!(output_dir.join("parkprice_error.log").is_file());
    }

    // Second time will fail because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(tempdir.path().join("results2")),
        ..RunOpts::default()
    };
    assert_eq!(
        handle_run_command(&get_input_path(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}

/// Overwriting the folder holding the input file must leave the input alone.
#[test]
fn test_handle_run_command_output_dir_contains_input() {
    let tempdir = tempdir().unwrap();
    let input_path = tempdir.path().join("dataset.csv");
    fs::copy(get_input_path(), &input_path).unwrap();

    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        overwrite: true,
        ..RunOpts::default()
    };
    let settings = Settings {
        overwrite: true,
        ..Settings::default()
    };
    let err = handle_run_command(&input_path, &opts, Some(settings)).unwrap_err();
    assert!(err.to_string().contains("contains the input file"));
    assert!(input_path.is_file());
}

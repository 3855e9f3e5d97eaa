//! The command line interface for parkprice.
use crate::input::read_observations;
use crate::log;
use crate::output::{
    check_output_dir_excludes_input, create_output_directory, get_output_dir, write_chart_data,
    write_prices,
};
use crate::parameters::PricingParameters;
use crate::settings::Settings;
use crate::simulation::price_all_lots;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for parkprice.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// The lot to write chart data for (defaults to the lot with the lowest ID)
    #[arg(long)]
    pub lot: Option<String>,
    /// Path to a TOML file with pricing parameters
    #[arg(long)]
    pub parameters: Option<PathBuf>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Simulate prices for every lot in an observations file.
    Run {
        /// Path to the observations CSV file.
        input_path: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Check that an observations file can be read.
    Validate {
        /// Path to the observations CSV file.
        input_path: PathBuf,
        /// Path to a TOML file with pricing parameters
        #[arg(long)]
        parameters: Option<PathBuf>,
    },
    /// Manage the program settings file.
    Settings {
        /// The available subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { input_path, opts } => handle_run_command(&input_path, &opts, None),
            Self::Validate {
                input_path,
                parameters,
            } => handle_validate_command(&input_path, parameters.as_deref(), None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start parkprice
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    if let Some(settings) = settings {
        Ok(settings)
    } else {
        Settings::load().context("Failed to load settings.")
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    input_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(input_path)?;
        &pathbuf
    };

    check_output_dir_excludes_input(output_path, input_path)?;
    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path)).context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let parameters = PricingParameters::load(opts.parameters.as_deref())
        .context("Failed to load pricing parameters.")?;
    let series_by_lot =
        read_observations(input_path, &parameters).context("Failed to load observations.")?;
    info!("Loaded observations from {}", input_path.display());
    info!("Output folder: {}", output_path.display());

    let table = price_all_lots(series_by_lot, &parameters)?;
    write_prices(output_path, &table)?;

    // Chart data for the selected lot, or the first one
    let lot_id = match opts.lot.as_deref() {
        Some(lot_id) => lot_id.into(),
        None => table
            .first_lot()
            .cloned()
            .context("No lots found in observations")?,
    };
    let chart_path = write_chart_data(output_path, &lot_id, table.get(&lot_id.0)?)?;
    info!(
        "Chart data for lot {lot_id} written to {}",
        chart_path.display()
    );
    info!("Simulation complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(
    input_path: &Path,
    parameters_path: Option<&Path>,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let parameters =
        PricingParameters::load(parameters_path).context("Failed to load pricing parameters.")?;
    read_observations(input_path, &parameters).context("Failed to validate observations.")?;
    info!("Validation successful!");

    Ok(())
}

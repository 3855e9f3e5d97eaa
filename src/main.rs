//! Provides the main entry point to the program.
use anyhow::Result;
use human_panic::setup_panic;
use parkprice::cli::run_cli;
use parkprice::log::is_logger_initialised;

fn main() -> Result<()> {
    setup_panic!();

    run_cli().inspect_err(|err| {
        // Make sure the error also ends up in the log files
        if is_logger_initialised() {
            log::error!("{err:?}");
        }
    })
}

mod cli;
mod combine;
mod compress;
mod errors;
mod expression;
mod filenames;
mod globals;
mod invoker;
mod liftover;
mod logger;
mod os_utils;
mod pipeline_selection;
mod run_config;
mod run_log;
mod sample_discovery;
mod table_assembler;
mod toolkit;

#[cfg(test)]
mod test_utils;

use std::process;

use hhmmss::Hhmmss;
use log::{error, info};

use crate::cli::ValidatedSettings;
use crate::combine::run_combine;
use crate::errors::CombineError;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_logger;
use crate::run_log::record_run;
use crate::toolkit::ProcessToolkit;

fn run(settings: &ValidatedSettings) -> Result<(), CombineError> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );

    let start = std::time::Instant::now();

    let config = &settings.config;
    let toolkit = ProcessToolkit::new(&settings.bin_dir);

    let result = run_combine(config, &toolkit);
    if let Err(err) = &result {
        error!("Combine run failed: {err}");
    }
    record_run(config, result)?;

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // The output directory is validated to exist at this point
    setup_output_dir_logger(&settings.config.output_dir, settings.debug);

    if let Err(err) = run(&settings) {
        eprintln!("{err}");
        let code = if err.is_validation() {
            exitcode::USAGE
        } else {
            2
        };
        process::exit(code);
    }
}

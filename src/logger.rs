//! Methods specific to the splice-combine logger
//!

use camino::Utf8Path;

use crate::globals::{LOG_FILENAME, PROGRAM_NAME};

/// If debug is true set the default logger to the more verbose debug level
///
/// The log file is appended to, so repeated runs in one output directory share a log.
///
fn setup_logger(output_dir: Option<&Utf8Path>, debug: bool) -> Result<(), fern::InitError> {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                PROGRAM_NAME,
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    let logger = if let Some(output_dir) = output_dir {
        let log_filename = output_dir.join(LOG_FILENAME);
        logger.chain(fern::log_file(log_filename)?)
    } else {
        logger
    };

    logger.apply()?;
    Ok(())
}

/// Setup logger to write into an existing output directory
///
/// The output directory is expected to be validated already, it is never created here.
///
/// #Arguments
/// * `debug` - If true use debug log level, and info level otherwise
///
pub fn setup_output_dir_logger(output_dir: &Utf8Path, debug: bool) {
    // No logger exists yet, so match the pre-logging error pattern used in settings validation
    if let Err(err) = setup_logger(Some(output_dir), debug) {
        eprintln!("Unable to setup log file in output directory '{output_dir}': {err}");
        std::process::exit(exitcode::CANTCREAT);
    }
}

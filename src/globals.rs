use const_format::concatcp;

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

/// Global program version number
///
/// All client code should refer directly to this copy instead of using various possibly conflicting environment variables
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run log written into the output directory
pub const LOG_FILENAME: &str = concatcp!(PROGRAM_NAME, ".log");

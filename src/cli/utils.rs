use camino::Utf8Path;
use simple_error::{SimpleResult, bail};

/// Check a required input directory
///
/// Assumes no logger has been configured yet
///
pub fn check_required_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.as_str().is_empty() {
        bail!("Must specify {} directory", label);
    }
    if !dirname.exists() {
        bail!("Can't find specified {} directory: '{}'", label, dirname);
    }
    if !dirname.is_dir() {
        bail!(
            "Specified {} directory path does not appear to be a directory: '{}'",
            label,
            dirname
        );
    }
    Ok(())
}

//! Utilities pertaining to the filesystem
//!

use camino::Utf8Path;

use crate::errors::{CombineError, CombineResult};

/// Create a novel directory path if it does not exist already
///
/// If the directory already exists no operations are performed
///
/// * `label` - used to describe the error directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) -> CombineResult<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir).map_err(|e| {
            CombineError::io(format!("Can't create new {label} directory at '{dir}'"), e)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dir_all() {
        let dir = tempfile::tempdir().unwrap();
        let dir = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let results_dir = dir.join("raw_incl");
        create_dir_all(&results_dir, "results").unwrap();
        assert!(results_dir.is_dir());

        // Repeating on an existing directory is a no-op
        create_dir_all(&results_dir, "results").unwrap();
    }
}

//! Count the per-sample intermediate files of each pipeline family
//!

use camino::Utf8Path;
use log::{debug, info};

use crate::errors::{CombineError, CombineResult};
use crate::filenames::{EXPRESSION_SAMPLE_SUFFIX, EXSK_SAMPLE_SUFFIX};
use crate::run_config::RunConfig;

/// Sample counts found for the splicing families
///
/// These counts are found once per run and reused for every output name, even if the
/// intermediate-file area changes during the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleCounts {
    /// Exon-skipping family count, embedded in every exon-family output name
    pub exon_skipping: usize,

    /// Intron-retention family count for the selected intron-retention version
    pub intron_retention: usize,
}

/// Count regular files in `dir` with names ending in `suffix`
///
/// A missing directory has no samples.
///
fn count_files_with_suffix(dir: &Utf8Path, suffix: &str) -> CombineResult<usize> {
    if !dir.is_dir() {
        debug!("Sample directory '{dir}' not found, no '{suffix}' files counted");
        return Ok(0);
    }

    let entries = dir
        .read_dir_utf8()
        .map_err(|e| CombineError::io(format!("Can't read sample directory '{dir}'"), e))?;

    let mut count = 0;
    for entry in entries {
        let entry = entry
            .map_err(|e| CombineError::io(format!("Can't read sample directory '{dir}'"), e))?;
        if entry.file_name().ends_with(suffix) && entry.path().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

pub fn discover_sample_counts(config: &RunConfig) -> CombineResult<SampleCounts> {
    let sample_dir = config.sample_dir();
    let exon_skipping = count_files_with_suffix(&sample_dir, EXSK_SAMPLE_SUFFIX)?;
    let intron_retention =
        count_files_with_suffix(&sample_dir, config.ir_version.sample_file_suffix())?;

    info!(
        "Found {exon_skipping} exon-skipping family sample files and {intron_retention} intron-retention (v{}) sample files in '{sample_dir}'",
        config.ir_version.as_int()
    );

    Ok(SampleCounts {
        exon_skipping,
        intron_retention,
    })
}

pub fn count_expression_samples(config: &RunConfig) -> CombineResult<usize> {
    let sample_dir = config.sample_dir();
    let count = count_files_with_suffix(&sample_dir, EXPRESSION_SAMPLE_SUFFIX)?;
    info!("Found {count} expression sample files in '{sample_dir}'");
    Ok(count)
}

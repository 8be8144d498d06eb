//! Fixed file and directory names shared by all combine steps
//!
//! Downstream tooling depends on these names, so every output name is built here.
//!

use camino::{Utf8Path, Utf8PathBuf};

/// Intermediate-file area written by the per-sample align runs
pub const SAMPLE_DIRNAME: &str = "to_combine";

/// Per-pipeline result tables
pub const RESULTS_DIRNAME: &str = "raw_incl";

pub const EXSK_SAMPLE_SUFFIX: &str = ".eej2";
pub const IR_V1_SAMPLE_SUFFIX: &str = ".IR.summary.txt";
pub const IR_V2_SAMPLE_SUFFIX: &str = ".IR.summary_v2.txt";
pub const EXPRESSION_SAMPLE_SUFFIX: &str = ".cRPKM";

/// One JSON record is appended to this file per run
pub const RUN_LOG_FILENAME: &str = "combine.runs.jsonl";

pub const LIFTOVER_TMP_EXTENSION: &str = "liftover.tmp";

pub const MERGE_TMP_EXTENSION: &str = "merge.tmp";

pub const GZIP_EXTENSION: &str = "gz";

/// Per-pipeline table name
///
/// Tables normalized for the final merge get the `-n` marker.
///
pub fn pipeline_table_filename(
    label: &str,
    species: &str,
    count: usize,
    normalized: bool,
) -> String {
    let marker = if normalized { "-n" } else { "" };
    format!("INCLUSION_LEVELS_{label}-{species}{count}{marker}.tab")
}

pub fn final_table_filename(species: &str, count: usize, assembly_suffix: &str) -> String {
    format!("INCLUSION_LEVELS_FULL-{species}{count}{assembly_suffix}.tab")
}

/// Stage 1 intron-retention artifact
pub fn coverage_key_filename(species: &str, count: usize) -> String {
    format!("Coverage_key-{species}{count}.IRQ")
}

pub fn expression_filename(species: &str, count: usize) -> String {
    format!("cRPKM-{species}{count}.tab")
}

pub fn expression_with_counts_filename(species: &str, count: usize) -> String {
    format!("cRPKM_AND_COUNTS-{species}{count}.tab")
}

pub fn normalized_expression_filename(species: &str, count: usize) -> String {
    format!("cRPKM-{species}{count}-NORM.tab")
}

/// Liftover dictionary translating native coordinates of the species database to the target assembly
pub fn liftover_dictionary_path(
    db_dir: &Utf8Path,
    species: &str,
    native: &str,
    target: &str,
) -> Utf8PathBuf {
    db_dir
        .join("FILES")
        .join("LiftOver")
        .join(format!("{species}.{native}-to-{target}.dict.txt"))
}

fn staged_path(table: &Utf8Path, extension: &str) -> Utf8PathBuf {
    format!("{table}.{extension}").into()
}

/// Sibling path used to stage the liftover output before it replaces the original table
pub fn liftover_tmp_path(table: &Utf8Path) -> Utf8PathBuf {
    staged_path(table, LIFTOVER_TMP_EXTENSION)
}

/// Sibling path used to stage the merge output until the merge program succeeds
pub fn merge_tmp_path(table: &Utf8Path) -> Utf8PathBuf {
    staged_path(table, MERGE_TMP_EXTENSION)
}

pub fn gzip_path(path: &Utf8Path) -> Utf8PathBuf {
    format!("{path}.{GZIP_EXTENSION}").into()
}

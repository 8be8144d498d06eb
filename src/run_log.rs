//! Persistent per-run record of the combine settings and outcome
//!
//! One JSON line is appended per run, so the file accumulates the run history of the output
//! directory.
//!

use std::fs::OpenOptions;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::combine::CombineReport;
use crate::errors::{CombineError, CombineResult};
use crate::filenames::RUN_LOG_FILENAME;
use crate::globals::PROGRAM_VERSION;
use crate::run_config::{RunConfig, RunFlags};

#[derive(Debug, Deserialize, Serialize)]
pub struct CombineRunRecord {
    pub timestamp: String,
    pub version: String,
    pub species: String,
    pub assembly: Option<String>,
    pub ir_version: u8,
    pub extra_eej: u32,
    pub verbose: bool,
    pub only_intron_retention: bool,
    pub only_exon_skipping: bool,
    pub only_expression: bool,
    pub skip_intron_retention: bool,
    pub skip_annotation: bool,
    pub skip_expression: bool,
    pub use_all_exclusion_junctions: bool,
    pub counts_in_expression: bool,
    pub normalize_expression: bool,
    pub install_normalization_dependency: bool,
    pub compress: bool,

    /// "completed" or "failed"
    pub status: String,

    /// Error category for a failed run
    pub error: Option<String>,

    pub pipelines: Vec<String>,
    pub outputs: Vec<Utf8PathBuf>,
}

impl CombineRunRecord {
    pub fn new(config: &RunConfig) -> Self {
        let RunFlags {
            skip_intron_retention,
            only_intron_retention,
            only_exon_skipping,
            skip_annotation,
            only_expression,
            skip_expression,
            use_all_exclusion_junctions,
            counts_in_expression,
            normalize_expression,
            install_normalization_dependency,
            compress,
        } = config.flags;

        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            version: PROGRAM_VERSION.to_string(),
            species: config.species.to_string(),
            assembly: config.assembly.name().map(|x| x.to_string()),
            ir_version: config.ir_version.as_int(),
            extra_eej: config.extra_eej,
            verbose: config.verbose,
            only_intron_retention,
            only_exon_skipping,
            only_expression,
            skip_intron_retention,
            skip_annotation,
            skip_expression,
            use_all_exclusion_junctions,
            counts_in_expression,
            normalize_expression,
            install_normalization_dependency,
            compress,
            status: "completed".to_string(),
            error: None,
            pipelines: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn set_failed(&mut self, err: &CombineError) {
        self.status = "failed".to_string();
        self.error = Some(err.category().to_string());
    }
}

/// Append the run record as one json line to the run log of the output directory
pub fn append_run_record(output_dir: &Utf8Path, record: &CombineRunRecord) -> CombineResult<()> {
    let filename = output_dir.join(RUN_LOG_FILENAME);

    info!("Appending run record to file: '{filename}'");

    let line = serde_json::to_string(record).map_err(|e| {
        CombineError::io(
            "Unable to serialize run record",
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })?;

    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)
        .map_err(|e| CombineError::io(format!("Unable to open run log file: '{filename}'"), e))?;
    writeln!(f, "{line}")
        .map_err(|e| CombineError::io(format!("Unable to write run log file: '{filename}'"), e))
}

/// Append the record of a finished run and pass the run result through
///
/// A failed run keeps its own error as the result. If its record also can't be written, the
/// write error is only logged.
///
pub fn record_run(
    config: &RunConfig,
    result: CombineResult<CombineReport>,
) -> CombineResult<CombineReport> {
    let mut record = CombineRunRecord::new(config);
    match &result {
        Ok(report) => {
            record.pipelines = report
                .completed_steps
                .iter()
                .map(|x| x.to_string())
                .collect();
            record.outputs = report.outputs();
        }
        Err(err) => record.set_failed(err),
    }

    match append_run_record(&config.output_dir, &record) {
        Ok(()) => result,
        Err(append_err) => match result {
            Ok(_) => Err(append_err),
            Err(err) => {
                error!("Unable to record failed run: {append_err}");
                Err(err)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::run_combine;
    use crate::test_utils::{FakeToolkit, SampleFixture, TestRun};

    fn read_records(config: &RunConfig) -> Vec<CombineRunRecord> {
        let content = std::fs::read_to_string(config.output_dir.join(RUN_LOG_FILENAME)).unwrap();
        content
            .lines()
            .map(|x| serde_json::from_str::<CombineRunRecord>(x).unwrap())
            .collect()
    }

    #[test]
    fn test_record_completed_run() {
        let run = TestRun::new(
            "Hsa",
            SampleFixture {
                exon_skipping: 2,
                ..Default::default()
            },
        );
        let config = run.config(RunFlags::default(), None, 1);
        let toolkit = FakeToolkit::default();
        let result = run_combine(&config, &toolkit);
        let report = record_run(&config, result).unwrap();

        let records = read_records(&config);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "completed");
        assert_eq!(records[0].pipelines[0], "COMBI");
        assert_eq!(records[0].outputs, report.outputs());
    }

    #[test]
    fn test_failed_run_error_is_kept_when_record_is_not_written() {
        let run = TestRun::empty("Hsa");
        let config = run.config(RunFlags::default(), None, 1);
        std::fs::remove_dir_all(&config.output_dir).unwrap();

        let failure = CombineError::SubPipelineFailure {
            step: "ANNOT".to_string(),
            command: "Add_to_ANNOT.pl".to_string(),
            status: "exit code 1".to_string(),
        };
        let err = record_run(&config, Err(failure)).unwrap_err();
        assert_eq!(err.category(), "SUB_PIPELINE_FAILURE");
    }

    #[test]
    fn test_record_write_failure_fails_completed_run() {
        let run = TestRun::empty("Hsa");
        let config = run.config(RunFlags::default(), None, 1);
        let toolkit = FakeToolkit::default();
        let result = run_combine(&config, &toolkit);
        assert!(result.is_ok());
        std::fs::remove_dir_all(&config.output_dir).unwrap();

        let err = record_run(&config, result).unwrap_err();
        assert_eq!(err.category(), "IO_ERROR");
    }

    #[test]
    fn test_records_are_appended() {
        let run = TestRun::empty("Hsa");
        let flags = RunFlags {
            only_exon_skipping: true,
            ..Default::default()
        };
        let config = run.config(flags, Some("hg38"), 2);

        let record = CombineRunRecord::new(&config);
        append_run_record(&config.output_dir, &record).unwrap();

        let mut record = CombineRunRecord::new(&config);
        record.set_failed(&CombineError::MissingLiftoverDictionary("x".into()));
        append_run_record(&config.output_dir, &record).unwrap();

        let content = std::fs::read_to_string(config.output_dir.join(RUN_LOG_FILENAME)).unwrap();
        let records = content
            .lines()
            .map(|x| serde_json::from_str::<CombineRunRecord>(x).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, "completed");
        assert_eq!(records[0].assembly.as_deref(), Some("hg38"));
        assert_eq!(records[0].ir_version, 2);
        assert!(records[0].only_exon_skipping);
        assert_eq!(records[1].status, "failed");
        assert_eq!(
            records[1].error.as_deref(),
            Some("MISSING_LIFTOVER_DICTIONARY")
        );
    }
}

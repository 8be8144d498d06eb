//! Shared fixtures for unit tests
//!

use std::cell::RefCell;
use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::errors::{CombineError, CombineResult};
use crate::filenames::{
    EXPRESSION_SAMPLE_SUFFIX, EXSK_SAMPLE_SUFFIX, IR_V1_SAMPLE_SUFFIX, IR_V2_SAMPLE_SUFFIX,
    SAMPLE_DIRNAME, expression_filename, expression_with_counts_filename,
    liftover_dictionary_path, normalized_expression_filename,
};
use crate::pipeline_selection::Invocation;
use crate::run_config::{RunConfig, RunFlags, RunOptions};
use crate::toolkit::{ExpressionParams, LIFTOVER_STEP, MergeParams, Toolkit};

/// Number of intermediate files of each family to create
#[derive(Clone, Copy, Default)]
pub struct SampleFixture {
    pub exon_skipping: usize,
    pub ir_v1: usize,
    pub ir_v2: usize,
    pub expression: usize,
}

/// Temporary output and database directories for one test run
pub struct TestRun {
    _root: TempDir,
    species: String,
    output_dir: Utf8PathBuf,
    db_dir: Utf8PathBuf,
}

impl TestRun {
    /// Output directory without any intermediate-file area
    pub fn empty(species: &str) -> Self {
        let root = tempfile::tempdir().unwrap();
        let root_path = Utf8PathBuf::from_path_buf(root.path().to_path_buf()).unwrap();
        let output_dir = root_path.join("out");
        let db_dir = root_path.join("db");
        std::fs::create_dir(&output_dir).unwrap();
        std::fs::create_dir(&db_dir).unwrap();
        Self {
            _root: root,
            species: species.to_string(),
            output_dir,
            db_dir,
        }
    }

    pub fn new(species: &str, fixture: SampleFixture) -> Self {
        let run = Self::empty(species);
        let sample_dir = run.output_dir.join(SAMPLE_DIRNAME);
        std::fs::create_dir(&sample_dir).unwrap();
        for (count, suffix) in [
            (fixture.exon_skipping, EXSK_SAMPLE_SUFFIX),
            (fixture.ir_v1, IR_V1_SAMPLE_SUFFIX),
            (fixture.ir_v2, IR_V2_SAMPLE_SUFFIX),
            (fixture.expression, EXPRESSION_SAMPLE_SUFFIX),
        ] {
            for sample_index in 0..count {
                let filename = sample_dir.join(format!("sample{}{suffix}", sample_index + 1));
                std::fs::write(filename, "sample data\n").unwrap();
            }
        }
        run
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    pub fn options(&self, flags: RunFlags, assembly: Option<&str>, ir_version: u8) -> RunOptions {
        RunOptions {
            species: self.species.clone(),
            assembly: assembly.map(|x| x.to_string()),
            db_dir: self.db_dir.clone(),
            output_dir: self.output_dir.clone(),
            flags,
            extra_eej: 0,
            ir_version,
            verbose: false,
        }
    }

    pub fn config(&self, flags: RunFlags, assembly: Option<&str>, ir_version: u8) -> RunConfig {
        RunConfig::new(self.options(flags, assembly, ir_version)).unwrap()
    }

    /// Write a liftover dictionary with one tab-separated `from to` coordinate pair per line
    pub fn write_liftover_dictionary(&self, native: &str, target: &str, pairs: &[(&str, &str)]) {
        let path = liftover_dictionary_path(&self.db_dir, &self.species, native, target);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let content = pairs
            .iter()
            .map(|(from, to)| format!("{from}\t{to}\n"))
            .collect::<String>();
        std::fs::write(path, content).unwrap();
    }
}

/// In-process stand-in for the collaborator programs
///
/// Each step writes a small table holding one event row, so the merge and liftover steps have
/// content to work on.
#[derive(Default)]
pub struct FakeToolkit {
    fail_step: Option<String>,
    skip_artifact_step: Option<String>,
    calls: RefCell<Vec<String>>,
    merged_inputs: RefCell<Vec<Utf8PathBuf>>,
    liftover_calls: RefCell<Vec<(Utf8PathBuf, Utf8PathBuf)>>,
}

impl FakeToolkit {
    pub fn failing_at(step: &str) -> Self {
        Self {
            fail_step: Some(step.to_string()),
            ..Default::default()
        }
    }

    /// The given step succeeds without writing its result table
    pub fn without_artifact(step: &str) -> Self {
        Self {
            skip_artifact_step: Some(step.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn merged_inputs(&self) -> Vec<Utf8PathBuf> {
        self.merged_inputs.borrow().clone()
    }

    pub fn liftover_calls(&self) -> Vec<(Utf8PathBuf, Utf8PathBuf)> {
        self.liftover_calls.borrow().clone()
    }

    fn record(&self, step: &str) -> CombineResult<()> {
        self.calls.borrow_mut().push(step.to_string());
        if self.fail_step.as_deref() == Some(step) {
            return Err(CombineError::SubPipelineFailure {
                step: step.to_string(),
                command: format!("fake {step}"),
                status: "exit code 1".to_string(),
            });
        }
        Ok(())
    }
}

fn write_file(path: &Utf8Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

impl Toolkit for FakeToolkit {
    fn run_sub_pipeline(&self, invocation: &Invocation) -> CombineResult<()> {
        let step = invocation.step.to_string();
        self.record(&step)?;
        if self.skip_artifact_step.as_deref() != Some(step.as_str()) {
            write_file(
                &invocation.expected_output,
                &format!("EVENT\tCOORD\n{}_{step}\tchr1:100-200\n", invocation.species),
            );
        }
        Ok(())
    }

    /// Concatenate the inputs, keeping the first copy of each repeated line
    fn merge_tables(
        &self,
        inputs: &[Utf8PathBuf],
        _params: &MergeParams,
        output: &Utf8Path,
    ) -> CombineResult<()> {
        self.record("MERGE")?;
        self.merged_inputs.borrow_mut().extend(inputs.iter().cloned());

        let mut seen = HashSet::new();
        let mut merged = String::new();
        for input in inputs {
            let content = std::fs::read_to_string(input).unwrap();
            for line in content.lines() {
                if seen.insert(line.to_string()) {
                    merged.push_str(line);
                    merged.push('\n');
                }
            }
        }
        write_file(output, &merged);
        Ok(())
    }

    fn liftover(
        &self,
        input: &Utf8Path,
        dictionary: &Utf8Path,
        output: &Utf8Path,
    ) -> CombineResult<()> {
        self.record(LIFTOVER_STEP)?;
        self.liftover_calls
            .borrow_mut()
            .push((input.to_path_buf(), dictionary.to_path_buf()));

        let mut content = std::fs::read_to_string(input).unwrap();
        let dict = std::fs::read_to_string(dictionary).unwrap();
        for line in dict.lines() {
            if let Some((from, to)) = line.split_once('\t') {
                content = content.replace(from, to);
            }
        }
        write_file(output, &content);
        Ok(())
    }

    fn merge_expression(&self, params: &ExpressionParams) -> CombineResult<()> {
        self.record("EXPRESSION")?;

        let sample_dir = params.output_dir.join(SAMPLE_DIRNAME);
        let count = std::fs::read_dir(&sample_dir)
            .unwrap()
            .filter(|x| {
                x.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(EXPRESSION_SAMPLE_SUFFIX)
            })
            .count();

        let species = params.species.as_str();
        let mut names = vec![expression_filename(species, count)];
        if params.include_counts {
            names.push(expression_with_counts_filename(species, count));
        }
        if params.normalize {
            names.push(normalized_expression_filename(species, count));
        }
        for name in names {
            write_file(&params.output_dir.join(name), "ID\tS1\nG1\t1.0\n");
        }
        Ok(())
    }
}

//! External collaborator programs used by the combine run
//!
//! All quantification and table transforms are run by collaborator programs. The run only
//! decides what to invoke and checks that the expected artifacts appear.
//!

use std::fs::File;
use std::io::{self, Write};
use std::process::{ChildStdin, Command, ExitStatus, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use log::{debug, warn};

use crate::errors::{CombineError, CombineResult};
use crate::filenames::merge_tmp_path;
use crate::pipeline_selection::Invocation;

/// Step labels for collaborators that are not quantification sub-pipelines
pub const MERGE_STEP: &str = "FULL_MERGE";
pub const LIFTOVER_STEP: &str = "LIFTOVER";
pub const EXPRESSION_STEP: &str = "EXPRESSION_MERGE";

/// Parameters shared with the final table merge
#[derive(Clone, Debug)]
pub struct MergeParams {
    pub species: String,
    pub db_dir: Utf8PathBuf,
    pub token_length: u32,
    pub verbose: bool,
}

#[derive(Clone, Debug)]
pub struct ExpressionParams {
    pub species: String,
    pub db_dir: Utf8PathBuf,

    /// The expression artifacts are written directly into this directory
    pub output_dir: Utf8PathBuf,

    pub include_counts: bool,
    pub normalize: bool,
    pub install_normalization_dependency: bool,
}

/// Collaborator operations used by the combine run
///
/// Every operation is synchronous. An error always describes the failed step.
///
pub trait Toolkit {
    /// Run one quantification sub-pipeline, writing its result table
    fn run_sub_pipeline(&self, invocation: &Invocation) -> CombineResult<()>;

    /// Merge the ordered input tables into one de-duplicated, column-aligned table at `output`
    fn merge_tables(
        &self,
        inputs: &[Utf8PathBuf],
        params: &MergeParams,
        output: &Utf8Path,
    ) -> CombineResult<()>;

    /// Translate the coordinates of `input` with `dictionary`, writing the result to `output`
    fn liftover(
        &self,
        input: &Utf8Path,
        dictionary: &Utf8Path,
        output: &Utf8Path,
    ) -> CombineResult<()>;

    /// Aggregate the per-sample expression files into the expression tables
    fn merge_expression(&self, params: &ExpressionParams) -> CombineResult<()>;
}

/// Runs the collaborator programs found in one directory as child processes
pub struct ProcessToolkit {
    bin_dir: Utf8PathBuf,
}

fn describe_command(program: &Utf8Path, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .join(" ")
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn spawn_failure(step: &str, command: String, err: io::Error) -> CombineError {
    CombineError::SubPipelineFailure {
        step: step.to_string(),
        command,
        status: format!("failed to start: {err}"),
    }
}

fn check_status(step: &str, command: String, status: ExitStatus) -> CombineResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(CombineError::SubPipelineFailure {
            step: step.to_string(),
            command,
            status: describe_status(status),
        })
    }
}

impl ProcessToolkit {
    pub fn new(bin_dir: &Utf8Path) -> Self {
        Self {
            bin_dir: bin_dir.to_path_buf(),
        }
    }

    fn program_path(&self, program: &str) -> Utf8PathBuf {
        self.bin_dir.join(program)
    }

    /// Run a program to completion in `work_dir`
    fn run_program(
        &self,
        step: &str,
        program: &str,
        args: &[String],
        work_dir: Option<&Utf8Path>,
    ) -> CombineResult<()> {
        let program = self.program_path(program);
        let command_line = describe_command(&program, args);
        debug!("Running command: {command_line}");

        let mut command = Command::new(&program);
        command.args(args);
        if let Some(work_dir) = work_dir {
            command.current_dir(work_dir);
        }
        let status = command
            .status()
            .map_err(|e| spawn_failure(step, command_line.clone(), e))?;
        check_status(step, command_line, status)
    }

    /// Run the merge program with the input tables on stdin and stdout written to `staged_output`
    fn run_merge(
        &self,
        program: &Utf8Path,
        args: &[String],
        command_line: &str,
        inputs: &[Utf8PathBuf],
        staged_output: &Utf8Path,
    ) -> CombineResult<()> {
        let output_file = File::create(staged_output).map_err(|e| {
            CombineError::io(
                format!("Unable to create merged table file: '{staged_output}'"),
                e,
            )
        })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(output_file))
            .spawn()
            .map_err(|e| spawn_failure(MERGE_STEP, command_line.to_string(), e))?;

        let stream_result = match child.stdin.take() {
            Some(mut stdin) => stream_tables(inputs, &mut stdin),
            None => Ok(()),
        };

        // stdin is closed by now, so the child can finish
        let status = child
            .wait()
            .map_err(|e| spawn_failure(MERGE_STEP, command_line.to_string(), e))?;

        // A program exiting early breaks the pipe, so its exit status is reported first
        check_status(MERGE_STEP, command_line.to_string(), status)?;
        stream_result
    }
}

fn stream_tables(inputs: &[Utf8PathBuf], stdin: &mut ChildStdin) -> CombineResult<()> {
    for input in inputs {
        File::open(input)
            .and_then(|mut f| io::copy(&mut f, &mut *stdin))
            .map_err(|e| {
                CombineError::io(format!("Unable to stream table '{input}' to merge step"), e)
            })?;
    }
    stdin
        .flush()
        .map_err(|e| CombineError::io("Unable to flush tables to merge step", e))
}

impl Toolkit for ProcessToolkit {
    fn run_sub_pipeline(&self, invocation: &Invocation) -> CombineResult<()> {
        self.run_program(
            &invocation.step.to_string(),
            invocation.program_name(),
            &invocation.arguments(),
            Some(invocation.work_dir.as_path()),
        )
    }

    /// The input tables are streamed in order to the merge program's stdin. Its stdout is staged
    /// next to `output` and only renamed to `output` after the program succeeds.
    fn merge_tables(
        &self,
        inputs: &[Utf8PathBuf],
        params: &MergeParams,
        output: &Utf8Path,
    ) -> CombineResult<()> {
        let program = self.program_path("Add_to_FULL.pl");
        let args = vec![
            format!("-sp={}", params.species),
            format!("-dbDir={}", params.db_dir),
            format!("-len={}", params.token_length),
            format!("-verbose={}", u8::from(params.verbose)),
        ];
        let command_line = format!(
            "cat {} | {} > {output}",
            inputs.iter().join(" "),
            describe_command(&program, &args)
        );
        debug!("Running command: {command_line}");

        let staged_output = merge_tmp_path(output);
        let result = self
            .run_merge(&program, &args, &command_line, inputs, &staged_output)
            .and_then(|_| {
                std::fs::rename(&staged_output, output).map_err(|e| {
                    CombineError::io(
                        format!("Unable to move merged table '{staged_output}' to '{output}'"),
                        e,
                    )
                })
            });

        if result.is_err()
            && staged_output.exists()
            && let Err(e) = std::fs::remove_file(&staged_output)
        {
            warn!("Unable to remove staged merge output '{staged_output}': {e}");
        }
        result
    }

    fn liftover(
        &self,
        input: &Utf8Path,
        dictionary: &Utf8Path,
        output: &Utf8Path,
    ) -> CombineResult<()> {
        let args = vec![
            "-mode".to_string(),
            "translate".to_string(),
            "-i".to_string(),
            input.to_string(),
            "-d".to_string(),
            dictionary.to_string(),
            "-o".to_string(),
            output.to_string(),
        ];
        self.run_program(LIFTOVER_STEP, "LiftOver_table.pl", &args, None)
    }

    fn merge_expression(&self, params: &ExpressionParams) -> CombineResult<()> {
        let mut args = vec![
            format!("-sp={}", params.species),
            format!("-dbDir={}", params.db_dir),
        ];
        if params.include_counts {
            args.push("-counts".to_string());
        }
        if params.normalize {
            args.push("-norm".to_string());
        }
        if params.install_normalization_dependency {
            args.push("-install_limma".to_string());
        }
        self.run_program(
            EXPRESSION_STEP,
            "MergeOutputs.pl",
            &args,
            Some(params.output_dir.as_path()),
        )
    }
}

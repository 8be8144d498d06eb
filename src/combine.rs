//! Top-level combine run
//!

use camino::Utf8PathBuf;
use log::info;

use crate::compress::compress_outputs;
use crate::errors::CombineResult;
use crate::expression::{ExpressionOutcome, combine_expression};
use crate::invoker::invoke_pipelines;
use crate::liftover::apply_liftover;
use crate::os_utils::create_dir_all;
use crate::pipeline_selection::{
    IntronRetentionStatus, PipelineStep, SelectionPlan, SplicingSkipReason, select_pipelines,
};
use crate::run_config::RunConfig;
use crate::sample_discovery::{SampleCounts, discover_sample_counts};
use crate::table_assembler::assemble_final_table;
use crate::toolkit::Toolkit;

/// Summary of a completed combine run
#[derive(Debug)]
pub struct CombineReport {
    pub counts: SampleCounts,
    pub plan: SelectionPlan,
    pub completed_steps: Vec<PipelineStep>,

    /// Final table path, after any compression
    pub final_table: Option<Utf8PathBuf>,

    pub liftover_applied: bool,
    pub expression: ExpressionOutcome,

    /// Expression tables, after any compression
    pub expression_tables: Vec<Utf8PathBuf>,
}

impl CombineReport {
    /// True when the run found nothing to combine in either branch
    ///
    /// This is a normal state while samples are still accumulating.
    ///
    pub fn no_input_found(&self) -> bool {
        self.final_table.is_none() && self.expression_tables.is_empty()
    }

    pub fn outputs(&self) -> Vec<Utf8PathBuf> {
        self.final_table
            .iter()
            .chain(self.expression_tables.iter())
            .cloned()
            .collect()
    }
}

fn log_selection(plan: &SelectionPlan) {
    match plan.skip_reason {
        Some(SplicingSkipReason::ExpressionOnly) => {
            info!("Expression-only mode, skipping all splicing sub-pipelines");
        }
        Some(SplicingSkipReason::NoExonSkippingSamples) => {
            info!("No exon-skipping family sample files found, skipping all splicing sub-pipelines");
        }
        Some(SplicingSkipReason::NoIntronRetention) => {
            info!("Intron-retention-only mode without intron retention input, skipping all splicing sub-pipelines");
        }
        None => {}
    }

    match plan.ir_status {
        IntronRetentionStatus::NoSampleFiles => {
            info!("No intron-retention sample files found for the selected version, intron retention will not be combined");
        }
        IntronRetentionStatus::SkippedByUser => {
            info!("Intron retention skipped by request");
        }
        IntronRetentionStatus::Enabled | IntronRetentionStatus::ExcludedByMode => {}
    }

    if plan.runs_splicing() {
        info!(
            "Selected sub-pipelines ({:?} mode): {}",
            plan.mode,
            plan.steps()
                .iter()
                .map(|x| x.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

/// Run all combine steps for one output directory
///
/// Any fatal error stops the run immediately, and no final table is reported.
///
pub fn run_combine(config: &RunConfig, toolkit: &dyn Toolkit) -> CombineResult<CombineReport> {
    let counts = discover_sample_counts(config)?;
    let plan = select_pipelines(config, &counts);
    log_selection(&plan);

    if plan.runs_splicing() {
        create_dir_all(&config.results_dir(), "per-pipeline results")?;
    }

    let completed_steps = invoke_pipelines(&plan, toolkit)?;

    let mut final_table = assemble_final_table(config, &counts, &plan, toolkit)?;
    let liftover_applied = match &final_table {
        Some(x) => apply_liftover(config, x, toolkit)?,
        None => false,
    };

    let expression = combine_expression(config, toolkit)?;
    let mut expression_tables = expression.artifacts().to_vec();

    if config.flags.compress {
        if let Some(x) = final_table.take() {
            final_table = compress_outputs(&[x])?.pop();
        }
        expression_tables = compress_outputs(&expression_tables)?;
    }

    let report = CombineReport {
        counts,
        plan,
        completed_steps,
        final_table,
        liftover_applied,
        expression,
        expression_tables,
    };

    if report.no_input_found() {
        info!("No input found to combine in '{}'", config.output_dir);
    } else if let Some(x) = &report.final_table {
        info!("Final table written to: '{x}'");
    }

    Ok(report)
}

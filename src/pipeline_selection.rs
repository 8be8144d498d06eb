//! Decide which quantification sub-pipelines run, and in which order
//!

use camino::Utf8PathBuf;
use strum::IntoEnumIterator;

use crate::cli::defaults::TOKEN_LENGTH;
use crate::filenames::{coverage_key_filename, pipeline_table_filename};
use crate::run_config::{IrVersion, RunConfig, RunFlags};
use crate::sample_discovery::SampleCounts;

/// Sub-pipeline invocation steps
///
/// Declaration order is the invocation order.
///
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum::Display, strum::EnumIter,
)]
pub enum PipelineStep {
    /// Splice-site-based quantification
    #[strum(to_string = "COMBI")]
    SpliceSiteBased,

    /// Transcript-based quantification, simple events
    #[strum(to_string = "EXSK")]
    TranscriptSimple,

    /// Transcript-based quantification, complex events
    #[strum(to_string = "MULTI")]
    TranscriptComplex,

    #[strum(to_string = "MIC")]
    Microexon,

    /// Annotation-based quantification
    #[strum(to_string = "ANNOT")]
    Annotation,

    #[strum(to_string = "IR_COVERAGE_KEY")]
    IntronRetentionCoverageKey,

    #[strum(to_string = "IR")]
    IntronRetentionTable,

    #[strum(to_string = "ALT5")]
    Alt5,

    #[strum(to_string = "ALT3")]
    Alt3,
}

impl PipelineStep {
    /// The result table written by this step, if it feeds the final merge directly
    pub fn result_table(&self) -> Option<ResultTable> {
        use PipelineStep::*;
        match self {
            SpliceSiteBased => Some(ResultTable::Combi),
            TranscriptSimple => Some(ResultTable::Exsk),
            TranscriptComplex => Some(ResultTable::Multi),
            Microexon => Some(ResultTable::Mic),
            Annotation => Some(ResultTable::Annot),
            IntronRetentionCoverageKey => None,
            IntronRetentionTable => Some(ResultTable::Ir),
            Alt5 => Some(ResultTable::Alt5),
            Alt3 => Some(ResultTable::Alt3),
        }
    }

    fn is_intron_retention(&self) -> bool {
        matches!(
            self,
            Self::IntronRetentionCoverageKey | Self::IntronRetentionTable
        )
    }

    /// Collaborator program run by this step
    pub fn program_name(&self, ir_version: IrVersion) -> &'static str {
        use PipelineStep::*;
        match self {
            SpliceSiteBased => "Add_to_COMBI.pl",
            TranscriptSimple => "Add_to_EXSK.pl",
            TranscriptComplex => "Add_to_MULTI.pl",
            Microexon => "Add_to_MIC.pl",
            Annotation => "Add_to_ANNOT.pl",
            IntronRetentionCoverageKey => match ir_version {
                IrVersion::V1 => "RI_MakeCoverageKey.pl",
                IrVersion::V2 => "RI_MakeCoverageKey_v2.pl",
            },
            IntronRetentionTable => "RI_MakeTablesFromByCount.pl",
            Alt5 => "Add_to_ALT5.pl",
            Alt3 => "Add_to_ALT3.pl",
        }
    }
}

/// Per-pipeline result tables that may take part in the final merge
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ResultTable {
    Exsk,
    Multi,
    Combi,
    Mic,
    Alt3,
    Alt5,
    Annot,
    Ir,
}

impl ResultTable {
    /// Intron-retention tables are not normalized for the merge, all others are
    pub fn is_normalized(&self) -> bool {
        *self != Self::Ir
    }

    pub fn filename(&self, species: &str, counts: &SampleCounts) -> String {
        let count = match self {
            Self::Ir => counts.intron_retention,
            _ => counts.exon_skipping,
        };
        pipeline_table_filename(&self.to_string(), species, count, self.is_normalized())
    }
}

/// Run mode after applying the precedence among the exclusive mode flags
///
/// Precedence, strongest first: expression-only, intron-retention-only, exon-skipping-only.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunMode {
    ExpressionOnly,
    IntronRetentionOnly,
    ExonSkippingOnly,
    General,
}

impl RunMode {
    pub fn from_flags(flags: &RunFlags) -> Self {
        if flags.only_expression {
            Self::ExpressionOnly
        } else if flags.only_intron_retention {
            Self::IntronRetentionOnly
        } else if flags.only_exon_skipping {
            Self::ExonSkippingOnly
        } else {
            Self::General
        }
    }
}

/// Intron-retention participation in this run
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IntronRetentionStatus {
    Enabled,

    /// The run mode excludes intron retention
    ExcludedByMode,

    SkippedByUser,

    /// No intron-retention family files exist for the selected version
    NoSampleFiles,
}

/// Why the splicing branch runs nothing
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SplicingSkipReason {
    ExpressionOnly,
    NoExonSkippingSamples,
    NoIntronRetention,
}

/// One sub-pipeline invocation with its fixed parameter template filled in
#[derive(Clone, Debug)]
pub struct Invocation {
    pub step: PipelineStep,
    pub species: String,
    pub db_dir: Utf8PathBuf,
    pub token_length: u32,
    pub verbose: bool,

    /// Extra exon-exon junction setting, given to the splice-site-based and annotation steps
    pub extra_eej: Option<u32>,

    /// Splice-site-based step only
    pub use_all_exclusion_junctions: bool,

    pub ir_version: IrVersion,

    /// Output directory of the run, holding the sample and result directories
    pub work_dir: Utf8PathBuf,

    /// Artifact the step must leave behind on success
    pub expected_output: Utf8PathBuf,
}

impl Invocation {
    fn new(config: &RunConfig, counts: &SampleCounts, step: PipelineStep) -> Self {
        use PipelineStep::*;
        let species = config.species.as_str();
        let extra_eej = match step {
            SpliceSiteBased | Annotation => Some(config.extra_eej),
            _ => None,
        };
        let expected_output = config.results_dir().join(match step.result_table() {
            Some(table) => table.filename(species, counts),
            None => coverage_key_filename(species, counts.intron_retention),
        });

        Self {
            step,
            species: species.to_string(),
            db_dir: config.db_dir.clone(),
            token_length: TOKEN_LENGTH,
            verbose: config.verbose,
            extra_eej,
            use_all_exclusion_junctions: step == SpliceSiteBased
                && config.flags.use_all_exclusion_junctions,
            ir_version: config.ir_version,
            work_dir: config.output_dir.clone(),
            expected_output,
        }
    }

    pub fn program_name(&self) -> &'static str {
        self.step.program_name(self.ir_version)
    }

    /// Collaborator command-line arguments
    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            format!("-sp={}", self.species),
            format!("-dbDir={}", self.db_dir),
            format!("-len={}", self.token_length),
            format!("-verbose={}", u8::from(self.verbose)),
        ];
        if let Some(extra_eej) = self.extra_eej {
            args.push(format!("-extra_eej={extra_eej}"));
        }
        if self.use_all_exclusion_junctions {
            args.push("-ec".to_string());
        }
        if self.step.is_intron_retention() {
            args.push(format!("-IR_version={}", self.ir_version.as_int()));
        }
        args
    }

    /// Full command line for logs and error messages
    pub fn describe(&self) -> String {
        std::iter::once(self.program_name().to_string())
            .chain(self.arguments())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of the pipeline selection
#[derive(Clone, Debug)]
pub struct SelectionPlan {
    pub mode: RunMode,
    pub ir_status: IntronRetentionStatus,
    pub skip_reason: Option<SplicingSkipReason>,

    /// Ordered invocations, empty when the splicing branch runs nothing
    pub invocations: Vec<Invocation>,
}

impl SelectionPlan {
    pub fn steps(&self) -> Vec<PipelineStep> {
        self.invocations.iter().map(|x| x.step).collect()
    }

    pub fn runs_splicing(&self) -> bool {
        !self.invocations.is_empty()
    }

    pub fn intron_retention_ran(&self) -> bool {
        self.invocations
            .iter()
            .any(|x| x.step == PipelineStep::IntronRetentionTable)
    }
}

fn get_intron_retention_status(
    mode: RunMode,
    flags: &RunFlags,
    counts: &SampleCounts,
) -> IntronRetentionStatus {
    use IntronRetentionStatus::*;
    match mode {
        RunMode::ExpressionOnly | RunMode::ExonSkippingOnly => ExcludedByMode,
        RunMode::IntronRetentionOnly | RunMode::General => {
            if flags.skip_intron_retention {
                SkippedByUser
            } else if counts.intron_retention == 0 {
                NoSampleFiles
            } else {
                Enabled
            }
        }
    }
}

/// Test if a step is selected in the given mode, ignoring sample availability
fn is_step_selected(
    step: PipelineStep,
    mode: RunMode,
    flags: &RunFlags,
    ir_status: IntronRetentionStatus,
) -> bool {
    use PipelineStep::*;
    let ir_enabled = ir_status == IntronRetentionStatus::Enabled;
    match mode {
        RunMode::ExpressionOnly => false,
        RunMode::IntronRetentionOnly => step.is_intron_retention() && ir_enabled,
        RunMode::ExonSkippingOnly => match step {
            SpliceSiteBased | TranscriptSimple | TranscriptComplex | Microexon => true,
            Annotation => !flags.skip_annotation,
            IntronRetentionCoverageKey | IntronRetentionTable | Alt5 | Alt3 => false,
        },
        RunMode::General => match step {
            SpliceSiteBased
            | TranscriptSimple
            | TranscriptComplex
            | Microexon
            | Alt5
            | Alt3 => true,
            Annotation => !flags.skip_annotation,
            IntronRetentionCoverageKey | IntronRetentionTable => ir_enabled,
        },
    }
}

/// Map the run configuration and sample counts to the ordered sub-pipeline invocations
///
pub fn select_pipelines(config: &RunConfig, counts: &SampleCounts) -> SelectionPlan {
    let flags = &config.flags;
    let mode = RunMode::from_flags(flags);
    let ir_status = get_intron_retention_status(mode, flags, counts);

    let skip_reason = match mode {
        RunMode::ExpressionOnly => Some(SplicingSkipReason::ExpressionOnly),
        RunMode::IntronRetentionOnly => {
            if ir_status == IntronRetentionStatus::Enabled {
                None
            } else {
                Some(SplicingSkipReason::NoIntronRetention)
            }
        }
        RunMode::ExonSkippingOnly | RunMode::General => {
            if counts.exon_skipping == 0 {
                Some(SplicingSkipReason::NoExonSkippingSamples)
            } else {
                None
            }
        }
    };

    let invocations = if skip_reason.is_some() {
        Vec::new()
    } else {
        PipelineStep::iter()
            .filter(|step| is_step_selected(*step, mode, flags, ir_status))
            .map(|step| Invocation::new(config, counts, step))
            .collect()
    };

    SelectionPlan {
        mode,
        ir_status,
        skip_reason,
        invocations,
    }
}

//! Select and order the per-pipeline tables for the final merge
//!

use camino::Utf8PathBuf;
use log::info;

use crate::cli::defaults::TOKEN_LENGTH;
use crate::errors::{CombineError, CombineResult};
use crate::filenames::final_table_filename;
use crate::pipeline_selection::{ResultTable, RunMode, SelectionPlan};
use crate::run_config::{RunConfig, RunFlags};
use crate::sample_discovery::SampleCounts;
use crate::toolkit::{MERGE_STEP, MergeParams, Toolkit};

/// Ordered merge inputs for the given run mode
///
/// `intron_retention_ran` must reflect whether the intron-retention table was actually built
/// in this run.
///
pub fn get_merge_input_tables(
    mode: RunMode,
    flags: &RunFlags,
    intron_retention_ran: bool,
) -> Vec<ResultTable> {
    use ResultTable::*;
    let mut tables = Vec::new();
    match mode {
        RunMode::ExpressionOnly => {}
        RunMode::IntronRetentionOnly => {
            if intron_retention_ran {
                tables.push(Ir);
            }
        }
        RunMode::ExonSkippingOnly => {
            tables.extend([Exsk, Multi, Combi, Mic]);
            if !flags.skip_annotation {
                tables.push(Annot);
            }
        }
        RunMode::General => {
            tables.extend([Exsk, Multi, Combi, Mic, Alt3, Alt5]);
            if !flags.skip_annotation {
                tables.push(Annot);
            }
            if intron_retention_ran {
                tables.push(Ir);
            }
        }
    }
    tables
}

/// Merge the per-pipeline tables of this run into the final table
///
/// Returns the final table path, or None if the splicing branch ran nothing.
///
pub fn assemble_final_table(
    config: &RunConfig,
    counts: &SampleCounts,
    plan: &SelectionPlan,
    toolkit: &dyn Toolkit,
) -> CombineResult<Option<Utf8PathBuf>> {
    if !plan.runs_splicing() {
        return Ok(None);
    }

    let species = config.species.as_str();
    let tables = get_merge_input_tables(plan.mode, &config.flags, plan.intron_retention_ran());
    let results_dir = config.results_dir();

    let mut inputs = Vec::with_capacity(tables.len());
    for table in tables.iter() {
        let path = results_dir.join(table.filename(species, counts));
        if !path.is_file() {
            return Err(CombineError::MissingExpectedArtifact {
                step: table.to_string(),
                path,
            });
        }
        inputs.push(path);
    }

    let final_table = config.output_dir.join(final_table_filename(
        species,
        counts.exon_skipping,
        &config.assembly_suffix(),
    ));

    info!(
        "Merging {} tables ({}) into final table: '{final_table}'",
        tables.len(),
        tables
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let params = MergeParams {
        species: species.to_string(),
        db_dir: config.db_dir.clone(),
        token_length: TOKEN_LENGTH,
        verbose: config.verbose,
    };
    toolkit.merge_tables(&inputs, &params, &final_table)?;

    if !final_table.is_file() {
        return Err(CombineError::MissingExpectedArtifact {
            step: MERGE_STEP.to_string(),
            path: final_table,
        });
    }
    Ok(Some(final_table))
}

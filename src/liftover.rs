//! Translate the final table to a non-native genome assembly
//!

use camino::Utf8Path;
use log::info;

use crate::errors::{CombineError, CombineResult};
use crate::filenames::{liftover_dictionary_path, liftover_tmp_path};
use crate::run_config::{Assembly, RunConfig};
use crate::toolkit::{LIFTOVER_STEP, Toolkit};

/// Translate the coordinates of the final table in place, if a non-native assembly was requested
///
/// The translated table is staged at a temporary path and then renamed over the original, so
/// the final table path never holds a partially translated table.
///
/// Returns true if the table was translated.
///
pub fn apply_liftover(
    config: &RunConfig,
    final_table: &Utf8Path,
    toolkit: &dyn Toolkit,
) -> CombineResult<bool> {
    let (native, target) = match config.assembly {
        Assembly::Lifted { native, target } => (native, target),
        Assembly::Unspecified | Assembly::Native(_) => return Ok(false),
    };

    let dictionary =
        liftover_dictionary_path(&config.db_dir, config.species.as_str(), native, target);
    if !dictionary.is_file() {
        return Err(CombineError::MissingLiftoverDictionary(dictionary));
    }

    info!("Translating final table from {native} to {target} with dictionary '{dictionary}'");

    let tmp_table = liftover_tmp_path(final_table);
    toolkit.liftover(final_table, &dictionary, &tmp_table)?;
    if !tmp_table.is_file() {
        return Err(CombineError::MissingExpectedArtifact {
            step: LIFTOVER_STEP.to_string(),
            path: tmp_table,
        });
    }

    std::fs::rename(&tmp_table, final_table).map_err(|e| {
        CombineError::io(
            format!("Unable to replace final table '{final_table}' with translated table '{tmp_table}'"),
            e,
        )
    })?;

    Ok(true)
}

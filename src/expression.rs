//! Combine per-sample expression quantification files
//!
//! This branch is independent of the splicing pipelines.
//!

use camino::Utf8PathBuf;
use log::info;

use crate::errors::{CombineError, CombineResult};
use crate::filenames::{
    expression_filename, expression_with_counts_filename, normalized_expression_filename,
};
use crate::run_config::RunConfig;
use crate::sample_discovery::count_expression_samples;
use crate::toolkit::{EXPRESSION_STEP, ExpressionParams, Toolkit};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpressionOutcome {
    SkippedByUser,

    /// No expression sample files found
    NoSamples,

    Combined {
        sample_count: usize,
        artifacts: Vec<Utf8PathBuf>,
    },
}

impl ExpressionOutcome {
    pub fn artifacts(&self) -> &[Utf8PathBuf] {
        match self {
            Self::Combined { artifacts, .. } => artifacts.as_slice(),
            _ => &[],
        }
    }
}

/// Expression tables expected from the expression merge
fn get_expected_artifacts(config: &RunConfig, sample_count: usize) -> Vec<Utf8PathBuf> {
    let species = config.species.as_str();
    let flags = &config.flags;
    let mut names = vec![expression_filename(species, sample_count)];
    if flags.counts_in_expression {
        names.push(expression_with_counts_filename(species, sample_count));
    }
    if flags.normalize_expression {
        names.push(normalized_expression_filename(species, sample_count));
    }
    names
        .into_iter()
        .map(|x| config.output_dir.join(x))
        .collect()
}

pub fn combine_expression(
    config: &RunConfig,
    toolkit: &dyn Toolkit,
) -> CombineResult<ExpressionOutcome> {
    let flags = &config.flags;
    if flags.skip_expression {
        info!("Skipping expression table combination");
        return Ok(ExpressionOutcome::SkippedByUser);
    }

    let sample_count = count_expression_samples(config)?;
    if sample_count == 0 {
        info!("No expression sample files found, no expression tables written");
        return Ok(ExpressionOutcome::NoSamples);
    }

    let params = ExpressionParams {
        species: config.species.as_str().to_string(),
        db_dir: config.db_dir.clone(),
        output_dir: config.output_dir.clone(),
        include_counts: flags.counts_in_expression,
        normalize: flags.normalize_expression,
        install_normalization_dependency: flags.install_normalization_dependency,
    };

    info!("Combining expression tables for {sample_count} samples");
    toolkit.merge_expression(&params)?;

    let artifacts = get_expected_artifacts(config, sample_count);
    for artifact in artifacts.iter() {
        if !artifact.is_file() {
            return Err(CombineError::MissingExpectedArtifact {
                step: EXPRESSION_STEP.to_string(),
                path: artifact.clone(),
            });
        }
    }

    Ok(ExpressionOutcome::Combined {
        sample_count,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_config::RunFlags;
    use crate::test_utils::{FakeToolkit, SampleFixture, TestRun};

    fn expression_run(count: usize) -> TestRun {
        TestRun::new(
            "Hsa",
            SampleFixture {
                expression: count,
                ..Default::default()
            },
        )
    }

    fn names(outcome: &ExpressionOutcome) -> Vec<String> {
        outcome
            .artifacts()
            .iter()
            .map(|x| x.file_name().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_plain_expression_table() {
        let run = expression_run(4);
        let config = run.config(RunFlags::default(), None, 1);
        let toolkit = FakeToolkit::default();
        let outcome = combine_expression(&config, &toolkit).unwrap();
        assert_eq!(names(&outcome), vec!["cRPKM-Hsa4.tab"]);
        assert!(matches!(
            outcome,
            ExpressionOutcome::Combined {
                sample_count: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_counts_and_normalized_tables() {
        let run = expression_run(2);
        let flags = RunFlags {
            counts_in_expression: true,
            normalize_expression: true,
            ..Default::default()
        };
        let config = run.config(flags, None, 1);
        let toolkit = FakeToolkit::default();
        let outcome = combine_expression(&config, &toolkit).unwrap();
        assert_eq!(
            names(&outcome),
            vec![
                "cRPKM-Hsa2.tab",
                "cRPKM_AND_COUNTS-Hsa2.tab",
                "cRPKM-Hsa2-NORM.tab"
            ]
        );
    }

    #[test]
    fn test_skip_expression() {
        let run = expression_run(3);
        let flags = RunFlags {
            skip_expression: true,
            ..Default::default()
        };
        let config = run.config(flags, None, 1);
        let toolkit = FakeToolkit::default();
        assert_eq!(
            combine_expression(&config, &toolkit).unwrap(),
            ExpressionOutcome::SkippedByUser
        );
        assert!(toolkit.calls().is_empty());
    }

    #[test]
    fn test_no_expression_samples() {
        let run = expression_run(0);
        let config = run.config(RunFlags::default(), None, 1);
        let toolkit = FakeToolkit::default();
        assert_eq!(
            combine_expression(&config, &toolkit).unwrap(),
            ExpressionOutcome::NoSamples
        );
        assert!(toolkit.calls().is_empty());
    }
}

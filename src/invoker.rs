use hhmmss::Hhmmss;
use log::{error, info};

use crate::errors::CombineResult;
use crate::pipeline_selection::{PipelineStep, SelectionPlan};
use crate::toolkit::Toolkit;

/// Run every selected sub-pipeline in plan order
///
/// Each step must succeed before the next one starts. The first failure aborts the remaining
/// steps, leaving the result tables of completed steps in place.
///
/// Returns the completed steps.
///
pub fn invoke_pipelines(
    plan: &SelectionPlan,
    toolkit: &dyn Toolkit,
) -> CombineResult<Vec<PipelineStep>> {
    let step_count = plan.invocations.len();
    let mut completed = Vec::with_capacity(step_count);
    for (step_index, invocation) in plan.invocations.iter().enumerate() {
        info!(
            "Running sub-pipeline {} ({}/{step_count}): {}",
            invocation.step,
            step_index + 1,
            invocation.describe()
        );
        let start = std::time::Instant::now();
        if let Err(err) = toolkit.run_sub_pipeline(invocation) {
            error!("Sub-pipeline {} failed, aborting run", invocation.step);
            return Err(err);
        }
        info!(
            "Finished sub-pipeline {}. Runtime: {}",
            invocation.step,
            start.elapsed().hhmmssxxx()
        );
        completed.push(invocation.step);
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CombineError;
    use crate::pipeline_selection::select_pipelines;
    use crate::run_config::RunFlags;
    use crate::sample_discovery::SampleCounts;
    use crate::test_utils::{FakeToolkit, TestRun};
    use PipelineStep::*;

    fn plan_all_steps(run: &TestRun) -> SelectionPlan {
        let config = run.config(RunFlags::default(), None, 1);
        select_pipelines(
            &config,
            &SampleCounts {
                exon_skipping: 2,
                intron_retention: 2,
            },
        )
    }

    #[test]
    fn test_invocation_order() {
        let run = TestRun::empty("Hsa");
        let plan = plan_all_steps(&run);
        let toolkit = FakeToolkit::default();
        let completed = invoke_pipelines(&plan, &toolkit).unwrap();
        assert_eq!(completed, plan.steps());
        assert_eq!(
            toolkit.calls(),
            vec![
                "COMBI",
                "EXSK",
                "MULTI",
                "MIC",
                "ANNOT",
                "IR_COVERAGE_KEY",
                "IR",
                "ALT5",
                "ALT3"
            ]
        );
    }

    #[test]
    fn test_fail_fast() {
        let run = TestRun::empty("Hsa");
        let plan = plan_all_steps(&run);
        let toolkit = FakeToolkit::failing_at("MIC");
        let err = invoke_pipelines(&plan, &toolkit).unwrap_err();
        assert!(matches!(err, CombineError::SubPipelineFailure { ref step, .. } if step == "MIC"));
        assert_eq!(toolkit.calls(), vec!["COMBI", "EXSK", "MULTI", "MIC"]);

        // Tables from completed steps are left in place
        let exsk = plan
            .invocations
            .iter()
            .find(|x| x.step == TranscriptSimple)
            .unwrap();
        assert!(exsk.expected_output.exists());
    }

    #[test]
    fn test_intron_retention_stages_must_both_succeed() {
        let run = TestRun::empty("Hsa");
        let plan = plan_all_steps(&run);
        let toolkit = FakeToolkit::failing_at("IR_COVERAGE_KEY");
        assert!(invoke_pipelines(&plan, &toolkit).is_err());
        assert!(!toolkit.calls().contains(&"IR".to_string()));
    }
}

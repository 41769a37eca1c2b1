//! Engine-level commands.

#![allow(clippy::result_large_err)]

use mrgate_core::approval_state::ApprovalSummary;
use mrgate_core::errors::ExError;
use mrgate_core::policy::BranchProtection;
use mrgate_core::wrapped_rule::EvaluationResult;
use mrgate_core_types::RequestContext;

use crate::cache::EvaluationCache;
use crate::commands::evaluate::{
    evaluate_merge_request, evaluate_rule, finalize_merge_request, FinalizeReport,
    MergeRequestInput,
};
use crate::settings::EngineSettings;

/// Commands accepted by [`apply_engine_command`].
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Evaluate a single rule of the merge request.
    EvaluateRule {
        input: MergeRequestInput,
        rule_id: u64,
    },
    /// Evaluate the aggregate approval state.
    EvaluateMergeRequest { input: MergeRequestInput },
    /// Finalise the rules of a merged merge request.
    FinalizeMergeRequest { input: MergeRequestInput },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    Rule(EvaluationResult),
    MergeRequest(ApprovalSummary),
    /// Finalised rules, to be persisted by the caller, and what changed.
    Finalized {
        input: MergeRequestInput,
        report: FinalizeReport,
    },
}

/// Apply an engine command using the licensed features from `settings`.
///
/// # Errors
///
/// Propagates the error of the underlying command handler.
pub fn apply_engine_command(
    cmd: EngineCommand,
    settings: &EngineSettings,
    branch_protection: &dyn BranchProtection,
    cache: &mut EvaluationCache,
    req: &RequestContext,
) -> Result<EngineCommandResult, ExError> {
    let features = settings.features;
    match cmd {
        EngineCommand::EvaluateRule { input, rule_id } => evaluate_rule(
            &input,
            rule_id,
            features,
            branch_protection,
            Some(cache),
            req,
        )
        .map(EngineCommandResult::Rule),
        EngineCommand::EvaluateMergeRequest { input } => {
            evaluate_merge_request(&input, features, branch_protection, req)
                .map(EngineCommandResult::MergeRequest)
        }
        EngineCommand::FinalizeMergeRequest { mut input } => {
            let report = finalize_merge_request(&mut input, features, branch_protection, req)?;
            for rule_id in report.zeroed_rule_ids.iter().chain(&report.synced_rule_ids) {
                cache.invalidate_rule(*rule_id);
            }
            Ok(EngineCommandResult::Finalized { input, report })
        }
    }
}

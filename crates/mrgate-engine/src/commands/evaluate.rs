//! Evaluation and finalisation command handlers.
//!
//! Each handler emits exactly one start event and one end (or end_error)
//! event, tagged with the caller's request correlation ids.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use mrgate_core::approval_state::{ApprovalState, ApprovalSummary};
use mrgate_core::context::EvaluationContext;
use mrgate_core::errors::{ExError, ExErrorKind, MrgateError};
use mrgate_core::features::LicensedFeatures;
use mrgate_core::finalize::{finalize, sync_approved_approvers};
use mrgate_core::model::{Approval, Comment, MergeRequestSnapshot, Rule};
use mrgate_core::policy::BranchProtection;
use mrgate_core::rules::validation;
use mrgate_core::wrapped_rule::{self, EvaluationResult};
use mrgate_core_types::RequestContext;
use serde::{Deserialize, Serialize};

use crate::cache::EvaluationCache;

/// Everything known about one merge request at evaluation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestInput {
    pub merge_request: MergeRequestSnapshot,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl MergeRequestInput {
    pub fn new(merge_request: MergeRequestSnapshot) -> Self {
        Self {
            merge_request,
            rules: Vec::new(),
            approvals: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_approvals(mut self, approvals: Vec<Approval>) -> Self {
        self.approvals = approvals;
        self
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }

    pub fn context<'a>(
        &'a self,
        features: LicensedFeatures,
        branch_protection: &'a dyn BranchProtection,
    ) -> EvaluationContext<'a> {
        EvaluationContext::new(&self.merge_request, &self.approvals, branch_protection)
            .with_comments(&self.comments)
            .with_features(features)
    }
}

/// Rules changed by [`finalize_merge_request`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeReport {
    /// Code owner rules whose requirement was set to 0
    pub zeroed_rule_ids: Vec<u64>,
    /// Rules whose materialised approvers changed
    pub synced_rule_ids: Vec<u64>,
}

fn with_request(
    err: ExError,
    op: &str,
    input: &MergeRequestInput,
    req: &RequestContext,
) -> ExError {
    let err = err
        .with_op(op)
        .with_merge_request_id(input.merge_request.id)
        .with_request_id(req.request_id.clone());
    match &req.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}

/// Evaluate one rule of a merge request
///
/// Served from `cache` when an entry exists for the rule's current
/// definition, the merge request's `state_version` and `features`. Branch
/// protection is not part of the cache key: a cache must only be shared by
/// calls that pass the same `branch_protection`.
///
/// A negative `approvals_required` evaluates as 0.
///
/// # Errors
///
/// Returns `ExErrorKind::InvalidInput` if `rule_id` is not one of the
/// merge request's rules, or a validation error kind if the rule definition
/// is invalid.
pub fn evaluate_rule(
    input: &MergeRequestInput,
    rule_id: u64,
    features: LicensedFeatures,
    branch_protection: &dyn BranchProtection,
    cache: Option<&mut EvaluationCache>,
    req: &RequestContext,
) -> Result<EvaluationResult, ExError> {
    let start = Instant::now();
    mrgate_core::log_op_start!(
        "evaluate_rule",
        rule_id = rule_id,
        merge_request_id = input.merge_request.id,
        state_version = input.merge_request.state_version,
        request_id = req.request_id.as_str()
    );

    let outcome = evaluate_rule_inner(input, rule_id, features, branch_protection, cache);

    let duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok((result, cache_hit)) => {
            mrgate_core::log_op_end!(
                "evaluate_rule",
                duration_ms = duration_ms,
                rule_id = rule_id,
                approved = result.approved,
                approvals_left = result.approvals_left,
                invalid_rule = result.invalid_rule,
                cache_hit = cache_hit
            );
            Ok(result)
        }
        Err(err) => {
            let err = with_request(err.with_rule_id(rule_id), "evaluate_rule", input, req);
            mrgate_core::log_op_error!("evaluate_rule", err.clone(), duration_ms = duration_ms);
            Err(err)
        }
    }
}

fn evaluate_rule_inner(
    input: &MergeRequestInput,
    rule_id: u64,
    features: LicensedFeatures,
    branch_protection: &dyn BranchProtection,
    cache: Option<&mut EvaluationCache>,
) -> Result<(EvaluationResult, bool), ExError> {
    let rule = input
        .rules
        .iter()
        .find(|rule| rule.id == rule_id)
        .ok_or_else(|| {
            ExError::new(ExErrorKind::InvalidInput).with_message(format!(
                "Rule {} is not defined on merge request {}",
                rule_id, input.merge_request.id
            ))
        })?;

    validation::validate_rule_for_evaluation(rule)?;

    let ctx = input.context(features, branch_protection);
    match cache {
        Some(cache) => Ok(cache.get_or_evaluate(rule, &ctx)?),
        None => Ok((wrapped_rule::evaluate(rule, &ctx), false)),
    }
}

/// Evaluate every rule of a merge request into an aggregate summary
///
/// Negative requirements evaluate as 0, and repeated definitions of one
/// policy action collapse to the first.
///
/// # Errors
///
/// Returns a validation error kind if any rule definition, or the rule set
/// as a whole, is invalid.
pub fn evaluate_merge_request(
    input: &MergeRequestInput,
    features: LicensedFeatures,
    branch_protection: &dyn BranchProtection,
    req: &RequestContext,
) -> Result<ApprovalSummary, ExError> {
    let start = Instant::now();
    mrgate_core::log_op_start!(
        "evaluate_merge_request",
        merge_request_id = input.merge_request.id,
        state_version = input.merge_request.state_version,
        rule_count = input.rules.len(),
        request_id = req.request_id.as_str()
    );

    let outcome = validation::validate_rules_for_evaluation(&input.rules).map(|()| {
        ApprovalState::new(&input.rules, input.context(features, branch_protection)).summary()
    });

    let duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(summary) => {
            mrgate_core::log_op_end!(
                "evaluate_merge_request",
                duration_ms = duration_ms,
                merge_request_id = summary.merge_request_id,
                approved = summary.approved,
                approvals_left = summary.approvals_left,
                rule_count = summary.rules.len()
            );
            Ok(summary)
        }
        Err(err) => {
            let err = with_request(err.into(), "evaluate_merge_request", input, req);
            mrgate_core::log_op_error!(
                "evaluate_merge_request",
                err.clone(),
                duration_ms = duration_ms
            );
            Err(err)
        }
    }
}

/// Freeze code owner requirements and materialise approvers of a merged
/// merge request
///
/// Rules in `input` are updated in place; the caller persists them.
///
/// # Errors
///
/// Returns `ExErrorKind::NotMerged` if the merge request is not merged.
pub fn finalize_merge_request(
    input: &mut MergeRequestInput,
    features: LicensedFeatures,
    branch_protection: &dyn BranchProtection,
    req: &RequestContext,
) -> Result<FinalizeReport, ExError> {
    let start = Instant::now();
    mrgate_core::log_op_start!(
        "finalize_merge_request",
        merge_request_id = input.merge_request.id,
        rule_count = input.rules.len(),
        request_id = req.request_id.as_str()
    );

    let outcome = finalize_inner(input, features, branch_protection);

    let duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(report) => {
            mrgate_core::log_op_end!(
                "finalize_merge_request",
                duration_ms = duration_ms,
                merge_request_id = input.merge_request.id,
                zeroed = report.zeroed_rule_ids.len(),
                synced = report.synced_rule_ids.len()
            );
            Ok(report)
        }
        Err(err) => {
            let err = with_request(err.into(), "finalize_merge_request", input, req);
            mrgate_core::log_op_error!(
                "finalize_merge_request",
                err.clone(),
                duration_ms = duration_ms
            );
            Err(err)
        }
    }
}

fn finalize_inner(
    input: &mut MergeRequestInput,
    features: LicensedFeatures,
    branch_protection: &dyn BranchProtection,
) -> Result<FinalizeReport, MrgateError> {
    let MergeRequestInput {
        merge_request,
        rules,
        approvals,
        comments,
    } = input;

    if !merge_request.is_merged() {
        return Err(MrgateError::MergeRequestNotMerged {
            merge_request_id: merge_request.id,
        });
    }

    let ctx = EvaluationContext::new(&*merge_request, approvals.as_slice(), branch_protection)
        .with_comments(comments.as_slice())
        .with_features(features);

    let mut report = FinalizeReport::default();
    for rule in rules.iter_mut() {
        if rule.is_code_owner() && finalize(rule, &ctx)? {
            report.zeroed_rule_ids.push(rule.id);
        }
        if sync_approved_approvers(rule, &ctx, true) {
            report.synced_rule_ids.push(rule.id);
        }
    }
    Ok(report)
}

//! Caller-owned memoisation of rule evaluations
//!
//! Entries are keyed by rule id, a digest of the rule definition, the merge
//! request's `state_version` and the licensed features. The caller bumps
//! `state_version` whenever approvals, comments or any other evaluation input
//! changes; editing a rule changes its digest. Branch protection is not part
//! of the key, so one cache serves one branch protection source. Stale entries are never served, but they stay in memory
//! until dropped with [`EvaluationCache::retain_version`],
//! [`EvaluationCache::invalidate_rule`] or [`EvaluationCache::clear`].

use mrgate_core::context::EvaluationContext;
use mrgate_core::errors::{MrgateError, Result};
use mrgate_core::features::LicensedFeatures;
use mrgate_core::model::Rule;
use mrgate_core::wrapped_rule::{self, EvaluationResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub rule_id: u64,
    pub rule_digest: String,
    pub state_version: u64,
    pub features: LicensedFeatures,
}

/// Hex-encoded SHA-256 of the rule's canonical JSON
///
/// # Errors
///
/// Returns `MrgateError::Serialization` if the rule cannot be serialized.
pub fn rule_digest(rule: &Rule) -> Result<String> {
    let canonical = serde_json::to_string(rule).map_err(|e| MrgateError::Serialization {
        message: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Debug, Default)]
pub struct EvaluationCache {
    entries: HashMap<CacheKey, EvaluationResult>,
    hits: u64,
    misses: u64,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `MrgateError::Serialization` if the rule cannot be digested.
    pub fn key_for(
        rule: &Rule,
        state_version: u64,
        features: LicensedFeatures,
    ) -> Result<CacheKey> {
        Ok(CacheKey {
            rule_id: rule.id,
            rule_digest: rule_digest(rule)?,
            state_version,
            features,
        })
    }

    pub fn get(&self, key: &CacheKey) -> Option<&EvaluationResult> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, result: EvaluationResult) {
        self.entries.insert(key, result);
    }

    /// Cached result for `rule`, evaluating and storing it on a miss
    ///
    /// Returns the result and whether it was served from the cache.
    ///
    /// # Errors
    ///
    /// Returns `MrgateError::Serialization` if the rule cannot be digested.
    pub fn get_or_evaluate(
        &mut self,
        rule: &Rule,
        ctx: &EvaluationContext<'_>,
    ) -> Result<(EvaluationResult, bool)> {
        let key = Self::key_for(rule, ctx.merge_request.state_version, ctx.features)?;

        if let Some(result) = self.entries.get(&key) {
            self.hits += 1;
            return Ok((result.clone(), true));
        }

        self.misses += 1;
        let result = wrapped_rule::evaluate(rule, ctx);
        self.entries.insert(key, result.clone());
        Ok((result, false))
    }

    /// Drop every entry for `rule_id`; returns how many were removed
    pub fn invalidate_rule(&mut self, rule_id: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.rule_id != rule_id);
        before - self.entries.len()
    }

    /// Keep only entries computed for `state_version`; returns how many were removed
    pub fn retain_version(&mut self, state_version: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.state_version == state_version);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

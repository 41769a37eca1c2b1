use serde::{Deserialize, Serialize};

/// Licensed feature switches consulted during evaluation
///
/// Every flag defaults to on; hosts on lower tiers turn features off
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LicensedFeatures {
    /// Approval rules are evaluated at all
    pub approval_feature_available: bool,

    /// More than one user-defined rule may apply to a merge request
    pub multiple_approval_rules: bool,

    /// Protected branches can require code owner approval
    pub code_owner_approval_required_available: bool,

    /// Scan result policies may be configured as fail-open
    pub fail_open_policy_enabled: bool,
}

impl Default for LicensedFeatures {
    fn default() -> Self {
        Self {
            approval_feature_available: true,
            multiple_approval_rules: true,
            code_owner_approval_required_available: true,
            fail_open_policy_enabled: true,
        }
    }
}

impl LicensedFeatures {
    /// Every feature switched off
    pub fn none() -> Self {
        Self {
            approval_feature_available: false,
            multiple_approval_rules: false,
            code_owner_approval_required_available: false,
            fail_open_policy_enabled: false,
        }
    }
}

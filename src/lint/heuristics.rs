use crate::config::HeuristicPolicy;
use crate::lint::finding::{Confidence, Finding, RuleKind};

/// Post-processing step that may downgrade a finding's confidence.
#[derive(Debug, Clone, Copy)]
pub struct FalsePositivePolicy {
    policy: HeuristicPolicy,
}

impl FalsePositivePolicy {
    pub fn new(policy: HeuristicPolicy) -> Self {
        Self { policy }
    }

    pub fn apply(&self, finding: &mut Finding) {
        if self.is_likely_false_positive(finding) {
            finding.confidence = Confidence::LikelyFalsePositive;
        }
    }

    /// A Pandora call that binds several names, one of them mentioning "future", is
    /// most likely keeping the poller around on purpose.
    fn is_likely_false_positive(&self, finding: &Finding) -> bool {
        match self.policy {
            HeuristicPolicy::Off => false,
            HeuristicPolicy::FutureBinding => {
                finding.rule == RuleKind::PandoraMismatch
                    && finding.targets.len() > 1
                    && finding
                        .targets
                        .iter()
                        .any(|name| name.to_lowercase().contains("future"))
            }
        }
    }
}

impl Default for FalsePositivePolicy {
    fn default() -> Self {
        Self::new(HeuristicPolicy::default())
    }
}

use crate::lint::call_site::CallSite;
use crate::lint::finding::{Finding, RuleKind};
use crate::lint::ScanError;

/// A detection rule applied to every classified call site.
///
/// Rules never see call sites with an unresolved callee. Only errors from secondary
/// package loads are returned; anything a rule cannot decide is a non-match.
pub trait LroRule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn check(&self, site: &CallSite) -> Result<Option<Finding>, ScanError>;
}

use std::sync::Arc;

use crate::analyzer::{NamedType, ProgramModel, TypeRef};
use crate::config::Track1Config;
use crate::lint::call_site::{CallShapes, CallSite};
use crate::lint::finding::{Finding, RuleKind};
use crate::lint::rules::LroRule;
use crate::lint::ScanError;

/// Reports `_, err := client.Op(...)` when the discarded first result is a track 1
/// future wrapper, i.e. a named struct whose first field is the marker type.
pub struct Track1Rule {
    model: Arc<ProgramModel>,
    shapes: CallShapes,
    marker: NamedType,
}

impl Track1Rule {
    pub fn new(model: Arc<ProgramModel>, shapes: CallShapes, config: &Track1Config) -> Self {
        Self {
            model,
            shapes,
            marker: NamedType::new(config.marker_package.clone(), config.marker_type.clone()),
        }
    }

    fn is_future_wrapper(&self, result: &TypeRef) -> bool {
        let TypeRef::Named(named) = result else {
            return false;
        };
        let Some(fields) = self.model.struct_fields(named) else {
            return false;
        };
        match fields.first().map(|field| &field.ty) {
            Some(TypeRef::Named(first)) => *first == self.marker,
            _ => false,
        }
    }
}

impl LroRule for Track1Rule {
    fn kind(&self) -> RuleKind {
        RuleKind::Track1
    }

    fn check(&self, site: &CallSite) -> Result<Option<Finding>, ScanError> {
        if !self.shapes.is_track1_shape(&site.targets) {
            return Ok(None);
        }
        let Some(first) = site.callee.results.first() else {
            return Ok(None);
        };
        if !self.is_future_wrapper(first) {
            return Ok(None);
        }
        Ok(Some(Finding::new(
            RuleKind::Track1,
            site.statement_pos.clone(),
            site.callee.qualified_name(),
        )))
    }
}

use std::sync::Arc;

use crate::config::PandoraConfig;
use crate::lint::call_site::{CallShapes, CallSite};
use crate::lint::finding::{Finding, RuleKind};
use crate::lint::inventory::InventoryCache;
use crate::lint::rules::LroRule;
use crate::lint::ScanError;

/// Reports a sync Create/Update/Delete call on a client type that also declares the
/// `...ThenPoll` sibling.
pub struct PandoraRule {
    inventory: Arc<InventoryCache>,
    shapes: CallShapes,
    sdk_package_prefixes: Vec<String>,
}

impl PandoraRule {
    pub fn new(inventory: Arc<InventoryCache>, shapes: CallShapes, config: &PandoraConfig) -> Self {
        Self {
            inventory,
            shapes,
            sdk_package_prefixes: config.sdk_package_prefixes.clone(),
        }
    }

    fn in_sdk(&self, package: &str) -> bool {
        self.sdk_package_prefixes.is_empty()
            || self
                .sdk_package_prefixes
                .iter()
                .any(|prefix| package.starts_with(prefix.as_str()))
    }
}

impl LroRule for PandoraRule {
    fn kind(&self) -> RuleKind {
        RuleKind::PandoraMismatch
    }

    fn check(&self, site: &CallSite) -> Result<Option<Finding>, ScanError> {
        if !self.shapes.is_pandora_shape(&site.selector) {
            return Ok(None);
        }
        let Some(receiver) = site.receiver() else {
            return Ok(None);
        };
        if !self.in_sdk(&receiver.named.package) {
            return Ok(None);
        }

        let inventory = self.inventory.get(&receiver.named)?;
        if !inventory.has_async_pair(&site.selector, &self.shapes) {
            return Ok(None);
        }

        let finding = Finding::new(
            RuleKind::PandoraMismatch,
            site.selector_pos.clone(),
            site.callee.qualified_name(),
        )
        .with_targets(site.target_labels());
        Ok(Some(finding))
    }
}

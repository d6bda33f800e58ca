use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analyzer::{Package, PackageSource, ProgramModel};
use crate::config::Config;
use crate::lint::call_site::CallShapes;
use crate::lint::classifier::Classifier;
use crate::lint::finding::Finding;
use crate::lint::heuristics::FalsePositivePolicy;
use crate::lint::inventory::InventoryCache;
use crate::lint::pandora::PandoraRule;
use crate::lint::rules::LroRule;
use crate::lint::track1::Track1Rule;
use crate::lint::ScanError;

/// Runs the enabled rules over a set of packages.
///
/// Findings come back grouped by package in input order and, within a package, in
/// source order, whether or not packages are scanned in parallel.
pub struct Scanner {
    model: Arc<ProgramModel>,
    inventory: Arc<InventoryCache>,
    shapes: CallShapes,
    rules: Vec<Box<dyn LroRule>>,
    policy: FalsePositivePolicy,
    include_unassigned_calls: bool,
    parallel: bool,
    max_threads: usize,
    display_root: Option<PathBuf>,
}

impl Scanner {
    /// `inventory_source` serves the secondary, single-package loads behind the method
    /// inventory; `model` serves type resolution.
    pub fn new(model: Arc<ProgramModel>, inventory_source: Arc<dyn PackageSource>, config: &Config) -> Self {
        let shapes = CallShapes::from_config(&config.rules.pandora);
        let inventory = Arc::new(InventoryCache::new(
            inventory_source,
            shapes.clone(),
            config.inventory.on_load_failure,
        ));

        let mut rules: Vec<Box<dyn LroRule>> = Vec::new();
        if config.rules.track1.enabled {
            rules.push(Box::new(Track1Rule::new(model.clone(), shapes.clone(), &config.rules.track1)));
        }
        if config.rules.pandora.enabled {
            rules.push(Box::new(PandoraRule::new(
                inventory.clone(),
                shapes.clone(),
                &config.rules.pandora,
            )));
        }

        Self {
            model,
            inventory,
            shapes,
            rules,
            policy: FalsePositivePolicy::new(config.rules.pandora.false_positive_heuristic),
            include_unassigned_calls: config.rules.pandora.include_unassigned_calls,
            parallel: config.performance.parallel,
            max_threads: config.performance.max_threads,
            display_root: None,
        }
    }

    /// Report positions relative to `root`.
    pub fn with_display_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.display_root = Some(root.into());
        self
    }

    pub fn model(&self) -> &ProgramModel {
        &self.model
    }

    pub fn inventory(&self) -> &InventoryCache {
        &self.inventory
    }

    pub fn scan(&self, packages: &[Arc<Package>]) -> Result<Vec<Finding>, ScanError> {
        let mut seen = HashSet::new();
        let unique: Vec<&Arc<Package>> = packages
            .iter()
            .filter(|package| seen.insert(package.path.as_str()))
            .collect();

        let per_package: Vec<Vec<Finding>> = if self.parallel && unique.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.max_threads)
                .build()
                .map_err(|e| ScanError::ThreadPool(e.to_string()))?;
            pool.install(|| {
                unique
                    .par_iter()
                    .map(|package| self.scan_package(package))
                    .collect::<Result<Vec<_>, _>>()
            })?
        } else {
            unique
                .iter()
                .map(|package| self.scan_package(package))
                .collect::<Result<Vec<_>, _>>()?
        };

        let findings: Vec<Finding> = per_package.into_iter().flatten().collect();
        info!(
            packages = unique.len(),
            findings = findings.len(),
            inventory_loads = self.inventory.load_count(),
            "scan complete"
        );
        Ok(findings)
    }

    pub fn scan_package(&self, package: &Package) -> Result<Vec<Finding>, ScanError> {
        let classifier = Classifier::new(&self.model, &self.shapes, self.include_unassigned_calls);

        let mut findings = Vec::new();
        for site in classifier.candidates(package) {
            for rule in &self.rules {
                let Some(mut finding) = rule.check(&site)? else {
                    continue;
                };
                self.policy.apply(&mut finding);
                if let Some(root) = &self.display_root {
                    finding.position = finding.position.relative_to(root);
                }
                findings.push(finding);
            }
        }

        debug!(package = %package.path, findings = findings.len(), "scanned package");
        Ok(findings)
    }
}

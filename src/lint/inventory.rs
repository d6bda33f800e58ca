use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::analyzer::{NamedType, Package, PackageSource};
use crate::config::LoadFailurePolicy;
use crate::lint::call_site::CallShapes;
use crate::lint::ScanError;

/// Exported sync/async method names declared on one receiver type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodInventory {
    /// `package/path.TypeName`
    pub key: String,
    pub sync_names: BTreeSet<String>,
    pub async_names: BTreeSet<String>,
}

impl MethodInventory {
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sync_names: BTreeSet::new(),
            async_names: BTreeSet::new(),
        }
    }

    /// Indexes the methods of `type_name` declared in `package`.
    pub fn build(package: &Package, type_name: &str, shapes: &CallShapes) -> Self {
        let mut inventory = Self::empty(NamedType::new(package.path.clone(), type_name).key());

        let methods = package.methods().filter(|method| {
            method
                .receiver
                .as_ref()
                .is_some_and(|receiver| receiver.type_name == type_name)
        });
        for method in methods {
            let name = &method.name;
            if !is_publicly_visible(name) {
                continue;
            }
            if shapes.is_async_name(name) {
                inventory.async_names.insert(name.clone());
            } else if shapes.is_sync_name(name) {
                inventory.sync_names.insert(name.clone());
            }
        }
        inventory
    }

    /// `sync_name` is a sync method here and its polling sibling exists too.
    pub fn has_async_pair(&self, sync_name: &str, shapes: &CallShapes) -> bool {
        self.sync_names.contains(sync_name) && self.async_names.contains(&shapes.async_name(sync_name))
    }

    pub fn is_empty(&self) -> bool {
        self.sync_names.is_empty() && self.async_names.is_empty()
    }
}

/// A method counts as visible when its first rune is not a lowercase letter. This is
/// looser than Go's exported-identifier rule, which wants an uppercase first rune, so
/// `_Create` is visible here although Go would not export it.
pub fn is_publicly_visible(name: &str) -> bool {
    name.chars().next().is_some_and(|first| !first.is_lowercase())
}

type InventoryCell = Arc<OnceLock<Result<Arc<MethodInventory>, ScanError>>>;

/// Run-wide, single-flight cache of [`MethodInventory`] entries keyed by
/// `package/path.TypeName`.
///
/// The first request for a key loads the declaring package alone through the
/// [`PackageSource`]; concurrent requests for the same key wait on that load.
/// Entries are never rebuilt. A failed load is cached as well, either as the error
/// or, under [`LoadFailurePolicy::Skip`], as an empty entry.
pub struct InventoryCache {
    source: Arc<dyn PackageSource>,
    shapes: CallShapes,
    on_load_failure: LoadFailurePolicy,
    entries: DashMap<String, InventoryCell>,
    loads: AtomicUsize,
}

impl InventoryCache {
    pub fn new(source: Arc<dyn PackageSource>, shapes: CallShapes, on_load_failure: LoadFailurePolicy) -> Self {
        Self {
            source,
            shapes,
            on_load_failure,
            entries: DashMap::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, receiver: &NamedType) -> Result<Arc<MethodInventory>, ScanError> {
        let key = receiver.key();
        // Clone the cell out so the shard lock is not held during the load.
        let cell = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone();

        cell.get_or_init(|| self.build(receiver, key)).clone()
    }

    fn build(&self, receiver: &NamedType, key: String) -> Result<Arc<MethodInventory>, ScanError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.source.load(&receiver.package) {
            Ok(package) => {
                let inventory = MethodInventory::build(&package, &receiver.name, &self.shapes);
                debug!(
                    key = %inventory.key,
                    sync_names = inventory.sync_names.len(),
                    async_names = inventory.async_names.len(),
                    "built method inventory"
                );
                Ok(Arc::new(inventory))
            }
            Err(source) => match self.on_load_failure {
                LoadFailurePolicy::Fail => Err(ScanError::InventoryLoad {
                    package: receiver.package.clone(),
                    source,
                }),
                LoadFailurePolicy::Skip => {
                    warn!(package = %receiver.package, error = %source, "skipping method inventory");
                    Ok(Arc::new(MethodInventory::empty(key)))
                }
            },
        }
    }

    /// Number of secondary package loads performed so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

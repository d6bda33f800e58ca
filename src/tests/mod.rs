// End-to-end scanner tests over in-memory Go packages


use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::analyzer::{LoadError, Package, PackageSource, ProgramModel};
use crate::config::Config;
use crate::lint::Scanner;
use crate::parser::tests::fixtures::*;
use crate::parser::GoParser;

/// Serves fixture packages and records every load.
pub struct FixtureSource {
    packages: HashMap<String, Vec<(&'static str, &'static str)>>,
    loads: Mutex<Vec<String>>,
}

impl FixtureSource {
    pub fn empty() -> Self {
        Self {
            packages: HashMap::new(),
            loads: Mutex::new(Vec::new()),
        }
    }

    /// The SDK packages plus every provider package.
    pub fn all() -> Self {
        Self::sdks()
            .with_package(PROVIDER_NETWORK_PATH, &[("network.go", PROVIDER_NETWORK)])
            .with_package(PROVIDER_DNS_PATH, &[("dns.go", PROVIDER_DNS)])
            .with_package(PROVIDER_SUBNET_PATH, &[("subnet.go", PROVIDER_SUBNET)])
    }

    pub fn sdks() -> Self {
        Self::empty()
            .with_package(AUTOREST_AZURE_PATH, &[("async.go", AUTOREST_AZURE)])
            .with_package(TRACK1_COMPUTE_PATH, &[("virtualmachines.go", TRACK1_COMPUTE)])
            .with_package(
                PANDORA_VNET_PATH,
                &[
                    ("client.go", PANDORA_VNET_CLIENT),
                    ("method_createorupdate.go", PANDORA_VNET_METHODS),
                ],
            )
    }

    pub fn with_package(mut self, path: &str, files: &[(&'static str, &'static str)]) -> Self {
        self.packages.insert(path.to_string(), files.to_vec());
        self
    }

    pub fn without_package(mut self, path: &str) -> Self {
        self.packages.remove(path);
        self
    }

    pub fn loads_of(&self, path: &str) -> usize {
        self.loads.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    pub fn total_loads(&self) -> usize {
        self.loads.lock().unwrap().len()
    }
}

impl PackageSource for FixtureSource {
    fn load(&self, import_path: &str) -> Result<Package, LoadError> {
        self.loads.lock().unwrap().push(import_path.to_string());

        let files = self
            .packages
            .get(import_path)
            .ok_or_else(|| LoadError::NotFound(import_path.to_string()))?;
        let dir = PathBuf::from("/src").join(import_path);

        let mut parser = GoParser::new().unwrap();
        let parsed: Vec<_> = files
            .iter()
            .map(|(name, source)| parser.parse_source(source, &dir.join(name)).unwrap())
            .collect();
        let name = parsed[0].package_name.clone();
        Ok(Package::new(import_path, name, dir, parsed))
    }
}

/// A scanner whose type resolution and inventory loads go through separate sources,
/// so inventory loads can be counted on their own.
pub struct Harness {
    pub model_source: Arc<FixtureSource>,
    pub inventory_source: Arc<FixtureSource>,
    pub scanner: Scanner,
}

impl Harness {
    pub fn new(config: &Config) -> Self {
        Self::with_sources(config, FixtureSource::all(), FixtureSource::all())
    }

    pub fn with_sources(config: &Config, model_source: FixtureSource, inventory_source: FixtureSource) -> Self {
        let model_source = Arc::new(model_source);
        let inventory_source = Arc::new(inventory_source);
        let model = Arc::new(ProgramModel::new(model_source.clone()));
        let scanner = Scanner::new(model, inventory_source.clone(), config);
        Self {
            model_source,
            inventory_source,
            scanner,
        }
    }

    pub fn scanner_with_root(self, root: &str) -> Self {
        let Harness {
            model_source,
            inventory_source,
            scanner,
        } = self;
        Harness {
            model_source,
            inventory_source,
            scanner: scanner.with_display_root(root),
        }
    }

    pub fn packages(&self, paths: &[&str]) -> Vec<Arc<Package>> {
        paths
            .iter()
            .map(|path| self.scanner.model().load(path).unwrap())
            .collect()
    }
}

/// 1-based (line, column) of the first occurrence of `needle` in `source`.
pub fn position_of(source: &str, needle: &str) -> (usize, usize) {
    source
        .lines()
        .enumerate()
        .find_map(|(index, line)| line.find(needle).map(|column| (index + 1, column + 1)))
        .unwrap_or_else(|| panic!("{:?} not found", needle))
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analyzer::Package;
use crate::parser::GoParser;
use crate::workspace::{is_standard_library, GoWorkspace};

#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("cannot find package {0}")]
    NotFound(String),

    #[error("package {path} is part of the standard library and is not loaded")]
    StandardLibrary { path: String },

    #[error("no Go files in {dir:?} for package {path}")]
    NoGoFiles { path: String, dir: PathBuf },

    #[error("found packages {names} in {dir:?}")]
    MixedPackages { names: String, dir: PathBuf },

    #[error("failed to parse {file:?}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("failed to read {dir:?}: {message}")]
    Io { dir: PathBuf, message: String },
}

/// Supplies single packages by import path. A load never follows imports; callers
/// decide which dependencies are worth loading.
pub trait PackageSource: Send + Sync {
    fn load(&self, import_path: &str) -> Result<Package, LoadError>;
}

/// Loads packages from a Go module on disk, parsing with tree-sitter-go.
pub struct GoPackageLoader {
    workspace: GoWorkspace,
}

impl GoPackageLoader {
    pub fn new(workspace: GoWorkspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &GoWorkspace {
        &self.workspace
    }

    fn go_files(&self, import_path: &str, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io {
            dir: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let include_tests = self.workspace.include_tests();
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                name.ends_with(".go") && (include_tests || !name.ends_with("_test.go"))
            })
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(LoadError::NoGoFiles {
                path: import_path.to_string(),
                dir: dir.to_path_buf(),
            });
        }
        Ok(files)
    }
}

impl PackageSource for GoPackageLoader {
    fn load(&self, import_path: &str) -> Result<Package, LoadError> {
        if is_standard_library(import_path) {
            return Err(LoadError::StandardLibrary {
                path: import_path.to_string(),
            });
        }

        let dir = self
            .workspace
            .package_dir(import_path)
            .ok_or_else(|| LoadError::NotFound(import_path.to_string()))?;

        let mut parser = GoParser::new().map_err(|e| LoadError::Parse {
            file: dir.clone(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for file_path in self.go_files(import_path, &dir)? {
            let parsed = parser.parse_file(&file_path).map_err(|e| LoadError::Parse {
                file: file_path.clone(),
                message: e.to_string(),
            })?;
            if parsed.has_syntax_errors {
                warn!(file = %file_path.display(), "syntax errors, continuing with partial tree");
            }
            // External test packages (`package foo_test`) are separate packages.
            if parsed.is_test_file() && parsed.package_name.ends_with("_test") {
                continue;
            }
            files.push(parsed);
        }

        let names: BTreeSet<&str> = files.iter().map(|f| f.package_name.as_str()).collect();
        if names.len() > 1 {
            return Err(LoadError::MixedPackages {
                names: names.into_iter().collect::<Vec<_>>().join(", "),
                dir,
            });
        }
        let name = names.into_iter().next().unwrap_or_default().to_string();

        debug!(package = import_path, files = files.len(), "loaded package");
        Ok(Package::new(import_path, name, dir, files))
    }
}

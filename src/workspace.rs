use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::config::Config;

static MODULE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^module\s+"?([^\s"]+)"?"#).expect("valid regex"));
static REQUIRE_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?([^\s"]+)"?\s+(v[^\s]+)$"#).expect("valid regex"));
static REPLACE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"?([^\s"]+)"?(?:\s+(v[^\s]+))?\s+=>\s+"?([^\s"]+)"?(?:\s+(v[^\s]+))?$"#)
        .expect("valid regex")
});

/// Contents of a `go.mod` that matter for locating packages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoModule {
    pub path: String,
    pub root: PathBuf,
    pub requires: BTreeMap<String, String>,
    pub replaces: Vec<Replace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replace {
    pub module: String,
    pub target: ReplaceTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReplaceTarget {
    Dir(PathBuf),
    Module { path: String, version: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

impl GoModule {
    pub fn from_dir(root: &Path) -> Result<Self> {
        let manifest_path = root.join("go.mod");
        let content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {:?}", manifest_path))?;
        Self::parse(root, &content).with_context(|| format!("Failed to parse {:?}", manifest_path))
    }

    pub fn parse(root: &Path, content: &str) -> Result<Self> {
        let mut path = None;
        let mut requires = BTreeMap::new();
        let mut replaces = Vec::new();
        let mut block = Block::None;

        for raw_line in content.lines() {
            let line = raw_line.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if block != Block::None {
                if line == ")" {
                    block = Block::None;
                    continue;
                }
                match block {
                    Block::Require => Self::parse_require(line, &mut requires),
                    Block::Replace => Self::parse_replace(root, line, &mut replaces),
                    _ => {}
                }
                continue;
            }

            if let Some(captures) = MODULE_DIRECTIVE.captures(line) {
                path = Some(captures[1].to_string());
            } else if let Some(rest) = line.strip_prefix("require") {
                match rest.trim() {
                    "(" => block = Block::Require,
                    entry => Self::parse_require(entry, &mut requires),
                }
            } else if let Some(rest) = line.strip_prefix("replace") {
                match rest.trim() {
                    "(" => block = Block::Replace,
                    entry => Self::parse_replace(root, entry, &mut replaces),
                }
            } else if line.ends_with('(') {
                block = Block::Other;
            }
        }

        let path = path.ok_or_else(|| anyhow::anyhow!("missing module directive"))?;
        Ok(Self {
            path,
            root: root.to_path_buf(),
            requires,
            replaces,
        })
    }

    fn parse_require(entry: &str, requires: &mut BTreeMap<String, String>) {
        if let Some(captures) = REQUIRE_ENTRY.captures(entry) {
            requires.insert(captures[1].to_string(), captures[2].to_string());
        }
    }

    fn parse_replace(root: &Path, entry: &str, replaces: &mut Vec<Replace>) {
        let Some(captures) = REPLACE_ENTRY.captures(entry) else {
            return;
        };
        let module = captures[1].to_string();
        let target_path = &captures[3];
        let target = match captures.get(4) {
            Some(version) => ReplaceTarget::Module {
                path: target_path.to_string(),
                version: version.as_str().to_string(),
            },
            None => ReplaceTarget::Dir(root.join(target_path)),
        };
        replaces.push(Replace { module, target });
    }

    /// Import path of a directory inside this module.
    pub fn import_path_for(&self, dir: &Path) -> Option<String> {
        let relative = dir.strip_prefix(&self.root).ok()?;
        let segments: Vec<_> = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        if segments.is_empty() {
            Some(self.path.clone())
        } else {
            Some(format!("{}/{}", self.path, segments.join("/")))
        }
    }
}

/// Locates Go packages on disk for the main module and its dependencies.
#[derive(Debug, Clone)]
pub struct GoWorkspace {
    module: GoModule,
    module_cache: Option<PathBuf>,
    include_tests: bool,
}

impl GoWorkspace {
    /// Finds the `go.mod` at or above the configured root.
    pub fn discover(config: &Config) -> Result<Self> {
        let start = config
            .workspace
            .root
            .canonicalize()
            .with_context(|| format!("Failed to resolve workspace root: {:?}", config.workspace.root))?;

        let module_root = start
            .ancestors()
            .find(|dir| dir.join("go.mod").is_file())
            .ok_or_else(|| anyhow::anyhow!("No go.mod found at or above {:?}", start))?;

        let module = GoModule::from_dir(module_root)?;
        let module_cache = config.workspace.module_cache.clone().or_else(default_module_cache);

        Ok(Self {
            module,
            module_cache,
            include_tests: config.analysis.include_tests,
        })
    }

    pub fn new(module: GoModule, module_cache: Option<PathBuf>, include_tests: bool) -> Self {
        Self {
            module,
            module_cache,
            include_tests,
        }
    }

    pub fn module(&self) -> &GoModule {
        &self.module
    }

    pub fn root(&self) -> &Path {
        &self.module.root
    }

    pub fn include_tests(&self) -> bool {
        self.include_tests
    }

    /// Directory holding the package with the given import path, if it can be found
    /// without consulting the network.
    pub fn package_dir(&self, import_path: &str) -> Option<PathBuf> {
        if is_standard_library(import_path) {
            return None;
        }

        if let Some(rest) = strip_module_prefix(import_path, &self.module.path) {
            return existing_dir(join_import_suffix(&self.module.root, rest));
        }

        let vendored = join_import_suffix(&self.module.root.join("vendor"), import_path);
        if vendored.is_dir() {
            return Some(vendored);
        }

        if let Some(replace) = longest_match(&self.module.replaces, import_path, |r| r.module.as_str()) {
            let rest = strip_module_prefix(import_path, &replace.module).unwrap_or("");
            return match &replace.target {
                ReplaceTarget::Dir(dir) => existing_dir(join_import_suffix(dir, rest)),
                ReplaceTarget::Module { path, version } => self.cached_module_dir(path, version, rest),
            };
        }

        let (module, version) = self
            .module
            .requires
            .iter()
            .filter(|(module, _)| strip_module_prefix(import_path, module).is_some())
            .max_by_key(|(module, _)| module.len())?;
        let rest = strip_module_prefix(import_path, module).unwrap_or("");
        self.cached_module_dir(module, version, rest)
    }

    fn cached_module_dir(&self, module: &str, version: &str, rest: &str) -> Option<PathBuf> {
        let cache = self.module_cache.as_ref()?;
        let module_dir = cache.join(format!("{}@{}", escape_module_path(module), escape_module_path(version)));
        existing_dir(join_import_suffix(&module_dir, rest))
    }

    /// Expands `go list` style patterns into import paths of the main module.
    pub fn expand_patterns(&self, patterns: &[String]) -> Result<Vec<String>> {
        let mut import_paths = BTreeSet::new();

        for pattern in patterns {
            if let Some(prefix) = pattern.strip_suffix("/...") {
                let base = self.pattern_dir(prefix);
                for dir in self.package_dirs_under(&base) {
                    if let Some(path) = self.module.import_path_for(&dir) {
                        import_paths.insert(path);
                    }
                }
            } else if pattern == "..." {
                for dir in self.package_dirs_under(&self.module.root) {
                    if let Some(path) = self.module.import_path_for(&dir) {
                        import_paths.insert(path);
                    }
                }
            } else if is_relative_pattern(pattern) {
                let dir = self.pattern_dir(pattern);
                let path = self
                    .module
                    .import_path_for(&dir)
                    .ok_or_else(|| anyhow::anyhow!("Directory {:?} is outside module {}", dir, self.module.path))?;
                import_paths.insert(path);
            } else {
                import_paths.insert(pattern.clone());
            }
        }

        Ok(import_paths.into_iter().collect())
    }

    fn pattern_dir(&self, pattern: &str) -> PathBuf {
        if let Some(rest) = strip_module_prefix(pattern, &self.module.path) {
            return join_import_suffix(&self.module.root, rest);
        }
        let trimmed = pattern.trim_start_matches("./");
        if trimmed == "." || trimmed.is_empty() {
            self.module.root.clone()
        } else {
            self.module.root.join(trimmed)
        }
    }

    fn package_dirs_under(&self, base: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        let walker = WalkDir::new(base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_str().unwrap_or("");
                let skipped = name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_');
                // Nested modules are separate workspaces.
                !skipped && !entry.path().join("go.mod").is_file()
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir());

        for entry in walker {
            if has_go_files(entry.path(), self.include_tests) {
                dirs.push(entry.path().to_path_buf());
            }
        }
        dirs
    }
}

pub fn is_standard_library(import_path: &str) -> bool {
    let first = import_path.split('/').next().unwrap_or("");
    !first.contains('.')
}

/// Module cache directories escape upper-case letters as `!` + lower-case.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

pub fn default_module_cache() -> Option<PathBuf> {
    if let Some(cache) = std::env::var_os("GOMODCACHE").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(cache));
    }
    if let Some(gopath) = std::env::var_os("GOPATH").filter(|v| !v.is_empty()) {
        let first = std::env::split_paths(&gopath).next()?;
        return Some(first.join("pkg").join("mod"));
    }
    dirs::home_dir().map(|home| home.join("go").join("pkg").join("mod"))
}

pub fn has_go_files(dir: &Path, include_tests: bool) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|e| e.ok()).any(|entry| {
        let name = entry.file_name();
        let name = name.to_str().unwrap_or("");
        name.ends_with(".go") && (include_tests || !name.ends_with("_test.go")) && entry.path().is_file()
    })
}

fn is_relative_pattern(pattern: &str) -> bool {
    pattern == "." || pattern.starts_with("./") || pattern.starts_with("../")
}

fn strip_module_prefix<'a>(import_path: &'a str, module: &str) -> Option<&'a str> {
    if import_path == module {
        return Some("");
    }
    import_path.strip_prefix(module)?.strip_prefix('/')
}

fn longest_match<'a, T>(items: &'a [T], import_path: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    items
        .iter()
        .filter(|item| strip_module_prefix(import_path, key(item)).is_some())
        .max_by_key(|item| key(item).len())
}

fn join_import_suffix(base: &Path, rest: &str) -> PathBuf {
    rest.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |dir, segment| dir.join(segment))
}

fn existing_dir(dir: PathBuf) -> Option<PathBuf> {
    dir.is_dir().then_some(dir)
}

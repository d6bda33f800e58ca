use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
    /// Overrides `$GOMODCACHE` / `$GOPATH/pkg/mod`.
    #[serde(default)]
    pub module_cache: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub include_tests: bool,
    #[serde(default)]
    pub exclude_packages: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub track1: Track1Config,
    #[serde(default)]
    pub pandora: PandoraConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track1Config {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_marker_type")]
    pub marker_type: String,
    #[serde(default = "default_marker_package")]
    pub marker_package: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PandoraConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_async_suffix")]
    pub async_suffix: String,
    #[serde(default = "default_sync_keywords")]
    pub sync_keywords: Vec<String>,
    /// Receiver types outside these package prefixes are ignored. Empty means no filter.
    #[serde(default = "default_sdk_package_prefixes")]
    pub sdk_package_prefixes: Vec<String>,
    #[serde(default)]
    pub include_unassigned_calls: bool,
    #[serde(default)]
    pub false_positive_heuristic: HeuristicPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicPolicy {
    /// Downgrade when a bound name contains "future".
    #[default]
    FutureBinding,
    Off,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub on_load_failure: LoadFailurePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadFailurePolicy {
    #[default]
    Fail,
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_true() -> bool {
    true
}

fn default_patterns() -> Vec<String> {
    vec!["./...".to_string()]
}

fn default_marker_type() -> String {
    "FutureAPI".to_string()
}

fn default_marker_package() -> String {
    "github.com/Azure/go-autorest/autorest/azure".to_string()
}

fn default_async_suffix() -> String {
    "ThenPoll".to_string()
}

fn default_sync_keywords() -> Vec<String> {
    vec![
        "Create".to_string(),
        "CreateOrUpdate".to_string(),
        "Update".to_string(),
        "Delete".to_string(),
    ]
}

fn default_sdk_package_prefixes() -> Vec<String> {
    vec!["github.com/hashicorp/go-azure-sdk/resource-manager/".to_string()]
}

fn default_max_threads() -> usize {
    num_cpus::get()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            exclude_packages: Vec::new(),
        }
    }
}

impl Default for Track1Config {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_type: default_marker_type(),
            marker_package: default_marker_package(),
        }
    }
}

impl Default for PandoraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            async_suffix: default_async_suffix(),
            sync_keywords: default_sync_keywords(),
            sdk_package_prefixes: default_sdk_package_prefixes(),
            include_unassigned_calls: false,
            false_positive_heuristic: HeuristicPolicy::default(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_threads: default_max_threads(),
            parallel: true,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_workspace_root<P: AsRef<std::path::Path>>(workspace_root: P) -> Result<Self> {
        let mut config = Self::default();
        config.workspace.root = workspace_root.as_ref().to_path_buf();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let pandora = &self.rules.pandora;
        if pandora.async_suffix.is_empty() {
            anyhow::bail!("rules.pandora.async_suffix must not be empty");
        }
        if pandora.sync_keywords.iter().any(|k| k.is_empty()) {
            anyhow::bail!("rules.pandora.sync_keywords must not contain empty keywords");
        }
        if self.performance.max_threads == 0 {
            anyhow::bail!("performance.max_threads must be at least 1");
        }
        Ok(())
    }

    pub fn is_excluded(&self, import_path: &str) -> bool {
        self.analysis
            .exclude_packages
            .iter()
            .any(|pattern| import_path.contains(pattern.trim_end_matches('*')))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig {
                root: PathBuf::from("."),
                patterns: default_patterns(),
                module_cache: None,
            },
            analysis: AnalysisConfig::default(),
            rules: RulesConfig::default(),
            inventory: InventoryConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_azure_sdks() {
        let config = Config::default();
        assert_eq!(config.rules.track1.marker_type, "FutureAPI");
        assert_eq!(config.rules.track1.marker_package, "github.com/Azure/go-autorest/autorest/azure");
        assert_eq!(config.rules.pandora.async_suffix, "ThenPoll");
        assert_eq!(config.inventory.on_load_failure, LoadFailurePolicy::Fail);
        assert_eq!(config.rules.pandora.false_positive_heuristic, HeuristicPolicy::FutureBinding);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[workspace]
root = "/src/terraform-provider-azurerm"

[inventory]
on_load_failure = "skip"

[rules.pandora]
sdk_package_prefixes = []
false_positive_heuristic = "off"
"#,
        )
        .unwrap();

        assert_eq!(config.workspace.patterns, vec!["./..."]);
        assert_eq!(config.inventory.on_load_failure, LoadFailurePolicy::Skip);
        assert!(config.rules.pandora.sdk_package_prefixes.is_empty());
        assert_eq!(config.rules.pandora.false_positive_heuristic, HeuristicPolicy::Off);
        assert_eq!(config.rules.pandora.async_suffix, "ThenPoll");
        assert!(config.rules.track1.enabled);
    }

    #[test]
    fn test_validate_rejects_empty_suffix() {
        let mut config = Config::default();
        config.rules.pandora.async_suffix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_excluded() {
        let mut config = Config::default();
        config.analysis.exclude_packages = vec!["internal/acceptance*".to_string()];

        assert!(config.is_excluded("github.com/hashicorp/terraform-provider-azurerm/internal/acceptance/check"));
        assert!(!config.is_excluded("github.com/hashicorp/terraform-provider-azurerm/internal/services/network"));
    }
}

use lro_lint::analyzer::{GoPackageLoader, PackageSource, ProgramModel};
use lro_lint::lint::{Confidence, RuleKind, Scanner};
use lro_lint::{Config, GoWorkspace};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

// Import the fixture constants
include!("../src/parser/tests/fixtures/sdk_packages.rs");
include!("../src/parser/tests/fixtures/provider_packages.rs");

const MODULE: &str = "github.com/hashicorp/terraform-provider-azurerm";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A provider module with its SDK dependencies vendored.
fn provider_module() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "go.mod",
        &format!(
            "module {}\n\ngo 1.21\n\nrequire (\n\tgithub.com/Azure/azure-sdk-for-go v68.0.0+incompatible\n\tgithub.com/hashicorp/go-azure-sdk/resource-manager v0.20240101.0\n)\n",
            MODULE
        ),
    );
    write(root, "internal/services/network/network.go", PROVIDER_NETWORK);
    write(root, "internal/services/dns/dns.go", PROVIDER_DNS);
    write(root, "internal/services/subnet/subnet.go", PROVIDER_SUBNET);
    // a nested module is a separate workspace
    write(root, "tools/go.mod", "module example.com/tools\n");
    write(root, "tools/gen.go", "package tools\n");

    write(root, &format!("vendor/{}/async.go", AUTOREST_AZURE_PATH), AUTOREST_AZURE);
    write(
        root,
        &format!("vendor/{}/virtualmachines.go", TRACK1_COMPUTE_PATH),
        TRACK1_COMPUTE,
    );
    write(root, &format!("vendor/{}/client.go", PANDORA_VNET_PATH), PANDORA_VNET_CLIENT);
    write(
        root,
        &format!("vendor/{}/method_createorupdate.go", PANDORA_VNET_PATH),
        PANDORA_VNET_METHODS,
    );
    dir
}

fn config_for(root: &Path) -> Config {
    let mut config = Config::default();
    config.workspace.root = root.to_path_buf();
    config
}

fn scan(config: &Config) -> (Vec<String>, usize) {
    let workspace = GoWorkspace::discover(config).unwrap();
    let root = workspace.root().to_path_buf();
    let import_paths = workspace.expand_patterns(&config.workspace.patterns).unwrap();

    let loader: Arc<dyn PackageSource> = Arc::new(GoPackageLoader::new(workspace));
    let model = Arc::new(ProgramModel::new(loader.clone()));
    let packages: Vec<_> = import_paths
        .iter()
        .map(|path| model.load(path).unwrap())
        .collect();

    let scanner = Scanner::new(model, loader, config).with_display_root(root);
    let findings = scanner.scan(&packages).unwrap();
    (
        findings.iter().map(|f| f.to_string()).collect(),
        scanner.inventory().load_count(),
    )
}

fn line_col(source: &str, needle: &str) -> String {
    source
        .lines()
        .enumerate()
        .find_map(|(index, line)| line.find(needle).map(|column| format!("{}:{}", index + 1, column + 1)))
        .unwrap()
}

#[test]
fn test_expand_patterns_skips_vendor_and_nested_modules() {
    let dir = provider_module();
    let workspace = GoWorkspace::discover(&config_for(dir.path())).unwrap();

    let paths = workspace.expand_patterns(&["./...".to_string()]).unwrap();
    assert_eq!(
        paths,
        vec![
            format!("{}/internal/services/dns", MODULE),
            format!("{}/internal/services/network", MODULE),
            format!("{}/internal/services/subnet", MODULE),
        ]
    );
}

#[test]
fn test_scan_reports_both_rules() {
    let dir = provider_module();
    let (lines, inventory_loads) = scan(&config_for(dir.path()));

    let dns = "internal/services/dns/dns.go";
    let network = "internal/services/network/network.go";
    let subnet = "internal/services/subnet/subnet.go";
    assert_eq!(
        lines,
        vec![
            format!("Pandora Hit: {}:{}", dns, line_col(PROVIDER_DNS, "Delete(ctx, id); err != nil")),
            format!("Pandora Hit: {}:{}", dns, line_col(PROVIDER_DNS, "CreateOrUpdate(ctx, id")),
            format!(
                "Pandora Hit: {}:{}",
                network,
                line_col(PROVIDER_NETWORK, "CreateOrUpdate(ctx, id, payload)")
            ),
            format!(
                "Pandora Hit: {}:{} (likely false positive)",
                network,
                line_col(PROVIDER_NETWORK, "Delete(ctx, id)")
            ),
            format!(
                "Track 1 Hit: {}:{}",
                network,
                line_col(PROVIDER_NETWORK, "_, err := vmClient.CreateOrUpdate")
            ),
            format!(
                "Track 1 Hit: {}:{}",
                network,
                line_col(PROVIDER_NETWORK, "_, err := vmClient.Deallocate")
            ),
            format!(
                "Pandora Hit: {}:{}",
                subnet,
                line_col(PROVIDER_SUBNET, "CreateOrUpdate(ctx, id, virtualnetworks")
            ),
            format!("Pandora Hit: {}:{}", subnet, line_col(PROVIDER_SUBNET, "Delete(ctx, id); err")),
            format!("Pandora Hit: {}:{}", subnet, line_col(PROVIDER_SUBNET, "Delete(ctx, target)")),
            format!("Pandora Hit: {}:{}", subnet, line_col(PROVIDER_SUBNET, "Delete(ctx, networkId)")),
            format!(
                "Track 1 Hit: {}:{}",
                subnet,
                line_col(PROVIDER_SUBNET, "_, err := c.Deallocate")
            ),
        ]
    );
    assert_eq!(inventory_loads, 1);
}

#[test]
fn test_config_file_overrides_rules() {
    let dir = provider_module();
    let config_path = dir.path().join("lro-lint.toml");
    fs::write(
        &config_path,
        "[workspace]\nroot = \".\"\n\n[rules.track1]\nenabled = false\n\n[rules.pandora]\nfalse_positive_heuristic = \"off\"\n",
    )
    .unwrap();

    let mut config = Config::from_file(&config_path.to_string_lossy()).unwrap();
    config.workspace.root = dir.path().to_path_buf();
    let (lines, _) = scan(&config);

    assert_eq!(lines.len(), 8);
    assert!(lines.iter().all(|line| line.starts_with("Pandora Hit: ")));
    assert!(!lines.iter().any(|line| line.contains("likely false positive")));
}

#[test]
fn test_json_report_shape() {
    let dir = provider_module();
    let config = config_for(dir.path());
    let workspace = GoWorkspace::discover(&config).unwrap();
    let root = workspace.root().to_path_buf();

    let loader: Arc<dyn PackageSource> = Arc::new(GoPackageLoader::new(workspace));
    let model = Arc::new(ProgramModel::new(loader.clone()));
    let package = model.load(&format!("{}/internal/services/network", MODULE)).unwrap();
    let scanner = Scanner::new(model, loader, &config).with_display_root(root);
    let findings = scanner.scan(&[package]).unwrap();

    let json = serde_json::to_value(&findings).unwrap();
    let first = &json[0];
    assert_eq!(first["rule"], "pandora-mismatch");
    assert_eq!(first["confidence"], "definite");
    assert_eq!(first["position"]["file"], "internal/services/network/network.go");
    assert!(first.get("targets").is_none());

    assert_eq!(findings[1].confidence, Confidence::LikelyFalsePositive);
    assert_eq!(findings[3].rule, RuleKind::Track1);
}

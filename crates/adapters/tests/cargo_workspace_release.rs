//! Detect, resolve and write back a Cargo workspace on disk.

use monobump_adapters::{AdapterRegistry, write_results};
use monobump_graph::ModuleId;
use monobump_release::{CommitInfo, VersionRules, group_by_module, resolve};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_workspace(root: &Path) {
    write(
        root,
        "Cargo.toml",
        r#"[workspace]
resolver = "2"
members = ["crates/core", "crates/cli"]

[workspace.package]
version = "0.9.0"

[workspace.dependencies]
demo-core = { path = "crates/core", version = "0.4.2" }
"#,
    );
    write(
        root,
        "crates/core/Cargo.toml",
        r#"[package]
name = "demo-core"
version = "0.4.2"
"#,
    );
    write(
        root,
        "crates/cli/Cargo.toml",
        r#"[package]
name = "demo-cli"
version.workspace = true

[dependencies]
demo-core = { workspace = true }
"#,
    );
}

fn id(s: &str) -> ModuleId {
    s.parse().unwrap()
}

#[test]
fn test_release_round_trip() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    create_workspace(root);

    let registry = AdapterRegistry::builtin();
    let adapter = registry.require(root).unwrap();
    assert_eq!(adapter.name(), "cargo");

    let graph = adapter.detect(root).unwrap();
    let commits = group_by_module(&[CommitInfo::from_message(
        "c1",
        "feat(core): add streaming decoder",
        [id(":crates:core")],
    )]);
    let results = resolve(&graph, &commits, &VersionRules::default()).unwrap();

    let written = write_results(adapter, root, &results, false).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[&id(":crates:core")], "0.5.0");
    assert_eq!(written[&id(":crates:cli")], "0.9.1");

    let redetected = adapter.detect(root).unwrap();
    assert_eq!(
        redetected.module(&id(":crates:core")).unwrap().current_version,
        "0.5.0"
    );
    assert_eq!(
        redetected.module(&id(":crates:cli")).unwrap().current_version,
        "0.9.1"
    );
    assert_eq!(redetected.root().unwrap().current_version, "0.9.0");

    let manifest: toml::Value =
        toml::from_str(&fs::read_to_string(root.join("Cargo.toml")).unwrap()).unwrap();
    assert_eq!(
        manifest["workspace"]["dependencies"]["demo-core"]["version"].as_str(),
        Some("0.5.0")
    );
}

#[test]
fn test_dry_run_leaves_files_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    create_workspace(root);
    let before = fs::read_to_string(root.join("crates/core/Cargo.toml")).unwrap();

    let registry = AdapterRegistry::builtin();
    let adapter = registry.identify(root).unwrap();
    let graph = adapter.detect(root).unwrap();
    let commits = group_by_module(&[CommitInfo::new("c1", "fix").with_module(id(":crates:core"))]);
    let results = resolve(&graph, &commits, &VersionRules::default()).unwrap();

    let planned = write_results(adapter, root, &results, true).unwrap();
    assert_eq!(planned[&id(":crates:core")], "0.4.3");
    assert_eq!(
        fs::read_to_string(root.join("crates/core/Cargo.toml")).unwrap(),
        before
    );
}

#[test]
fn test_unrecognised_repository() {
    let temp = TempDir::new().unwrap();
    let registry = AdapterRegistry::builtin();
    assert!(registry.identify(temp.path()).is_none());
    assert!(registry.require(temp.path()).is_err());
}

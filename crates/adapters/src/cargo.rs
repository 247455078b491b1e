//! Cargo workspace adapter.
//!
//! Modules are the packages of a Cargo workspace. The workspace root is the
//! root module `:`; a member at `crates/core` becomes `:crates:core`.
//! Edges come from path dependencies (directly or through
//! `[workspace.dependencies]`) that name another workspace package.
//!
//! Reading uses `toml`; writing goes through `toml_edit` so comments and
//! formatting survive. Versions inherited with `version.workspace = true`
//! stay inherited as long as they match `[workspace.package].version`; a
//! member whose version diverges gets an explicit `version` entry.

use crate::adapter::{AdapterIdentifier, ModuleDetector, VersionWriter};
use crate::error::{Error, Result};
use monobump_graph::{Error as GraphError, Module, ModuleGraph, ModuleId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, TableLike};
use tracing::{debug, info};

const MANIFEST_FILE: &str = "Cargo.toml";

/// Version Cargo assumes when `[package].version` is omitted.
const IMPLICIT_PACKAGE_VERSION: &str = "0.0.0";

/// Dependency tables that carry build edges by default.
const BUILD_DEPENDENCY_TABLES: [&str; 2] = ["dependencies", "build-dependencies"];

const DEV_DEPENDENCY_TABLE: &str = "dev-dependencies";

/// Adapter for Cargo workspaces.
#[derive(Debug, Clone, Default)]
pub struct CargoAdapter {
    include_dev_dependencies: bool,
}

impl CargoAdapter {
    /// Creates an adapter that derives edges from normal and build dependencies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treat `[dev-dependencies]` as edges.
    ///
    /// Cargo allows dev-dependency cycles, which the resolver rejects, so
    /// this is off by default.
    #[must_use]
    pub const fn with_dev_dependencies(mut self, include: bool) -> Self {
        self.include_dev_dependencies = include;
        self
    }

    fn dependency_tables(&self) -> Vec<&'static str> {
        let mut tables = BUILD_DEPENDENCY_TABLES.to_vec();
        if self.include_dev_dependencies {
            tables.push(DEV_DEPENDENCY_TABLE);
        }
        tables
    }

    /// Read the root manifest and every member manifest.
    fn load(&self, root: &Path) -> Result<CargoWorkspace> {
        let root_manifest_path = root.join(MANIFEST_FILE);
        let root_manifest = read_manifest(&root_manifest_path)?;

        let workspace_version = root_manifest
            .get("workspace")
            .and_then(|w| w.get("package"))
            .and_then(|p| p.get("version"))
            .and_then(toml::Value::as_str)
            .map(str::to_string);

        let root_package = if let Some(package) = root_manifest.get("package") {
            let (version, inherits_version) =
                package_version(package, workspace_version.as_deref(), &root_manifest_path)?;
            CargoPackage {
                id: ModuleId::root(),
                name: package_name(package),
                manifest_path: root_manifest_path.clone(),
                version,
                inherits_version,
            }
        } else {
            let version = workspace_version.clone().ok_or_else(|| {
                Error::manifest(
                    "Root manifest declares no version: set [package].version or [workspace.package].version",
                    Some(root_manifest_path.clone()),
                )
            })?;
            CargoPackage {
                id: ModuleId::root(),
                name: None,
                manifest_path: root_manifest_path.clone(),
                version,
                inherits_version: true,
            }
        };

        let mut packages = vec![root_package];
        let mut manifests = vec![root_manifest.clone()];

        for member_dir in discover_members(root, &root_manifest)? {
            let manifest_path = member_dir.join(MANIFEST_FILE);
            if !manifest_path.exists() {
                debug!(path = %member_dir.display(), "Skipping workspace member without Cargo.toml");
                continue;
            }

            let manifest = read_manifest(&manifest_path)?;
            let Some(package) = manifest.get("package") else {
                debug!(path = %manifest_path.display(), "Skipping manifest without [package]");
                continue;
            };

            let relative = member_dir.strip_prefix(root).map_err(|_| {
                Error::manifest(
                    format!("Workspace member {} is outside the workspace", member_dir.display()),
                    Some(manifest_path.clone()),
                )
            })?;
            let id = ModuleId::from_path(relative)?;
            let (version, inherits_version) =
                package_version(package, workspace_version.as_deref(), &manifest_path)?;

            debug!(module = %id, %version, inherits_version, "Discovered Cargo package");
            packages.push(CargoPackage {
                id,
                name: package_name(package),
                manifest_path,
                version,
                inherits_version,
            });
            manifests.push(manifest);
        }

        let internal: HashMap<String, ModuleId> = packages
            .iter()
            .filter_map(|p| p.name.clone().map(|name| (name, p.id.clone())))
            .collect();

        let tables = self.dependency_tables();
        let dependencies: Vec<Vec<ModuleId>> = packages
            .iter()
            .zip(&manifests)
            .map(|(package, manifest)| {
                internal_dependencies(manifest, &tables, &internal)
                    .into_iter()
                    .filter(|id| *id != package.id)
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(CargoWorkspace {
            workspace_version,
            packages,
            dependencies,
        })
    }
}

impl AdapterIdentifier for CargoAdapter {
    fn name(&self) -> &str {
        "cargo"
    }

    fn recognizes(&self, root: &Path) -> Result<bool> {
        let path = root.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(false);
        }
        let manifest = read_manifest(&path)?;
        Ok(manifest.get("workspace").is_some() || manifest.get("package").is_some())
    }
}

impl ModuleDetector for CargoAdapter {
    fn detect(&self, root: &Path) -> Result<ModuleGraph> {
        let workspace = self.load(root)?;
        let modules: Vec<Module> = workspace
            .packages
            .iter()
            .zip(workspace.dependencies)
            .map(|(package, dependencies)| {
                Module::new(package.id.clone(), package.version.clone())
                    .with_dependencies(dependencies)
            })
            .collect();

        info!(
            root = %root.display(),
            modules = modules.len(),
            "Detected Cargo workspace"
        );
        Ok(ModuleGraph::new(modules)?)
    }
}

impl VersionWriter for CargoAdapter {
    fn write_versions(&self, root: &Path, versions: &BTreeMap<ModuleId, String>) -> Result<()> {
        let workspace = self.load(root)?;
        if let Some(unknown) = versions
            .keys()
            .find(|id| !workspace.packages.iter().any(|p| &p.id == *id))
        {
            return Err(GraphError::unknown_module(unknown).into());
        }

        let mut manifests = EditableManifests::default();
        let root_manifest_path = root.join(MANIFEST_FILE);

        let root_package = workspace.root();
        let new_workspace_version = match versions.get(&root_package.id) {
            Some(version) if root_package.inherits_version => {
                set_workspace_version(manifests.get(&root_manifest_path)?, version, &root_manifest_path)?;
                Some(version.clone())
            }
            _ => workspace.workspace_version.clone(),
        };

        for package in &workspace.packages {
            let target = versions.get(&package.id);
            if package.inherits_version {
                if package.name.is_none() {
                    continue;
                }
                let desired = target.unwrap_or(&package.version);
                if new_workspace_version.as_ref() != Some(desired) {
                    debug!(module = %package.id, version = %desired, "Pinning version previously inherited from workspace");
                    set_package_version(manifests.get(&package.manifest_path)?, desired, &package.manifest_path)?;
                }
            } else if let Some(version) = target {
                set_package_version(manifests.get(&package.manifest_path)?, version, &package.manifest_path)?;
            }
        }

        let by_name: BTreeMap<String, String> = workspace
            .packages
            .iter()
            .filter_map(|p| Some((p.name.clone()?, versions.get(&p.id)?.clone())))
            .collect();

        if !by_name.is_empty() {
            let doc = manifests.get(&root_manifest_path)?;
            if let Some(deps) = doc
                .get_mut("workspace")
                .and_then(|w| w.get_mut("dependencies"))
                .and_then(Item::as_table_like_mut)
            {
                update_dependency_requirements(deps, &by_name);
            }

            for package in &workspace.packages {
                update_manifest_requirements(manifests.get(&package.manifest_path)?, &by_name);
            }
        }

        manifests.write_changed()
    }
}

/// A package as read from its manifest.
#[derive(Debug, Clone)]
struct CargoPackage {
    id: ModuleId,
    /// `None` for a virtual workspace root.
    name: Option<String>,
    manifest_path: PathBuf,
    version: String,
    /// Version comes from `[workspace.package].version`.
    inherits_version: bool,
}

#[derive(Debug)]
struct CargoWorkspace {
    workspace_version: Option<String>,
    /// Root package first, then members in discovery order.
    packages: Vec<CargoPackage>,
    /// Internal dependencies, parallel to `packages`.
    dependencies: Vec<Vec<ModuleId>>,
}

impl CargoWorkspace {
    fn root(&self) -> &CargoPackage {
        &self.packages[0]
    }
}

/// Manifests opened for editing, written back only when modified.
#[derive(Default)]
struct EditableManifests {
    docs: BTreeMap<PathBuf, (String, DocumentMut)>,
}

impl EditableManifests {
    fn get(&mut self, path: &Path) -> Result<&mut DocumentMut> {
        if !self.docs.contains_key(path) {
            let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            let doc = content.parse::<DocumentMut>().map_err(|e| {
                Error::manifest(
                    format!("Failed to parse {}: {e}", path.display()),
                    Some(path.to_path_buf()),
                )
            })?;
            self.docs.insert(path.to_path_buf(), (content, doc));
        }
        self.docs
            .get_mut(path)
            .map(|(_, doc)| doc)
            .ok_or_else(|| Error::manifest("Manifest was not loaded", Some(path.to_path_buf())))
    }

    fn write_changed(self) -> Result<()> {
        for (path, (original, doc)) in self.docs {
            let updated = doc.to_string();
            if updated == original {
                continue;
            }
            fs::write(&path, updated).map_err(|e| Error::io(&path, e))?;
            debug!(path = %path.display(), "Updated manifest");
        }
        Ok(())
    }
}

fn read_manifest(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    toml::from_str(&content).map_err(|e| {
        Error::manifest(
            format!("Failed to parse {}: {e}", path.display()),
            Some(path.to_path_buf()),
        )
    })
}

fn package_name(package: &toml::Value) -> Option<String> {
    package
        .get("name")
        .and_then(toml::Value::as_str)
        .map(str::to_string)
}

/// Resolve a package's version, following `version.workspace = true`.
///
/// Returns the version and whether it is inherited.
fn package_version(
    package: &toml::Value,
    workspace_version: Option<&str>,
    manifest_path: &Path,
) -> Result<(String, bool)> {
    match package.get("version") {
        None => Ok((IMPLICIT_PACKAGE_VERSION.to_string(), false)),
        Some(toml::Value::String(version)) => Ok((version.clone(), false)),
        Some(toml::Value::Table(table))
            if table.get("workspace").and_then(toml::Value::as_bool) == Some(true) =>
        {
            let version = workspace_version.ok_or_else(|| {
                Error::manifest(
                    "Package uses version.workspace = true but [workspace.package].version is not set",
                    Some(manifest_path.to_path_buf()),
                )
            })?;
            Ok((version.to_string(), true))
        }
        Some(_) => Err(Error::manifest(
            "Unsupported [package].version value",
            Some(manifest_path.to_path_buf()),
        )),
    }
}

/// Expand `[workspace].members` into member directories.
fn discover_members(root: &Path, manifest: &toml::Value) -> Result<Vec<PathBuf>> {
    let Some(workspace) = manifest.get("workspace") else {
        return Ok(Vec::new());
    };
    let manifest_path = root.join(MANIFEST_FILE);

    let excluded: HashSet<PathBuf> = workspace
        .get("exclude")
        .and_then(toml::Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(toml::Value::as_str)
        .map(|path| normalize(&root.join(path)))
        .collect();

    let mut paths = Vec::new();
    let patterns = workspace
        .get("members")
        .and_then(toml::Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(toml::Value::as_str);

    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            let full_pattern = root.join(pattern);
            let pattern_str = full_pattern.to_str().ok_or_else(|| {
                Error::manifest(
                    format!(
                        "Workspace member glob pattern contains invalid UTF-8: {}",
                        full_pattern.display()
                    ),
                    Some(manifest_path.clone()),
                )
            })?;
            let matches = glob::glob(pattern_str).map_err(|e| {
                Error::manifest(
                    format!("Invalid glob pattern '{pattern}': {e}"),
                    Some(manifest_path.clone()),
                )
            })?;
            paths.extend(matches.flatten().filter(|entry| entry.is_dir()));
        } else {
            paths.push(root.join(pattern));
        }
    }

    let mut seen = HashSet::new();
    paths.retain(|path| {
        let normalized = normalize(path);
        normalized != normalize(root) && !excluded.contains(&normalized) && seen.insert(normalized)
    });
    Ok(paths)
}

/// Drop `.` components so `./crates/a` and `crates/a` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

/// Workspace packages named by a manifest's dependency tables.
///
/// Only entries with a `path` key or `workspace = true` count; a registry
/// dependency that happens to share a package name is not an edge.
fn internal_dependencies(
    manifest: &toml::Value,
    tables: &[&str],
    internal: &HashMap<String, ModuleId>,
) -> Vec<ModuleId> {
    let targets = manifest
        .get("target")
        .and_then(toml::Value::as_table)
        .into_iter()
        .flat_map(|targets| targets.values());

    let mut found = Vec::new();
    for scope in std::iter::once(manifest).chain(targets) {
        for table_name in tables {
            let Some(table) = scope.get(*table_name).and_then(toml::Value::as_table) else {
                continue;
            };
            for (key, spec) in table {
                let Some(spec) = spec.as_table() else {
                    continue;
                };
                let is_local = spec.contains_key("path")
                    || spec.get("workspace").and_then(toml::Value::as_bool) == Some(true);
                let name = spec
                    .get("package")
                    .and_then(toml::Value::as_str)
                    .unwrap_or(key.as_str());
                if let Some(id) = internal.get(name).filter(|_| is_local)
                    && !found.contains(id)
                {
                    found.push(id.clone());
                }
            }
        }
    }
    found
}

fn set_workspace_version(doc: &mut DocumentMut, version: &str, path: &Path) -> Result<()> {
    let package = doc
        .get_mut("workspace")
        .and_then(|w| w.get_mut("package"))
        .and_then(Item::as_table_mut)
        .ok_or_else(|| {
            Error::manifest(
                "Root manifest is missing [workspace.package] table",
                Some(path.to_path_buf()),
            )
        })?;
    package["version"] = toml_edit::value(version);
    Ok(())
}

fn set_package_version(doc: &mut DocumentMut, version: &str, path: &Path) -> Result<()> {
    let package = doc
        .get_mut("package")
        .and_then(Item::as_table_mut)
        .ok_or_else(|| Error::manifest("Manifest is missing [package] table", Some(path.to_path_buf())))?;
    package["version"] = toml_edit::value(version);
    Ok(())
}

/// Update version requirements on internal path dependencies in every
/// dependency table of a package manifest.
fn update_manifest_requirements(doc: &mut DocumentMut, versions: &BTreeMap<String, String>) {
    let tables = BUILD_DEPENDENCY_TABLES
        .iter()
        .copied()
        .chain(std::iter::once(DEV_DEPENDENCY_TABLE));

    for table_name in tables.clone() {
        if let Some(deps) = doc.get_mut(table_name).and_then(Item::as_table_like_mut) {
            update_dependency_requirements(deps, versions);
        }
    }

    if let Some(targets) = doc.get_mut("target").and_then(Item::as_table_like_mut) {
        for (_, target) in targets.iter_mut() {
            for table_name in tables.clone() {
                if let Some(deps) = target.get_mut(table_name).and_then(Item::as_table_like_mut) {
                    update_dependency_requirements(deps, versions);
                }
            }
        }
    }
}

/// Rewrite the `version` requirement of every path dependency on a package
/// in `versions`. Entries without a `version` key are left alone.
fn update_dependency_requirements(deps: &mut dyn TableLike, versions: &BTreeMap<String, String>) {
    for (key, spec) in deps.iter_mut() {
        let name = spec
            .get("package")
            .and_then(Item::as_str)
            .unwrap_or_else(|| key.get())
            .to_string();
        let Some(new_version) = versions.get(&name) else {
            continue;
        };
        if spec.get("path").is_none() {
            continue;
        }
        let Some(spec) = spec.as_table_like_mut() else {
            continue;
        };
        let Some(old) = spec.get("version").and_then(Item::as_str).map(str::to_string) else {
            continue;
        };

        let Some(requirement) = rewrite_requirement(&old, new_version) else {
            debug!(dependency = %name, requirement = %old, "Leaving non-exact version requirement unchanged");
            continue;
        };
        if requirement == old {
            continue;
        }
        if let Some(Item::Value(value)) = spec.get_mut("version") {
            let decor = value.decor().clone();
            *value = toml_edit::Value::from(requirement);
            *value.decor_mut() = decor;
        }
    }
}

/// Replace the version in a requirement, keeping a leading `=`, `^` or `~`.
///
/// Only a single optional operator followed by one version is rewritten.
/// Ranges, comparisons and wildcards return `None`.
fn rewrite_requirement(old: &str, new_version: &str) -> Option<String> {
    let trimmed = old.trim();
    let (operator, version) = match trimmed.chars().next()? {
        op @ ('=' | '^' | '~') => (Some(op), trimmed[1..].trim_start()),
        _ => (None, trimmed),
    };

    let is_plain_version = version.starts_with(|c: char| c.is_ascii_digit())
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'));
    if !is_plain_version {
        return None;
    }

    Some(operator.map_or_else(|| new_version.to_string(), |op| format!("{op}{new_version}")))
}

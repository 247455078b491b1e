//! Adapter capabilities and the adapter registry.
//!
//! The resolution engine never touches the filesystem. A build-system
//! adapter supplies the two ends of a run:
//! - [`ModuleDetector`] - turns a repository into a [`ModuleGraph`]
//! - [`VersionWriter`] - persists the resolved versions
//!
//! [`AdapterIdentifier`] lets an [`AdapterRegistry`] pick the adapter for a
//! repository by asking each registered adapter in turn.

use crate::cargo::CargoAdapter;
use crate::error::{Error, Result};
use monobump_graph::{ModuleGraph, ModuleId};
use monobump_release::ModuleChangeResult;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Recognises repositories managed by one build system.
pub trait AdapterIdentifier: Send + Sync {
    /// Short adapter name used in logs (e.g. "cargo").
    fn name(&self) -> &str;

    /// Whether the repository at `root` belongs to this build system.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository could not be inspected.
    fn recognizes(&self, root: &Path) -> Result<bool>;
}

/// Discovers the modules of a repository.
pub trait ModuleDetector: Send + Sync {
    /// Build the module graph for the repository at `root`.
    ///
    /// The graph must contain the root module `:`.
    ///
    /// # Errors
    ///
    /// Returns an error if build files cannot be read or describe an invalid graph.
    fn detect(&self, root: &Path) -> Result<ModuleGraph>;
}

/// Persists resolved versions.
pub trait VersionWriter: Send + Sync {
    /// Write `versions` into the repository's build files.
    ///
    /// Modules absent from `versions` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if a build file cannot be updated.
    fn write_versions(&self, root: &Path, versions: &BTreeMap<ModuleId, String>) -> Result<()>;
}

/// A complete build-system integration.
pub trait BuildSystemAdapter: AdapterIdentifier + ModuleDetector + VersionWriter {}

impl<T> BuildSystemAdapter for T where T: AdapterIdentifier + ModuleDetector + VersionWriter {}

/// Ordered set of adapters consulted when identifying a repository.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn BuildSystemAdapter>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.names())
            .finish()
    }
}

impl AdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the adapters shipped with this crate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with_adapter(CargoAdapter::new())
    }

    /// Adds an adapter after the ones already registered.
    #[must_use]
    pub fn with_adapter(mut self, adapter: impl BuildSystemAdapter + 'static) -> Self {
        self.register(adapter);
        self
    }

    /// Adds an adapter after the ones already registered.
    pub fn register(&mut self, adapter: impl BuildSystemAdapter + 'static) {
        self.adapters.push(Box::new(adapter));
    }

    /// Registered adapter names, in identification order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Find the first adapter that recognizes `root`.
    ///
    /// A check that fails is logged and counts as a non-match.
    #[must_use]
    pub fn identify(&self, root: &Path) -> Option<&dyn BuildSystemAdapter> {
        for adapter in &self.adapters {
            match adapter.recognizes(root) {
                Ok(true) => {
                    debug!(adapter = adapter.name(), root = %root.display(), "Adapter matched");
                    return Some(adapter.as_ref());
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        adapter = adapter.name(),
                        root = %root.display(),
                        error = %e,
                        "Adapter check failed, skipping"
                    );
                }
            }
        }
        None
    }

    /// Like [`identify`](Self::identify), but fails when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAdapter`] if no registered adapter accepts `root`.
    pub fn require(&self, root: &Path) -> Result<&dyn BuildSystemAdapter> {
        self.identify(root).ok_or_else(|| Error::NoAdapter {
            root: root.to_path_buf(),
        })
    }
}

/// The versions a writer should persist: bumped modules only.
#[must_use]
pub fn versions_to_write(results: &[ModuleChangeResult]) -> BTreeMap<ModuleId, String> {
    results
        .iter()
        .filter(|result| result.is_bumped())
        .map(|result| (result.module_id.clone(), result.new_version.clone()))
        .collect()
}

/// Persist the bumped versions from a resolution run.
///
/// With `dry_run` set, nothing is written and the planned changes are only
/// logged. Returns the versions that were (or would have been) written.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_results<W: VersionWriter + ?Sized>(
    writer: &W,
    root: &Path,
    results: &[ModuleChangeResult],
    dry_run: bool,
) -> Result<BTreeMap<ModuleId, String>> {
    let versions = versions_to_write(results);
    if versions.is_empty() {
        info!("No module versions changed");
        return Ok(versions);
    }

    if dry_run {
        for (id, version) in &versions {
            info!(module = %id, version = %version, "[dry-run] Would write version");
        }
        return Ok(versions);
    }

    writer.write_versions(root, &versions)?;
    info!(modules = versions.len(), "Wrote module versions");
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monobump_graph::Module;
    use monobump_release::BumpLevel;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FakeAdapter {
        name: &'static str,
        recognizes: fn(&Path) -> Result<bool>,
        written: Mutex<Vec<BTreeMap<ModuleId, String>>>,
    }

    impl FakeAdapter {
        fn new(name: &'static str, recognizes: fn(&Path) -> Result<bool>) -> Self {
            Self {
                name,
                recognizes,
                written: Mutex::new(Vec::new()),
            }
        }
    }

    impl AdapterIdentifier for FakeAdapter {
        fn name(&self) -> &str {
            self.name
        }

        fn recognizes(&self, root: &Path) -> Result<bool> {
            (self.recognizes)(root)
        }
    }

    impl ModuleDetector for FakeAdapter {
        fn detect(&self, _root: &Path) -> Result<ModuleGraph> {
            Ok(ModuleGraph::new([Module::new(ModuleId::root(), "1.0.0")])?)
        }
    }

    impl VersionWriter for FakeAdapter {
        fn write_versions(&self, _root: &Path, versions: &BTreeMap<ModuleId, String>) -> Result<()> {
            self.written.lock().unwrap().push(versions.clone());
            Ok(())
        }
    }

    fn change(id: &str, level: BumpLevel, new_version: &str) -> ModuleChangeResult {
        ModuleChangeResult {
            module_id: id.parse().unwrap(),
            previous_version: "1.0.0".to_string(),
            new_version: new_version.to_string(),
            bump_level: level,
            commits: vec![],
        }
    }

    #[test]
    fn test_identify_first_match_wins() {
        let registry = AdapterRegistry::new()
            .with_adapter(FakeAdapter::new("never", |_| Ok(false)))
            .with_adapter(FakeAdapter::new("first", |_| Ok(true)))
            .with_adapter(FakeAdapter::new("second", |_| Ok(true)));

        let adapter = registry.identify(Path::new(".")).unwrap();
        assert_eq!(adapter.name(), "first");
    }

    #[test]
    fn test_identify_skips_failing_check() {
        let registry = AdapterRegistry::new()
            .with_adapter(FakeAdapter::new("broken", |root| {
                Err(Error::manifest("unreadable", Some(root.to_path_buf())))
            }))
            .with_adapter(FakeAdapter::new("fallback", |_| Ok(true)));

        assert_eq!(registry.identify(Path::new(".")).unwrap().name(), "fallback");
    }

    #[test]
    fn test_identify_none_matches() {
        let registry = AdapterRegistry::new().with_adapter(FakeAdapter::new("never", |_| Ok(false)));
        assert!(registry.identify(Path::new(".")).is_none());

        let Err(err) = registry.require(Path::new("/repo")) else {
            panic!("expected no adapter to match");
        };
        assert!(matches!(err, Error::NoAdapter { root } if root == PathBuf::from("/repo")));
    }

    #[test]
    fn test_registry_names_in_order() {
        let mut registry = AdapterRegistry::new();
        assert!(registry.is_empty());
        registry.register(FakeAdapter::new("a", |_| Ok(false)));
        registry.register(FakeAdapter::new("b", |_| Ok(false)));
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_builtin_registry() {
        assert_eq!(AdapterRegistry::builtin().names(), vec!["cargo"]);
    }

    #[test]
    fn test_versions_to_write_skips_unbumped() {
        let results = vec![
            change(":", BumpLevel::None, "1.0.0"),
            change(":lib", BumpLevel::Minor, "1.1.0"),
        ];
        let versions = versions_to_write(&results);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[&":lib".parse::<ModuleId>().unwrap()], "1.1.0");
    }

    #[test]
    fn test_write_results_dry_run() {
        let adapter = FakeAdapter::new("fake", |_| Ok(true));
        let results = vec![change(":lib", BumpLevel::Patch, "1.0.1")];

        let planned = write_results(&adapter, Path::new("."), &results, true).unwrap();
        assert_eq!(planned.len(), 1);
        assert!(adapter.written.lock().unwrap().is_empty());

        write_results(&adapter, Path::new("."), &results, false).unwrap();
        assert_eq!(adapter.written.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_write_results_nothing_bumped() {
        let adapter = FakeAdapter::new("fake", |_| Ok(true));
        let results = vec![change(":", BumpLevel::None, "1.0.0")];
        let written = write_results(&adapter, Path::new("."), &results, false).unwrap();
        assert!(written.is_empty());
        assert!(adapter.written.lock().unwrap().is_empty());
    }
}

//! Resolution orchestrator.
//!
//! Composes classification, propagation and version arithmetic into the one
//! operation external collaborators call. A run either yields a result for
//! every module or fails without producing anything.

use crate::bump::BumpLevel;
use crate::commit::{CommitInfo, classify, direct_bump_for_module};
use crate::config::VersionRules;
use crate::error::Result;
use crate::propagate::propagate;
use crate::version::{apply_snapshot_suffix, next_version};
use monobump_graph::{Error as GraphError, ModuleGraph, ModuleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Outcome of a resolution run for a single module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleChangeResult {
    /// The module this result describes.
    pub module_id: ModuleId,
    /// Version before the run.
    pub previous_version: String,
    /// Version after the run; equal to `previous_version` when not bumped.
    pub new_version: String,
    /// The level actually applied, possibly `None`.
    pub bump_level: BumpLevel,
    /// Commits that contributed to the module's own (non-propagated) bump.
    pub commits: Vec<CommitInfo>,
}

impl ModuleChangeResult {
    /// Whether the module receives a new version.
    #[must_use]
    pub fn is_bumped(&self) -> bool {
        !self.bump_level.is_none()
    }
}

/// Version resolver.
///
/// Holds the policy and run options for one or more resolution runs.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    rules: &'a VersionRules,
    snapshot: bool,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for release (non-snapshot) runs.
    #[must_use]
    pub const fn new(rules: &'a VersionRules) -> Self {
        Self {
            rules,
            snapshot: false,
        }
    }

    /// Sets snapshot mode.
    ///
    /// In snapshot mode, bumped modules whose build system supports it get
    /// the `-SNAPSHOT` qualifier appended to their new version.
    #[must_use]
    pub const fn with_snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Returns the policy in use.
    #[must_use]
    pub const fn rules(&self) -> &VersionRules {
        self.rules
    }

    /// Compute the new version of every module in `graph`.
    ///
    /// Results are returned in topological order, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The graph has no root module
    /// - The graph has a dependency cycle
    /// - `commits_by_module` references a module not in the graph
    /// - A module's current version does not parse
    pub fn resolve(
        &self,
        graph: &ModuleGraph,
        commits_by_module: &BTreeMap<ModuleId, Vec<CommitInfo>>,
    ) -> Result<Vec<ModuleChangeResult>> {
        graph.root()?;
        if let Some(unknown) = commits_by_module.keys().find(|id| !graph.contains(id)) {
            return Err(GraphError::unknown_module(unknown).into());
        }

        let mut direct = BTreeMap::new();
        for module in graph.modules() {
            let commits = commits_by_module
                .get(&module.id)
                .map_or(&[][..], Vec::as_slice);
            direct.insert(
                module.id.clone(),
                direct_bump_for_module(&module.id, commits, self.rules),
            );
        }

        let effective = propagate(graph, &direct, self.rules)?;
        let order = graph.topological_order()?;

        let mut results = Vec::with_capacity(order.len());
        for id in order {
            let Some(module) = graph.module(&id) else {
                return Err(GraphError::unknown_module(&id).into());
            };
            let level = effective.get(&id).copied().unwrap_or_default();

            let mut new_version =
                next_version(&module.current_version, level).map_err(|e| e.for_module(&id))?;
            if self.snapshot && module.supports_snapshots && !level.is_none() {
                new_version = apply_snapshot_suffix(&new_version);
            }

            let commits: Vec<CommitInfo> = commits_by_module
                .get(&id)
                .into_iter()
                .flatten()
                .filter(|commit| !classify(commit, self.rules).is_none())
                .cloned()
                .collect();

            debug!(
                module = %id,
                from = %module.current_version,
                to = %new_version,
                %level,
                "Resolved module version"
            );

            results.push(ModuleChangeResult {
                module_id: id,
                previous_version: module.current_version.clone(),
                new_version,
                bump_level: level,
                commits,
            });
        }

        info!(
            modules = results.len(),
            bumped = results.iter().filter(|r| r.is_bumped()).count(),
            snapshot = self.snapshot,
            "Resolved module versions"
        );

        Ok(results)
    }
}

/// Resolve versions for a release run with the given policy.
///
/// Shorthand for `Resolver::new(rules).resolve(graph, commits_by_module)`.
///
/// # Errors
///
/// See [`Resolver::resolve`].
pub fn resolve(
    graph: &ModuleGraph,
    commits_by_module: &BTreeMap<ModuleId, Vec<CommitInfo>>,
    rules: &VersionRules,
) -> Result<Vec<ModuleChangeResult>> {
    Resolver::new(rules).resolve(graph, commits_by_module)
}

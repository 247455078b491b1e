//! Cascading of bump levels through the dependency graph.
//!
//! Modules are visited in topological order, so every dependency's effective
//! level is final before any dependent reads it. Since levels only grow under
//! `merge`, one pass is enough and the outcome does not depend on how
//! unrelated modules are ordered relative to each other.

use crate::bump::BumpLevel;
use crate::config::VersionRules;
use crate::error::Result;
use monobump_graph::{Error as GraphError, ModuleGraph, ModuleId};
use std::collections::BTreeMap;
use tracing::debug;

/// Compute each module's effective bump level.
///
/// `direct` holds the levels derived from each module's own commits; modules
/// absent from it start at `None`. The result contains every module in the
/// graph.
///
/// # Errors
///
/// Returns an error if the graph has a dependency cycle or `direct` names a
/// module that is not in the graph. Nothing is computed in either case.
pub fn propagate(
    graph: &ModuleGraph,
    direct: &BTreeMap<ModuleId, BumpLevel>,
    rules: &VersionRules,
) -> Result<BTreeMap<ModuleId, BumpLevel>> {
    if let Some(unknown) = direct.keys().find(|id| !graph.contains(id)) {
        return Err(GraphError::unknown_module(unknown).into());
    }
    let order = graph.topological_order()?;
    propagate_in_order(graph, &order, direct, rules)
}

/// Single pass over a given linearization of the graph.
///
/// `order` must list every module with dependencies before dependents.
pub(crate) fn propagate_in_order(
    graph: &ModuleGraph,
    order: &[ModuleId],
    direct: &BTreeMap<ModuleId, BumpLevel>,
    rules: &VersionRules,
) -> Result<BTreeMap<ModuleId, BumpLevel>> {
    let mut effective: BTreeMap<ModuleId, BumpLevel> = BTreeMap::new();

    for id in order {
        let own = direct.get(id).copied().unwrap_or_default();
        let mut level = own;

        for dependency in graph.dependencies_of(id)? {
            let dependency_level = effective.get(dependency).copied().unwrap_or_default();
            level = level.merge(rules.bump_for_dependency(dependency_level));
        }

        if level > own {
            debug!(module = %id, direct = %own, effective = %level, "Bump raised by dependencies");
        }
        effective.insert(id.clone(), level);
    }

    Ok(effective)
}

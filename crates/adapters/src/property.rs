//! Version property naming convention.
//!
//! Build systems that keep every module version in one flat properties file
//! name the entry after the module's last path segment: `:lib:core` is stored
//! as `core.version` and the root module as plain `version`. Two modules with
//! the same last segment would share an entry, so callers check for
//! collisions before writing.

use crate::error::{Error, Result};
use monobump_graph::{ModuleGraph, ModuleId};
use std::collections::BTreeMap;

/// Property key holding the root module's version.
pub const VERSION_PROPERTY: &str = "version";

/// The property name holding `id`'s version.
#[must_use]
pub fn version_property_name(id: &ModuleId) -> String {
    id.last_segment().map_or_else(
        || VERSION_PROPERTY.to_string(),
        |segment| format!("{segment}.{VERSION_PROPERTY}"),
    )
}

/// Find the module whose version lives under `property`.
///
/// Returns `Ok(None)` when no module maps to the name.
///
/// # Errors
///
/// Returns [`Error::PropertyNameCollision`] if more than one module maps to it.
pub fn module_for_property(property: &str, graph: &ModuleGraph) -> Result<Option<ModuleId>> {
    let mut matches: Vec<ModuleId> = graph
        .modules()
        .filter(|module| version_property_name(&module.id) == property)
        .map(|module| module.id.clone())
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => {
            matches.sort();
            Err(Error::PropertyNameCollision {
                property: property.to_string(),
                modules: matches,
            })
        }
    }
}

/// Every property name claimed by more than one module, with the claimants.
#[must_use]
pub fn property_collisions<'a>(
    ids: impl IntoIterator<Item = &'a ModuleId>,
) -> BTreeMap<String, Vec<ModuleId>> {
    let mut by_property: BTreeMap<String, Vec<ModuleId>> = BTreeMap::new();
    for id in ids {
        by_property
            .entry(version_property_name(id))
            .or_default()
            .push(id.clone());
    }
    by_property.retain(|_, modules| modules.len() > 1);
    for modules in by_property.values_mut() {
        modules.sort();
    }
    by_property
}

/// Verify that no two modules in `graph` share a version property.
///
/// # Errors
///
/// Returns [`Error::PropertyNameCollision`] for the first colliding property
/// name in lexicographic order.
pub fn check_property_collisions(graph: &ModuleGraph) -> Result<()> {
    match property_collisions(graph.modules().map(|module| &module.id))
        .into_iter()
        .next()
    {
        Some((property, modules)) => Err(Error::PropertyNameCollision { property, modules }),
        None => Ok(()),
    }
}

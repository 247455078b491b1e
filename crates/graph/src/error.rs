//! Error types for module graph operations.

use crate::ModuleId;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for module graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a module graph.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum Error {
    /// The dependency relation contains a cycle.
    #[error("Dependency cycle detected: {}", format_cycle(.cycle))]
    #[diagnostic(
        code(monobump::graph::cycle),
        help("Remove one of the dependency declarations along the cycle")
    )]
    DependencyCycle {
        /// Closed path through the cycle; the first and last entries are the same module.
        cycle: Vec<ModuleId>,
    },

    /// A module id that is not part of the graph was referenced.
    #[error("Unknown module: {id}")]
    #[diagnostic(code(monobump::graph::unknown_module))]
    UnknownModule {
        /// The id that could not be found.
        id: ModuleId,
    },

    /// A module declares a dependency on a module that is not in the registry.
    #[error("Module '{module}' depends on unknown module '{dependency}'")]
    #[diagnostic(
        code(monobump::graph::dangling_dependency),
        help("Every dependency must reference a module discovered in the same repository")
    )]
    DanglingDependency {
        /// The module declaring the dependency.
        module: ModuleId,
        /// The id that does not exist.
        dependency: ModuleId,
    },

    /// Two modules were registered with the same id.
    #[error("Duplicate module id: {id}")]
    #[diagnostic(code(monobump::graph::duplicate_module))]
    DuplicateModule {
        /// The repeated id.
        id: ModuleId,
    },

    /// No module carries the root id.
    #[error("No root module ('{}') found in the module graph", crate::ROOT_MODULE_ID)]
    #[diagnostic(
        code(monobump::graph::missing_root),
        help("The build-system adapter must always register the top-level project as ':'")
    )]
    MissingRootModule,

    /// A string could not be parsed as a module id.
    #[error("Invalid module id '{id}': {reason}")]
    #[diagnostic(
        code(monobump::graph::invalid_module_id),
        help("Module ids are colon-delimited paths such as ':' or ':lib:core'")
    )]
    InvalidModuleId {
        /// The rejected input.
        id: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl Error {
    /// Create a new invalid module id error.
    #[must_use]
    pub fn invalid_module_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidModuleId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unknown module error.
    #[must_use]
    pub fn unknown_module(id: &ModuleId) -> Self {
        Self::UnknownModule { id: id.clone() }
    }
}

fn format_cycle(cycle: &[ModuleId]) -> String {
    cycle
        .iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

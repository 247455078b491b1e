//! Module dependency graph for monobump.
//!
//! This crate models the buildable units of a monorepo as an immutable
//! directed graph backed by petgraph. Modules live in a flat arena and
//! dependency edges are index based, so ordering and cycle detection are
//! plain iterative algorithms with no shared ownership between nodes.
//!
//! # Key Types
//!
//! - [`ModuleId`]: Colon-delimited hierarchical identifier (`:` is the root)
//! - [`Module`]: A versionable unit with its current version and declared dependencies
//! - [`ModuleGraph`]: Read-only view used by the release engine
//!
//! # Example
//!
//! ```ignore
//! use monobump_graph::{Module, ModuleGraph, ModuleId};
//!
//! let lib: ModuleId = ":lib".parse()?;
//! let graph = ModuleGraph::new([
//!     Module::new(ModuleId::root(), "1.0.0"),
//!     Module::new(lib.clone(), "1.0.0"),
//!     Module::new(":app".parse()?, "2.3.1").with_dependency(lib),
//! ])?;
//!
//! // Dependencies always come before their dependents
//! let order = graph.topological_order()?;
//! ```

mod error;
mod graph;
mod module;
mod validation;

pub use error::{Error, Result};
pub use graph::ModuleGraph;
pub use module::{Module, ModuleId, ROOT_MODULE_ID};
pub use validation::ValidationResult;

//! Version resolution engine for monobump.
//!
//! Given a module dependency graph, commits classified by conventional-commit
//! type, and a version policy, this crate computes the next semantic version
//! of every module, including bumps that cascade from changed dependencies.
//! It performs no I/O: discovering modules, reading git history and writing
//! versions back are left to build-system adapters.
//!
//! # Architecture
//!
//! - [`bump`] - The `None < Patch < Minor < Major` lattice and its `max` merge
//! - [`config`] - [`VersionRules`], the operator-supplied policy
//! - [`commit`] - Commit records and the commit classifier
//! - [`propagate`] - Single-pass cascading over the topological order
//! - [`version`] - Semantic version arithmetic and the snapshot suffix
//! - [`orchestrator`] - [`Resolver`] and [`resolve`], the public entry point
//!
//! # Example
//!
//! ```rust,ignore
//! use monobump_graph::{Module, ModuleGraph, ModuleId};
//! use monobump_release::{CommitInfo, VersionRules, group_by_module, resolve};
//!
//! let lib: ModuleId = ":lib".parse()?;
//! let graph = ModuleGraph::new([
//!     Module::new(ModuleId::root(), "1.0.0"),
//!     Module::new(lib.clone(), "1.0.0"),
//! ])?;
//!
//! let commits = group_by_module(&[CommitInfo::new("abc123", "feat").with_module(lib)]);
//! for change in resolve(&graph, &commits, &VersionRules::default())? {
//!     println!("{}: {} -> {}", change.module_id, change.previous_version, change.new_version);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod bump;
pub mod commit;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod propagate;
pub mod version;

// Re-export main types
pub use bump::BumpLevel;
pub use commit::{CommitInfo, classify, direct_bump_for_module, group_by_module};
pub use config::VersionRules;
pub use error::{Error, Result};
pub use orchestrator::{ModuleChangeResult, Resolver, resolve};
pub use propagate::propagate;
pub use version::{
    SNAPSHOT_SUFFIX, Version, apply_snapshot_suffix, is_snapshot, next_version,
    strip_snapshot_suffix,
};

//! Build-system adapters for monobump.
//!
//! The resolution engine in `monobump-release` works on an in-memory
//! [`ModuleGraph`](monobump_graph::ModuleGraph). This crate connects it to
//! real repositories: adapters discover modules and their dependencies from
//! build files, and write resolved versions back.
//!
//! - [`adapter`] - capability traits and the [`AdapterRegistry`]
//! - [`property`] - the `<segment>.version` naming convention
//! - [`cargo`] - Cargo workspaces
//! - [`properties`] - `gradle.properties`-style version files

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod adapter;
pub mod cargo;
pub mod error;
pub mod properties;
pub mod property;

pub use adapter::{
    AdapterIdentifier, AdapterRegistry, BuildSystemAdapter, ModuleDetector, VersionWriter,
    versions_to_write, write_results,
};
pub use cargo::CargoAdapter;
pub use error::{Error, Result};
pub use properties::{DEFAULT_PROPERTIES_FILE, PropertiesVersionWriter, render};
pub use property::{
    VERSION_PROPERTY, check_property_collisions, module_for_property, property_collisions,
    version_property_name,
};

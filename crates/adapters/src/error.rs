//! Error types for build-system adapters.

use miette::Diagnostic;
use monobump_graph::ModuleId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while detecting modules or writing versions back.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Structural problem in the detected module graph.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] monobump_graph::Error),

    /// A build file could not be read, parsed or written.
    #[error("Manifest error: {message}")]
    #[diagnostic(
        code(monobump::adapters::manifest),
        help("Check that the manifest file exists and is properly formatted")
    )]
    Manifest {
        /// The error message
        message: String,
        /// The manifest file path
        path: Option<PathBuf>,
    },

    /// Filesystem error while accessing a build file.
    #[error("I/O error on {}: {source}", .path.display())]
    #[diagnostic(code(monobump::adapters::io))]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },

    /// Several modules map to the same version property.
    #[error(
        "Modules {} all map to version property '{property}'",
        format_modules(.modules)
    )]
    #[diagnostic(
        code(monobump::adapters::property_collision),
        help("Rename one of the modules so that their last path segments differ")
    )]
    PropertyNameCollision {
        /// The shared property name.
        property: String,
        /// Every module that maps to it.
        modules: Vec<ModuleId>,
    },

    /// No registered adapter recognised the repository.
    #[error("No build-system adapter recognises {}", .root.display())]
    #[diagnostic(
        code(monobump::adapters::no_adapter),
        help("Register an adapter for this repository's build system")
    )]
    NoAdapter {
        /// The repository root that was inspected.
        root: PathBuf,
    },
}

impl Error {
    /// Create a new manifest error.
    #[must_use]
    pub fn manifest(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Manifest {
            message: message.into(),
            path,
        }
    }

    /// Create a new I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_modules(modules: &[ModuleId]) -> String {
    modules
        .iter()
        .map(|id| format!("'{id}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error() {
        let err = Error::manifest("No version found", Some(PathBuf::from("Cargo.toml")));
        assert_eq!(err.to_string(), "Manifest error: No version found");
    }

    #[test]
    fn test_collision_lists_modules() {
        let err = Error::PropertyNameCollision {
            property: "core.version".to_string(),
            modules: vec![":lib:core".parse().unwrap(), ":app:core".parse().unwrap()],
        };
        let msg = err.to_string();
        assert!(msg.contains("':lib:core', ':app:core'"));
        assert!(msg.contains("'core.version'"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io(
            "gradle.properties",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("gradle.properties"));
    }
}

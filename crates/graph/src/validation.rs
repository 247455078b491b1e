//! Up-front validation of module graphs.
//!
//! Adapters call this after discovery so every structural problem can be
//! reported at once instead of one fatal error per resolution attempt.

use crate::{Error, ModuleGraph};

/// Result of graph validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph can be resolved (has a root, no cycles).
    pub is_valid: bool,
    /// List of validation errors, if any.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// Create a valid result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create an invalid result with errors.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

impl ModuleGraph {
    /// Validate the graph structure.
    ///
    /// Checks for:
    /// - A module with the root id
    /// - Cycles in the dependency relation
    ///
    /// Duplicate ids and dangling dependencies are rejected when the graph is
    /// constructed, so they never show up here.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if let Err(err) = self.root() {
            errors.push(err);
        }
        if let Err(err) = self.topological_order() {
            errors.push(err);
        }

        if errors.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(errors)
        }
    }
}

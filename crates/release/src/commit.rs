//! Commit records and the commit classifier.
//!
//! Commit retrieval and path-to-module mapping happen upstream; this module
//! only turns already-associated commits into direct bump levels.

use crate::bump::BumpLevel;
use crate::config::VersionRules;
use monobump_graph::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// A single historical change, classified by conventional-commit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    /// The full commit hash.
    pub hash: String,
    /// The commit type (feat, fix, chore, etc.); empty when unknown.
    pub commit_type: String,
    /// Whether the commit carries a breaking-change marker.
    #[serde(default)]
    pub breaking: bool,
    /// The commit description (first line after the type).
    #[serde(default)]
    pub description: String,
    /// Modules whose code the commit touches.
    #[serde(default)]
    pub modules: Vec<ModuleId>,
}

impl CommitInfo {
    /// Create a non-breaking commit with no module association.
    #[must_use]
    pub fn new(hash: impl Into<String>, commit_type: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            commit_type: commit_type.into(),
            breaking: false,
            description: String::new(),
            modules: Vec::new(),
        }
    }

    /// Build a commit from its raw message.
    ///
    /// Messages following the Conventional Commits format contribute their
    /// type and breaking marker (`!` or a `BREAKING CHANGE` footer). Anything
    /// else gets an empty type and is classified with the default bump.
    #[must_use]
    pub fn from_message(
        hash: impl Into<String>,
        message: &str,
        modules: impl IntoIterator<Item = ModuleId>,
    ) -> Self {
        let modules = modules.into_iter().collect();
        match git_conventional::Commit::parse(message.trim()) {
            Ok(parsed) => Self {
                hash: hash.into(),
                commit_type: parsed.type_().to_string().to_ascii_lowercase(),
                breaking: parsed.breaking(),
                description: parsed.description().to_string(),
                modules,
            },
            Err(_) => Self {
                hash: hash.into(),
                commit_type: String::new(),
                breaking: false,
                description: message.lines().next().unwrap_or_default().trim().to_string(),
                modules,
            },
        }
    }

    /// Set the breaking-change marker.
    #[must_use]
    pub const fn with_breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Associate the commit with a module.
    #[must_use]
    pub fn with_module(mut self, module: ModuleId) -> Self {
        if !self.modules.contains(&module) {
            self.modules.push(module);
        }
        self
    }
}

/// Direct bump level for a single commit.
///
/// A breaking-change marker always yields `Major`; otherwise the type is
/// looked up in the policy, falling back to its default.
#[must_use]
pub fn classify(commit: &CommitInfo, rules: &VersionRules) -> BumpLevel {
    if commit.breaking {
        return BumpLevel::Major;
    }
    rules.bump_for_type(&commit.commit_type)
}

/// Merge the classification of every commit associated with `module`.
///
/// `commits` is the module's entry in the commit-to-module association;
/// `None` when it is empty.
#[must_use]
pub fn direct_bump_for_module(
    module: &ModuleId,
    commits: &[CommitInfo],
    rules: &VersionRules,
) -> BumpLevel {
    let level = BumpLevel::merge_all(commits.iter().map(|c| classify(c, rules)));
    trace!(%module, commits = commits.len(), %level, "Classified module commits");
    level
}

/// Build the commit-to-module association from each commit's module list.
///
/// A commit touching several modules is listed under each of them. Commits
/// with no association are dropped since they bump nothing. Only exact
/// repeats of the same commit are collapsed.
#[must_use]
pub fn group_by_module(commits: &[CommitInfo]) -> BTreeMap<ModuleId, Vec<CommitInfo>> {
    let mut grouped: BTreeMap<ModuleId, Vec<CommitInfo>> = BTreeMap::new();
    for commit in commits {
        for module in &commit.modules {
            let entry = grouped.entry(module.clone()).or_default();
            if !entry.contains(commit) {
                entry.push(commit.clone());
            }
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ModuleId {
        s.parse().unwrap()
    }

    fn rules() -> VersionRules {
        VersionRules::new(BumpLevel::Patch)
            .with_commit_type("feat", BumpLevel::Minor)
            .with_commit_type("fix", BumpLevel::Patch)
            .with_commit_type("chore", BumpLevel::None)
    }

    #[test]
    fn test_classify_by_type() {
        let rules = rules();
        assert_eq!(classify(&CommitInfo::new("a", "feat"), &rules), BumpLevel::Minor);
        assert_eq!(classify(&CommitInfo::new("b", "fix"), &rules), BumpLevel::Patch);
        assert_eq!(classify(&CommitInfo::new("c", "chore"), &rules), BumpLevel::None);
    }

    #[test]
    fn test_classify_unknown_and_empty_type() {
        let rules = rules();
        assert_eq!(classify(&CommitInfo::new("a", "style"), &rules), BumpLevel::Patch);
        assert_eq!(classify(&CommitInfo::new("b", ""), &rules), BumpLevel::Patch);
    }

    #[test]
    fn test_breaking_overrides_type() {
        let rules = rules();
        let commit = CommitInfo::new("a", "chore").with_breaking(true);
        assert_eq!(classify(&commit, &rules), BumpLevel::Major);
    }

    #[test]
    fn test_direct_bump_merges_commits() {
        let rules = rules();
        let commits = vec![
            CommitInfo::new("a", "fix"),
            CommitInfo::new("b", "feat"),
            CommitInfo::new("c", "chore"),
        ];
        assert_eq!(direct_bump_for_module(&id(":lib"), &commits, &rules), BumpLevel::Minor);
        assert_eq!(direct_bump_for_module(&id(":lib"), &[], &rules), BumpLevel::None);
    }

    #[test]
    fn test_from_message_conventional() {
        let commit = CommitInfo::from_message("abc", "feat(core): add parser", [id(":core")]);
        assert_eq!(commit.commit_type, "feat");
        assert!(!commit.breaking);
        assert_eq!(commit.description, "add parser");
        assert_eq!(commit.modules, vec![id(":core")]);
    }

    #[test]
    fn test_from_message_breaking_marker() {
        let bang = CommitInfo::from_message("a", "fix!: drop old api", []);
        assert!(bang.breaking);

        let footer = CommitInfo::from_message(
            "b",
            "fix: rename field\n\nBREAKING CHANGE: `name` is now `title`",
            [],
        );
        assert!(footer.breaking);
        assert_eq!(footer.commit_type, "fix");
    }

    #[test]
    fn test_from_message_not_conventional() {
        let commit = CommitInfo::from_message("a", "Update README\n\nmore text", []);
        assert!(commit.commit_type.is_empty());
        assert!(!commit.breaking);
        assert_eq!(commit.description, "Update README");
    }

    #[test]
    fn test_group_by_module() {
        let shared = CommitInfo::new("s", "fix")
            .with_module(id(":a"))
            .with_module(id(":b"))
            .with_module(id(":a"));
        let only_a = CommitInfo::new("x", "feat").with_module(id(":a"));
        let orphan = CommitInfo::new("o", "feat");

        let grouped = group_by_module(&[shared, only_a, orphan]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&id(":a")].len(), 2);
        assert_eq!(grouped[&id(":b")].len(), 1);
        assert_eq!(grouped[&id(":b")][0].hash, "s");
    }

    #[test]
    fn test_group_by_module_keeps_distinct_commits_sharing_hash() {
        let fix = CommitInfo::new("", "fix").with_module(id(":lib"));
        let breaking = CommitInfo::new("", "feat")
            .with_breaking(true)
            .with_module(id(":lib"));

        let grouped = group_by_module(&[fix.clone(), breaking, fix]);
        assert_eq!(grouped[&id(":lib")].len(), 2);
        assert_eq!(
            direct_bump_for_module(&id(":lib"), &grouped[&id(":lib")], &rules()),
            BumpLevel::Major
        );
    }

    #[test]
    fn test_root_scoped_commit_is_grouped_under_root() {
        let commit = CommitInfo::new("r", "feat").with_module(ModuleId::root());
        let grouped = group_by_module(&[commit]);
        assert!(grouped.contains_key(&ModuleId::root()));
    }
}

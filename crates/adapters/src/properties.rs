//! Version write-back for flat properties files such as `gradle.properties`.
//!
//! Each module's version is stored under the name given by
//! [`version_property_name`]. Existing entries are rewritten in place
//! (every occurrence of a repeated key),
//! keeping comments, ordering and separator style; entries that do not
//! exist yet are appended.

use crate::adapter::VersionWriter;
use crate::error::{Error, Result};
use crate::property::{property_collisions, version_property_name};
use monobump_graph::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// File name used when none is configured.
pub const DEFAULT_PROPERTIES_FILE: &str = "gradle.properties";

/// Writes module versions into a properties file at the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertiesVersionWriter {
    /// Properties file, relative to the repository root.
    pub file_name: String,
}

impl Default for PropertiesVersionWriter {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_PROPERTIES_FILE.to_string(),
        }
    }
}

impl PropertiesVersionWriter {
    /// Creates a writer for `gradle.properties`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different properties file.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

impl VersionWriter for PropertiesVersionWriter {
    fn write_versions(&self, root: &Path, versions: &BTreeMap<ModuleId, String>) -> Result<()> {
        let path = root.join(&self.file_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::io(&path, e)),
        };

        let updated = render(&content, versions)?;
        if updated != content {
            fs::write(&path, updated).map_err(|e| Error::io(&path, e))?;
            debug!(path = %path.display(), modules = versions.len(), "Updated version properties");
        }
        Ok(())
    }
}

/// Apply `versions` to the text of a properties file.
///
/// # Errors
///
/// Returns [`Error::PropertyNameCollision`] if two of the modules share a
/// property name.
pub fn render(content: &str, versions: &BTreeMap<ModuleId, String>) -> Result<String> {
    if let Some((property, modules)) = property_collisions(versions.keys()).into_iter().next() {
        return Err(Error::PropertyNameCollision { property, modules });
    }

    let wanted: BTreeMap<String, &str> = versions
        .iter()
        .map(|(id, version)| (version_property_name(id), version.as_str()))
        .collect();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    let mut out = String::with_capacity(content.len());
    let mut continuation = false;
    for line in content.split_inclusive('\n') {
        let is_continuation = continuation;
        continuation = ends_with_continuation(line.trim_end_matches(['\r', '\n']));
        if is_continuation {
            out.push_str(line);
            continue;
        }

        let entry = split_entry(line).and_then(|(prefix, key)| Some((prefix, key, *wanted.get(key)?)));
        match entry {
            Some((prefix, key, version)) => {
                seen.insert(key.to_string());
                out.push_str(prefix);
                out.push_str(version);
                out.push_str(line_ending(line));
            }
            None => out.push_str(line),
        }
    }

    let mut missing = wanted.iter().filter(|(key, _)| !seen.contains(*key)).peekable();
    if missing.peek().is_some() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        for (key, version) in missing {
            out.push_str(key);
            out.push('=');
            out.push_str(version);
            out.push('\n');
        }
    }

    Ok(out)
}

/// Split a `key=value` line into everything before the value, and the key.
///
/// Returns `None` for blank lines and comments.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let body = line.trim_end_matches(['\r', '\n']);
    let indent = body.len() - body.trim_start().len();
    let rest = &body[indent..];
    if rest.is_empty() || rest.starts_with(['#', '!']) {
        return None;
    }

    let key_len = rest
        .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
        .unwrap_or(rest.len());
    let key = &rest[..key_len];

    let after_key = &rest[key_len..];
    let mut separator = after_key.len() - after_key.trim_start().len();
    let after_space = &after_key[separator..];
    if after_space.starts_with(['=', ':']) {
        separator += 1;
        let after_sep = &after_key[separator..];
        separator += after_sep.len() - after_sep.trim_start().len();
    }

    Some((&body[..indent + key_len + separator], key))
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

//! `package.json` reader
//!
//! Only the fields the header stamp and external resolver need are read;
//! everything else in the file is ignored.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::externals::{VersionSource, VersionSources};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A person field: either `"Name <email> (url)"` or `{ "name": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Person {
    Short(String),
    Full {
        name: String,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl Person {
    /// Display name without email or url
    pub fn name(&self) -> &str {
        match self {
            Person::Short(text) => text
                .split(['<', '('])
                .next()
                .unwrap_or(text)
                .trim(),
            Person::Full { name, .. } => name.trim(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub author: Option<Person>,

    #[serde(default)]
    pub contributors: Vec<Person>,

    #[serde(default)]
    pub license: Option<String>,

    /// Runtime dependencies: package name → version specifier
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Development dependencies: package name → version specifier
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
}

impl PackageManifest {
    /// Load a manifest from a `package.json` file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Author line for the metadata block: `Name`, or `Name (+A, +B)` when
    /// there are contributors. `None` without an author or when the author
    /// has no name (`"<mail@example.com>"`). Nameless contributors are left
    /// out.
    pub fn author_line(&self) -> Option<String> {
        let author = self.author.as_ref()?.name();
        if author.is_empty() {
            return None;
        }

        let contributors: Vec<String> = self
            .contributors
            .iter()
            .map(Person::name)
            .filter(|name| !name.is_empty())
            .map(|name| format!("+{}", name))
            .collect();
        if contributors.is_empty() {
            return Some(author.to_string());
        }

        Some(format!("{} ({})", author, contributors.join(", ")))
    }

    /// Version lookup order: runtime dependencies, then dev dependencies
    pub fn version_sources(&self) -> VersionSources<'_> {
        VersionSources::new()
            .with(DependencyTable::new("dependencies", &self.dependencies))
            .with(DependencyTable::new("devDependencies", &self.dev_dependencies))
    }
}

/// One dependency section of a manifest
pub struct DependencyTable<'a> {
    label: &'static str,
    entries: &'a IndexMap<String, String>,
}

impl<'a> DependencyTable<'a> {
    pub fn new(label: &'static str, entries: &'a IndexMap<String, String>) -> Self {
        Self { label, entries }
    }
}

impl VersionSource for DependencyTable<'_> {
    fn label(&self) -> &str {
        self.label
    }

    fn version_of(&self, module: &str) -> Option<&str> {
        self.entries.get(module).map(String::as_str)
    }
}

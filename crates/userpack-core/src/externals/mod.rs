//! External modules: dependencies left out of the bundle and loaded by the
//! userscript host through `@require` instead.

mod resolver;

pub use resolver::{
    locked_version, ExternalResolver, ResolveError, VersionSource, VersionSources, JSDELIVR_NPM,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One dependency the bundler should treat as external
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalModule {
    /// Package name (or absolute directory) as written in import statements
    pub module: String,

    /// Global identifier the bundler substitutes for imports of `module`
    pub expose_as: String,

    /// Load this URL instead of resolving a CDN version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_url: Option<String>,
}

impl ExternalModule {
    pub fn new(module: impl Into<String>, expose_as: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            expose_as: expose_as.into(),
            require_url: None,
        }
    }

    pub fn with_require_url(mut self, url: impl Into<String>) -> Self {
        self.require_url = Some(url.into());
        self
    }

    /// URL to load as-is, if one is configured. An empty `require_url`
    /// counts as unset so the module still goes through the CDN.
    pub fn direct_url(&self) -> Option<&str> {
        self.require_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Whether an import of `id` refers to this external.
    ///
    /// Package names match themselves and their subpaths (`pkg`, `pkg/sub`).
    /// An absolute `module` path matches every id that resolves inside it,
    /// with relative ids resolved against `base`.
    pub fn matches(&self, id: &str, base: &Path) -> bool {
        let module_path = Path::new(&self.module);
        if module_path.is_absolute() {
            return base.join(id).starts_with(module_path);
        }

        id == self.module
            || id
                .strip_prefix(self.module.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Whether `id` refers to any of `externals`
pub fn is_external(externals: &[ExternalModule], id: &str, base: &Path) -> bool {
    externals.iter().any(|external| external.matches(id, base))
}

/// Module → global name map for the bundler's output globals.
/// A module listed twice keeps its first position and its last name.
pub fn global_names(externals: &[ExternalModule]) -> IndexMap<String, String> {
    externals
        .iter()
        .map(|external| (external.module.clone(), external.expose_as.clone()))
        .collect()
}

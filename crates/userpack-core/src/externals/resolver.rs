use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::ExternalModule;
use crate::diagnostics::DiagnosticHandler;

/// Default CDN base: jsDelivr's npm endpoint
pub const JSDELIVR_NPM: &str = "https://cdn.jsdelivr.net/npm/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Package '{module}', marked as external for the userscript, has no declared version (searched: {searched})")]
    MissingVersion { module: String, searched: String },
}

/// Somewhere a declared version for a package can be looked up
pub trait VersionSource {
    /// Name used in logs and errors, e.g. `dependencies`
    fn label(&self) -> &str;

    fn version_of(&self, module: &str) -> Option<&str>;
}

/// Version sources consulted in order; the first one declaring a module wins
#[derive(Default)]
pub struct VersionSources<'a> {
    sources: Vec<Box<dyn VersionSource + 'a>>,
}

impl<'a> VersionSources<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl VersionSource + 'a) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: impl VersionSource + 'a) {
        self.sources.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Declared version of `module` and the label of the source declaring it
    pub fn lookup(&self, module: &str) -> Option<(&str, &str)> {
        self.sources.iter().find_map(|source| {
            source
                .version_of(module)
                .map(|version| (source.label(), version))
        })
    }

    fn labels(&self) -> String {
        self.sources
            .iter()
            .map(|source| source.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Concrete version derived from a possibly ranged specifier: everything but
/// digits, `.`, `-` and lowercase letters is dropped (`^1.2.0` → `1.2.0`).
pub fn locked_version(specifier: &str) -> String {
    specifier
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || matches!(c, '.' | '-'))
        .collect()
}

/// Turns external modules into the URLs a userscript has to `@require`.
///
/// Modules with a non-empty `require_url` are used as-is. All others are versioned
/// from the given [`VersionSources`] and fetched from the CDN in a single
/// request, using the CDN's `combine/` form when there is more than one.
pub struct ExternalResolver {
    cdn_base: String,
    diagnostics: Arc<dyn DiagnosticHandler>,
}

impl ExternalResolver {
    pub fn new(diagnostics: Arc<dyn DiagnosticHandler>) -> Self {
        Self {
            cdn_base: JSDELIVR_NPM.to_string(),
            diagnostics,
        }
    }

    /// Use a different CDN base URL. A trailing `/` is added if missing.
    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.cdn_base = base;
        self
    }

    pub fn cdn_base(&self) -> &str {
        &self.cdn_base
    }

    /// Resolve `externals` into `@require` URLs: the combined CDN URL first
    /// (if any module needs one), then direct URLs in input order.
    pub fn resolve(
        &self,
        externals: &[ExternalModule],
        sources: &VersionSources<'_>,
    ) -> Result<Vec<String>, ResolveError> {
        let (direct, from_cdn): (Vec<&ExternalModule>, Vec<&ExternalModule>) = externals
            .iter()
            .partition(|external| external.direct_url().is_some());

        let direct_urls = direct
            .into_iter()
            .filter_map(|external| external.direct_url().map(str::to_string));

        if from_cdn.is_empty() {
            return Ok(direct_urls.collect());
        }

        let paths = from_cdn
            .iter()
            .map(|external| self.module_path(&external.module, sources))
            .collect::<Result<Vec<_>, _>>()?;

        let combined_url = match paths.as_slice() {
            [single] => format!("{}{}", self.cdn_base, single),
            many => format!("{}combine/{}", self.cdn_base, many.join(",")),
        };
        debug!("CDN require: {}", combined_url);

        Ok(std::iter::once(combined_url).chain(direct_urls).collect())
    }

    /// `module@version` path segment for one CDN-loaded module
    fn module_path(&self, module: &str, sources: &VersionSources<'_>) -> Result<String, ResolveError> {
        let (source, declared) =
            sources
                .lookup(module)
                .ok_or_else(|| ResolveError::MissingVersion {
                    module: module.to_string(),
                    searched: sources.labels(),
                })?;
        debug!("{} declares {}@{}", source, module, declared);

        let locked = locked_version(declared);
        if locked != declared {
            let message = format!(
                "Package '{}', marked as external for the userscript, is not locked to a specific version. Will @require v{}",
                module, locked
            );
            warn!("{}", message);
            self.diagnostics.warning(Some(module), &message);
        }

        if locked.is_empty() {
            Ok(module.to_string())
        } else {
            Ok(format!("{}@{}", module, locked))
        }
    }
}

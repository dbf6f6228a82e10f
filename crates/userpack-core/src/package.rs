//! Assembles the final userscript: stamped metadata block + bundled payload

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::PackConfig;
use crate::diagnostics::DiagnosticHandler;
use crate::errors::{BuildError, Result};
use crate::externals::{ExternalModule, ExternalResolver};
use crate::manifest::PackageManifest;
use crate::metadata::{self, MetadataRecord};
use crate::stamp::HeaderStamp;

/// Packages one userscript from a loaded configuration and manifest.
///
/// Every step is fail-fast: an error from parsing, resolving or serializing
/// means no output is produced.
pub struct Packager {
    config: PackConfig,
    manifest: PackageManifest,
    resolver: ExternalResolver,
}

impl Packager {
    pub fn new(
        config: PackConfig,
        manifest: PackageManifest,
        diagnostics: Arc<dyn DiagnosticHandler>,
    ) -> Self {
        let resolver = ExternalResolver::new(diagnostics).with_cdn_base(config.cdn_base.clone());
        Self {
            config,
            manifest,
            resolver,
        }
    }

    /// Load the manifest named by `config` and build a packager
    pub fn from_config(config: PackConfig, diagnostics: Arc<dyn DiagnosticHandler>) -> Result<Self> {
        let manifest = PackageManifest::from_file(Path::new(&config.manifest))?;
        Ok(Self::new(config, manifest, diagnostics))
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    pub fn externals(&self) -> &[ExternalModule] {
        &self.config.externals
    }

    /// `@require` URLs for the configured externals
    pub fn requires(&self) -> Result<Vec<String>> {
        let sources = self.manifest.version_sources();
        Ok(self.resolver.resolve(&self.config.externals, &sources)?)
    }

    /// Parse `placeholder` and apply the build-time stamp to it
    pub fn stamp(&self, placeholder: &str) -> Result<MetadataRecord> {
        let mut record = metadata::parse(placeholder)?;
        let requires = self.requires()?;
        HeaderStamp::new(&self.config.metadata, &self.manifest).apply(&mut record, requires)?;
        Ok(record)
    }

    /// Stamped and serialized metadata block
    pub fn build_header(&self, placeholder: &str) -> Result<String> {
        let record = self.stamp(placeholder)?;
        Ok(metadata::serialize(&record)?)
    }

    /// The complete userscript: metadata block, blank line, payload
    pub fn package(&self, placeholder: &str, payload: &str) -> Result<String> {
        let header = self.build_header(placeholder)?;
        debug!(
            "Header is {} line(s), payload {} byte(s)",
            header.lines().count(),
            payload.len()
        );
        Ok(format!("{}\n\n{}", header, payload))
    }

    /// Read the configured header and payload files and package them
    pub fn package_files(&self) -> Result<String> {
        let placeholder = read_file(Path::new(&self.config.header))?;
        let payload = match &self.config.payload {
            Some(path) => read_file(Path::new(path))?,
            None => String::new(),
        };

        info!("Packaging {}", self.config.header);
        self.package(&placeholder, &payload)
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

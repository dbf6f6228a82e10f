//! Userscript packaging: metadata block codec and external dependency
//! resolution.
//!
//! - [`metadata`] parses and serializes `// ==UserScript==` blocks
//! - [`externals`] turns external modules into `@require` URLs
//! - [`manifest`] reads `package.json`
//! - [`stamp`] applies build-time values to a parsed block
//! - [`package`] puts header and bundled payload together

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod externals;
pub mod manifest;
pub mod metadata;
pub mod package;
pub mod stamp;

pub use config::{CliOverrides, ConfigError, MetadataSettings, PackConfig, CONFIG_FILE};
pub use diagnostics::{
    CollectingDiagnosticHandler, ConsoleDiagnosticHandler, Diagnostic, DiagnosticHandler,
    DiagnosticLevel,
};
pub use errors::BuildError;
pub use externals::{
    global_names, is_external, ExternalModule, ExternalResolver, ResolveError, VersionSource,
    VersionSources,
};
pub use manifest::{DependencyTable, ManifestError, PackageManifest, Person, MANIFEST_FILE};
pub use metadata::{parse, serialize, MetadataError, MetadataRecord, MetadataValue};
pub use package::Packager;
pub use stamp::HeaderStamp;

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::externals::ResolveError;
use crate::manifest::ManifestError;
use crate::metadata::MetadataError;

/// Any failure that aborts packaging
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;

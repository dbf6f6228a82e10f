use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::externals::{ExternalModule, JSDELIVR_NPM};
use crate::manifest::MANIFEST_FILE;

/// Default configuration file name
pub const CONFIG_FILE: &str = "userpack.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Header fields set by the build rather than taken from the placeholder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSettings {
    /// Value for `@name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Value for `@namespace`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Extra keys written after everything else, e.g.
    /// `grant: [GM.getValue, GM.setValue]` or `noframes: true`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub overrides: IndexMap<String, serde_json::Value>,
}

/// Main packaging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackConfig {
    /// File holding the metadata placeholder block
    #[serde(default = "default_header")]
    pub header: String,

    /// Bundled script the header is prepended to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Where the packaged userscript is written (stdout when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_file: Option<String>,

    /// Package manifest providing version, author and dependency versions
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// CDN base URL for externals without a `requireUrl`
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,

    #[serde(default)]
    pub metadata: MetadataSettings,

    #[serde(default)]
    pub externals: Vec<ExternalModule>,
}

fn default_header() -> String {
    "src/meta.js".to_string()
}

fn default_manifest() -> String {
    MANIFEST_FILE.to_string()
}

fn default_cdn_base() -> String {
    JSDELIVR_NPM.to_string()
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            payload: None,
            out_file: None,
            manifest: default_manifest(),
            cdn_base: default_cdn_base(),
            metadata: MetadataSettings::default(),
            externals: Vec::new(),
        }
    }
}

/// Values given on the command line, taking precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub header: Option<String>,
    pub payload: Option<String>,
    pub out_file: Option<String>,
    pub manifest: Option<String>,
    pub cdn_base: Option<String>,
}

impl PackConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render this configuration as YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Merge CLI overrides into this configuration
    pub fn merge(&mut self, overrides: &CliOverrides) {
        if let Some(header) = &overrides.header {
            self.header = header.clone();
        }
        if let Some(payload) = &overrides.payload {
            self.payload = Some(payload.clone());
        }
        if let Some(out_file) = &overrides.out_file {
            self.out_file = Some(out_file.clone());
        }
        if let Some(manifest) = &overrides.manifest {
            self.manifest = manifest.clone();
        }
        if let Some(cdn_base) = &overrides.cdn_base {
            self.cdn_base = cdn_base.clone();
        }
    }
}

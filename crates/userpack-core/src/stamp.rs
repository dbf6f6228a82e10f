//! Build-time mutations of the metadata placeholder

use tracing::debug;

use crate::config::MetadataSettings;
use crate::manifest::PackageManifest;
use crate::metadata::{MetadataError, MetadataRecord, MetadataValue};

/// Fills a parsed placeholder with values known only at build time: the
/// configured name and namespace, package version and author, `@require`
/// URLs for externals, and configured overrides.
pub struct HeaderStamp<'a> {
    settings: &'a MetadataSettings,
    manifest: &'a PackageManifest,
}

impl<'a> HeaderStamp<'a> {
    pub fn new(settings: &'a MetadataSettings, manifest: &'a PackageManifest) -> Self {
        Self { settings, manifest }
    }

    /// Apply the stamp. `requires` are appended after any `@require`
    /// entries the placeholder already has.
    pub fn apply(
        &self,
        record: &mut MetadataRecord,
        requires: Vec<String>,
    ) -> Result<(), MetadataError> {
        if let Some(name) = &self.settings.name {
            record.insert("name", name.as_str());
        }
        if let Some(namespace) = &self.settings.namespace {
            record.insert("namespace", namespace.as_str());
        }

        if record.contains_key("description") {
            if let Some(description) = &self.manifest.description {
                record.insert("description", description.as_str());
            }
        }
        if let Some(version) = &self.manifest.version {
            record.insert("version", version.as_str());
        }
        if let Some(author) = self.manifest.author_line() {
            record.insert("author", author);
        }
        if !record.contains_key("license") {
            if let Some(license) = &self.manifest.license {
                record.insert("license", license.as_str());
            }
        }

        self.apply_requires(record, requires)?;

        for (key, value) in &self.settings.overrides {
            record.insert(key.as_str(), MetadataValue::from_json(key, value)?);
        }

        Ok(())
    }

    fn apply_requires(
        &self,
        record: &mut MetadataRecord,
        requires: Vec<String>,
    ) -> Result<(), MetadataError> {
        let mut all = match record.get("require") {
            None | Some(MetadataValue::Flag(false)) => Vec::new(),
            Some(MetadataValue::String(url)) => vec![url.clone()],
            Some(MetadataValue::Array(urls)) => urls.clone(),
            Some(MetadataValue::Flag(true)) => {
                return Err(MetadataError::ConflictingDeclaration {
                    key: "require".to_string(),
                })
            }
        };
        all.extend(requires);

        if !all.is_empty() {
            debug!("Writing {} @require entries", all.len());
            record.insert("require", MetadataValue::Array(all));
        }
        Ok(())
    }
}

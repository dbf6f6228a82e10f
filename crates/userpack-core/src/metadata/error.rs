use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Userscript metadata '{key}' was provided twice: once with a value, and once without")]
    ConflictingDeclaration { key: String },

    #[error("Unsupported value type {kind} provided for userscript metadata '{key}'")]
    UnsupportedValue { key: String, kind: String },
}

impl MetadataError {
    pub(crate) fn unsupported(key: &str, kind: impl Into<String>) -> Self {
        MetadataError::UnsupportedValue {
            key: key.to_string(),
            kind: kind.into(),
        }
    }
}

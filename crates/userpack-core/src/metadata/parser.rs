use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{MetadataError, MetadataRecord, CLOSE_MARKER, OPEN_MARKER};

/// `// @key value` where the value is optional. Trailing whitespace is not
/// part of the value.
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^// @(?<key>\w+)(?:\s+(?<value>.*?))?\s*$").expect("valid metadata line pattern")
});

/// A whole metadata key: one `\w` token, as accepted by [`LINE_PATTERN`]
static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("valid metadata key pattern"));

/// Whether `key` would be read back as a key by [`parse`]
pub(super) fn is_key(key: &str) -> bool {
    KEY_PATTERN.is_match(key)
}

/// Parse the metadata block contained in `text`.
///
/// Only lines between the opening and closing markers are considered. A
/// missing opening marker means the block starts at the first line, a
/// missing closing marker means it runs to the last line. Lines that are
/// not `// @key [value]` declarations are skipped.
pub fn parse(text: &str) -> Result<MetadataRecord, MetadataError> {
    let lines: Vec<&str> = text.lines().collect();

    let start = lines
        .iter()
        .position(|line| line.trim_end() == OPEN_MARKER)
        .map_or(0, |idx| idx + 1);
    let end = lines[start..]
        .iter()
        .position(|line| line.trim_end() == CLOSE_MARKER)
        .map_or(lines.len(), |idx| start + idx);

    let mut record = MetadataRecord::new();

    for line in &lines[start..end] {
        let Some(captures) = LINE_PATTERN.captures(line) else {
            continue;
        };
        let key = &captures["key"];

        match captures.name("value").map(|m| m.as_str()) {
            Some(value) if !value.is_empty() => record.push_value(key, value)?,
            _ => record.push_flag(key)?,
        }
    }

    debug!("Parsed {} metadata key(s)", record.len());
    Ok(record)
}

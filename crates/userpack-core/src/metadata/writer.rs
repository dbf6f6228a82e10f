use super::parser::is_key;
use super::{MetadataError, MetadataRecord, MetadataValue, CLOSE_MARKER, LINE_PREFIX, OPEN_MARKER};

/// Serialize `record` into a metadata block.
///
/// Keys are padded to a shared column (longest key plus one) so values line
/// up. Arrays emit one line per element, `Flag(true)` emits the bare key and
/// `Flag(false)` emits nothing. Lines left blank after the comment prefix
/// are dropped from the output.
///
/// Fails with [`MetadataError::UnsupportedValue`] for keys that are not word
/// tokens and for values that could not be read back by [`super::parse`]
/// (blank strings, strings spanning several lines, and strings with leading
/// or trailing whitespace).
pub fn serialize(record: &MetadataRecord) -> Result<String, MetadataError> {
    let key_width = record
        .keys()
        .map(|key| key.chars().count())
        .max()
        .unwrap_or(0)
        + 1;

    let mut lines = vec![OPEN_MARKER.to_string()];

    for (key, value) in record {
        check_key(key)?;

        match value {
            MetadataValue::String(single) => {
                check_value(key, single)?;
                lines.push(value_line(key, single, key_width));
            }
            MetadataValue::Array(values) => {
                for single in values {
                    check_value(key, single)?;
                    lines.push(value_line(key, single, key_width));
                }
            }
            MetadataValue::Flag(true) => lines.push(format!("{LINE_PREFIX}@{key}")),
            MetadataValue::Flag(false) => {}
        }
    }

    lines.push(CLOSE_MARKER.to_string());

    let block: Vec<String> = lines.into_iter().filter(|line| !is_blank(line)).collect();
    Ok(block.join("\n"))
}

fn value_line(key: &str, value: &str, key_width: usize) -> String {
    format!("{LINE_PREFIX}@{key:<key_width$} {value}")
}

fn is_blank(line: &str) -> bool {
    line.strip_prefix(LINE_PREFIX)
        .unwrap_or(line)
        .trim()
        .is_empty()
}

fn check_key(key: &str) -> Result<(), MetadataError> {
    if is_key(key) {
        Ok(())
    } else {
        Err(MetadataError::unsupported(key, "key that is not a word token"))
    }
}

fn check_value(key: &str, value: &str) -> Result<(), MetadataError> {
    if value.contains('\n') {
        return Err(MetadataError::unsupported(key, "multi-line string"));
    }
    if value.trim().is_empty() {
        return Err(MetadataError::unsupported(key, "blank string"));
    }
    if value.trim() != value {
        return Err(MetadataError::unsupported(
            key,
            "string with surrounding whitespace",
        ));
    }
    Ok(())
}

//! Property-based tests for the metadata codec
//!
//! A record built from word keys and single-line values must come back
//! unchanged from `parse(serialize(record))`, with keys in the same order.
//! Values that could not be read back are refused by `serialize`, and
//! anything `parse` accepts can be written out again.

use proptest::prelude::*;
use userpack_core::metadata::{
    parse, serialize, MetadataError, MetadataRecord, MetadataValue, CLOSE_MARKER, OPEN_MARKER,
};

/// Any word token, including non-ASCII letters, digits and marks
fn key_strategy() -> impl Strategy<Value = String> {
    "\\w{1,12}"
}

/// Any single line, possibly blank, padded or non-ASCII
fn line_text_strategy() -> impl Strategy<Value = String> {
    "[^\n]{0,30}"
}

/// A single line without surrounding whitespace
fn writable_text_strategy() -> impl Strategy<Value = String> {
    "\\S([^\n]{0,28}\\S)?"
}

fn value_strategy(text: BoxedStrategy<String>) -> impl Strategy<Value = MetadataValue> {
    prop_oneof![
        text.clone().prop_map(MetadataValue::String),
        // A single-element array reads back as a string, so arrays start at two
        prop::collection::vec(text, 2..5).prop_map(MetadataValue::Array),
        Just(MetadataValue::Flag(true)),
    ]
}

fn record_strategy() -> impl Strategy<Value = MetadataRecord> {
    prop::collection::vec(
        (key_strategy(), value_strategy(writable_text_strategy().boxed())),
        0..10,
    )
    .prop_map(|entries| entries.into_iter().collect())
}

fn loose_record_strategy() -> impl Strategy<Value = MetadataRecord> {
    prop::collection::vec(
        (key_strategy(), value_strategy(line_text_strategy().boxed())),
        0..6,
    )
    .prop_map(|entries| entries.into_iter().collect())
}

/// One line of a hand-edited header: a flag, a declaration with a value, or
/// anything else
fn block_line_strategy() -> impl Strategy<Value = String> {
    // Mostly a few short keys so repeats and conflicts come up
    let key = "[a-c]|\\w{1,6}";
    prop_oneof![
        (key, "[ \t]{0,3}").prop_map(|(key, tail)| format!("// @{key}{tail}")),
        (key, "[ \t]{1,3}", line_text_strategy())
            .prop_map(|(key, gap, value)| format!("// @{key}{gap}{value}")),
        line_text_strategy(),
    ]
}

fn block_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(block_line_strategy(), 0..12).prop_map(|lines| {
        let mut block = vec![OPEN_MARKER.to_string()];
        block.extend(lines);
        block.push(CLOSE_MARKER.to_string());
        block.join("\n")
    })
}

fn is_writable(value: &str) -> bool {
    !value.contains('\n') && !value.trim().is_empty() && value.trim() == value
}

fn all_values_writable(record: &MetadataRecord) -> bool {
    record.iter().all(|(_, value)| match value {
        MetadataValue::String(single) => is_writable(single),
        MetadataValue::Array(values) => values.iter().all(|single| is_writable(single)),
        MetadataValue::Flag(_) => true,
    })
}

proptest! {
    #[test]
    fn serialize_then_parse_is_identity(record in record_strategy()) {
        let text = serialize(&record).unwrap();
        let parsed = parse(&text).unwrap();
        prop_assert_eq!(parsed, record);
    }

    #[test]
    fn serialized_lines_have_no_trailing_whitespace(record in record_strategy()) {
        let text = serialize(&record).unwrap();
        for line in text.lines() {
            prop_assert_eq!(line, line.trim_end());
        }
    }

    #[test]
    fn values_share_one_column(record in record_strategy()) {
        let text = serialize(&record).unwrap();
        let columns: Vec<usize> = text
            .lines()
            .filter_map(|line| line.strip_prefix("// @"))
            .filter_map(|rest| {
                let (key, tail) = rest.split_once(' ')?;
                let padding = tail.len() - tail.trim_start_matches(' ').len();
                Some(key.chars().count() + 1 + padding)
            })
            .collect();

        if let Some(first) = columns.first() {
            prop_assert!(columns.iter().all(|column| column == first));
        }
    }

    #[test]
    fn reserializing_parsed_text_keeps_meaning(record in record_strategy()) {
        let text = serialize(&record).unwrap();
        let once = parse(&text).unwrap();
        let twice = parse(&serialize(&once).unwrap()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn serialize_refuses_what_it_cannot_read_back(record in loose_record_strategy()) {
        match serialize(&record) {
            Ok(text) => {
                prop_assert!(all_values_writable(&record));
                prop_assert_eq!(parse(&text).unwrap(), record);
            }
            Err(err) => {
                prop_assert!(!all_values_writable(&record));
                let is_unsupported = matches!(err, MetadataError::UnsupportedValue { .. });
                prop_assert!(is_unsupported);
            }
        }
    }

    #[test]
    fn serialize_accepts_exactly_the_keys_parse_reads(key in "[^\n]{1,8}") {
        let record: MetadataRecord = [(key.as_str(), "x")].into_iter().collect();
        let readable = parse(&format!("// @{key} x")).unwrap().get_str(&key) == Some("x");
        prop_assert_eq!(serialize(&record).is_ok(), readable);
    }

    #[test]
    fn parsed_headers_can_be_written_back(text in block_text_strategy()) {
        if let Ok(record) = parse(&text) {
            let written = serialize(&record).unwrap();
            prop_assert_eq!(parse(&written).unwrap(), record);
        }
    }
}

#[test]
fn hand_written_block_normalizes() {
    let text = "// ==UserScript==\n\
                // @name Example\n\
                // @match   a\n\
                \n\
                // @version 1.0\n\
                // @match b\n\
                // @noframes\n\
                // ==/UserScript==";

    let record = parse(text).unwrap();
    let normalized = serialize(&record).unwrap();
    assert_eq!(
        normalized,
        "// ==UserScript==\n\
         // @name      Example\n\
         // @match     a\n\
         // @match     b\n\
         // @version   1.0\n\
         // @noframes\n\
         // ==/UserScript=="
    );
    assert_eq!(parse(&normalized).unwrap(), record);
}

//! Reference context serialization
//!
//! A registry is rendered as one `id|name|symbol|aliases` row per record, in
//! registry order. Fields are backslash-escaped so a name containing the
//! delimiter cannot shift columns; registries free of `\`, `|`, `,` and line
//! breaks come out byte-for-byte as the plain joined format.

use canon_types::EntityRecord;

/// Column delimiter within a row
pub const FIELD_DELIMITER: &str = "|";

/// Separator between aliases inside the aliases column
pub const ALIAS_DELIMITER: &str = ",";

/// Column legend, stated to the model alongside the block
pub const COLUMNS: &str = "id|name|symbol|aliases";

/// Serialize records into the compact block sent to (or cached for) the model
pub fn build_context(records: &[EntityRecord]) -> String {
    records
        .iter()
        .map(build_row)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize one record as a single row
pub fn build_row(record: &EntityRecord) -> String {
    let aliases = record
        .aliases
        .iter()
        .map(|alias| escape_field(alias).replace(ALIAS_DELIMITER, "\\,"))
        .collect::<Vec<_>>()
        .join(ALIAS_DELIMITER);

    [
        escape_field(&record.canonical_id()),
        escape_field(&record.name),
        record.symbol.as_deref().map(escape_field).unwrap_or_default(),
        aliases,
    ]
    .join(FIELD_DELIMITER)
}

fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

//! Accessors over the loosely-typed character record tree.
//!
//! Fight Club exports are XML. By the time they reach this crate they have
//! been deserialized into a tree of mappings, sequences and string leaves,
//! held here as a [`serde_json::Value`]. XML cannot tell a single child
//! from a list of one, so every field that may repeat is read through
//! [`as_sequence`] before it is iterated.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from reading record fields.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Missing required field: {path}")]
    MissingField { path: String },

    #[error("Expected a mapping at {path}")]
    NotAMapping { path: String },

    #[error("Invalid number in {path}: {value:?}")]
    InvalidNumber { path: String, value: String },

    #[error("Invalid match mode: {0} (expected strict, in or inlist)")]
    InvalidMatchMode(String),

    #[error("Invalid proficiency code: {0}")]
    InvalidProficiency(i32),
}

/// A mapping node of the record tree.
pub type Fields = Map<String, Value>;

// ============================================================================
// Documents
// ============================================================================

/// A character record as handed over by the XML deserializer.
#[derive(Debug, Clone)]
pub struct RawRecord(Value);

impl RawRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// The `character` mapping.
    ///
    /// Accepts the full export (`{"pc": {"character": ...}}`), a bare
    /// `{"character": ...}` document, or the character mapping itself.
    pub fn character(&self) -> Result<&Fields, RecordError> {
        let root = self.0.get("pc").unwrap_or(&self.0);
        let character = root.get("character").unwrap_or(root);
        character.as_object().ok_or_else(|| RecordError::NotAMapping {
            path: "character".to_string(),
        })
    }
}

/// Reference rules data, keyed by category (`race`, `class`, ...).
#[derive(Debug, Clone)]
pub struct CompendiumIndex(Value);

impl CompendiumIndex {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    fn root(&self) -> &Value {
        self.0.get("compendium").unwrap_or(&self.0)
    }

    /// All entries of a category.
    pub fn entries(&self, category: &str) -> Vec<&Fields> {
        mappings_of(self.root().get(category))
    }

    /// First race entry whose name starts with `name`.
    ///
    /// Compendium names may extend the sheet's race name with a subrace
    /// ("Elf, High" for "Elf"), hence the prefix match.
    pub fn find_race(&self, name: &str) -> Option<&Fields> {
        self.entries("race").into_iter().find(|race| {
            optional_text(race, "name").is_some_and(|entry| entry.starts_with(name))
        })
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// View a field as a sequence regardless of how many children it had.
///
/// Sequences come back element by element, an absent or empty (`null`)
/// field comes back empty, and anything else is a one-element sequence.
pub fn as_sequence(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// The mapping children of a possibly-repeated field.
pub fn mappings_of(value: Option<&Value>) -> Vec<&Fields> {
    as_sequence(value)
        .into_iter()
        .filter_map(Value::as_object)
        .collect()
}

/// The mapping children of `fields[key]`.
pub fn mappings<'a>(fields: &'a Fields, key: &str) -> Vec<&'a Fields> {
    mappings_of(fields.get(key))
}

/// Flatten a leaf to text.
///
/// Handles plain strings and numbers, `{"#text": ...}` nodes (elements that
/// carried attributes), and repeated text elements, which are joined with
/// newlines (empty elements become blank lines).
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(fields) => fields.get("#text").and_then(text_of),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| text_of(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Null => None,
    }
}

pub fn optional_text(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).and_then(text_of)
}

pub fn required_text(fields: &Fields, key: &str) -> Result<String, RecordError> {
    optional_text(fields, key).ok_or_else(|| RecordError::MissingField {
        path: key.to_string(),
    })
}

/// Parse an integer leaf, tolerating surrounding whitespace and a `+` sign.
pub fn parse_int(path: &str, text: &str) -> Result<i32, RecordError> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| RecordError::InvalidNumber {
            path: path.to_string(),
            value: text.to_string(),
        })
}

pub fn optional_int(fields: &Fields, key: &str) -> Result<Option<i32>, RecordError> {
    optional_text(fields, key)
        .map(|text| parse_int(key, &text))
        .transpose()
}

// ============================================================================
// Free-text extraction
// ============================================================================

/// Text between `phrase` and the next `stop` (or the end of `text` when
/// there is no stop phrase, or it never occurs).
///
/// Returns `None` when `phrase` does not occur at all.
pub fn extract_after_phrase<'t>(text: &'t str, phrase: &str, stop: Option<&str>) -> Option<&'t str> {
    let start = text.find(phrase)? + phrase.len();
    let rest = &text[start..];
    let end = stop.and_then(|stop| rest.find(stop)).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Damage type from "...resistance against X damage".
///
/// The leading "r" is left off so sentence-initial "Resistance" matches too.
pub fn extract_resistance(text: &str) -> Option<&str> {
    extract_after_phrase(text, "esistance against ", Some(" damage"))
}

/// What a feature grants saves against, from "...saving throws against X.".
pub fn extract_save_advantage(text: &str) -> Option<&str> {
    extract_after_phrase(text, "saving throws against ", Some("."))
}

/// The line naming a class's casting ability: the last line before
/// "X is your spellcasting ability", trimmed.
pub fn spellcasting_ability_line(text: &str) -> Option<&str> {
    let end = text.find(" is your spellcasting ability")?;
    text[..end].rsplit('\n').next().map(str::trim)
}

// ============================================================================
// Filtering
// ============================================================================

/// How [`filter_by_field`] compares a field against its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMatch<'a> {
    /// The field is present, whatever its value.
    Present,
    /// The field's text equals the value.
    Exact(&'a str),
    /// The field's text contains the value.
    Contains(&'a str),
    /// The field's text equals one of the values.
    OneOf(&'a [&'a str]),
}

impl<'a> FieldMatch<'a> {
    /// Build a matcher from a textual mode name.
    ///
    /// `strict` and `in` compare against the first value, `inlist` against
    /// all of them. Any other mode is rejected.
    pub fn from_mode(mode: &str, values: &'a [&'a str]) -> Result<Self, RecordError> {
        let first = values.first().copied().unwrap_or_default();
        match mode {
            "strict" => Ok(FieldMatch::Exact(first)),
            "in" => Ok(FieldMatch::Contains(first)),
            "inlist" => Ok(FieldMatch::OneOf(values)),
            other => Err(RecordError::InvalidMatchMode(other.to_string())),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldMatch::Present => true,
            FieldMatch::Exact(expected) => text_of(value).is_some_and(|t| t == *expected),
            FieldMatch::Contains(needle) => text_of(value).is_some_and(|t| t.contains(needle)),
            FieldMatch::OneOf(allowed) => {
                text_of(value).is_some_and(|t| allowed.contains(&t.as_str()))
            }
        }
    }
}

/// The records that have `field` and whose value satisfies `matcher`.
pub fn filter_by_field<'a>(
    records: &[&'a Fields],
    field: &str,
    matcher: FieldMatch<'_>,
) -> Vec<&'a Fields> {
    records
        .iter()
        .copied()
        .filter(|record| record.get(field).is_some_and(|value| matcher.matches(value)))
        .collect()
}

use crate::config::SelectorEntry;
use crate::ConfigError;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Most values kept for a selector matching several elements
pub const MAX_FIELD_VALUES: usize = 10;

/// Ordered mapping from output field name to CSS selector
///
/// Field names are unique; insertion order is kept and drives the order of
/// fields in results and exported columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSpec {
    fields: Vec<(String, String)>,
}

impl SelectorSpec {
    /// Creates an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, rejecting duplicate names
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        selector: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let field = field.into();
        if self.contains(&field) {
            return Err(ConfigError::DuplicateField(field));
        }
        self.fields.push((field, selector.into()));
        Ok(())
    }

    /// Builder form of [`SelectorSpec::insert`]
    pub fn with_field(
        mut self,
        field: impl Into<String>,
        selector: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        self.insert(field, selector)?;
        Ok(self)
    }

    /// Builds a spec from `[[selector]]` config entries
    pub fn from_entries(entries: &[SelectorEntry]) -> Result<Self, ConfigError> {
        let mut spec = Self::new();
        for entry in entries {
            spec.insert(entry.field.as_str(), entry.css.as_str())?;
        }
        Ok(spec)
    }

    /// Whether a field with this name exists
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Iterates `(field, selector)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(field, selector)| (field.as_str(), selector.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Value extracted for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No element matched, or the selector could not be evaluated
    Null,
    /// Exactly one element matched
    Single(String),
    /// Several elements matched (at most [`MAX_FIELD_VALUES`])
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Builds a value from the texts of all matched elements
    pub fn from_matches(mut texts: Vec<String>) -> Self {
        match texts.len() {
            0 => Self::Null,
            1 => Self::Single(texts.remove(0)),
            _ => {
                texts.truncate(MAX_FIELD_VALUES);
                Self::Multiple(texts)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_multiple(&self) -> Option<&[String]> {
        match self {
            Self::Multiple(texts) => Some(texts),
            _ => None,
        }
    }

    /// Flattens the value into one cell: lists joined with `"; "`, null empty
    pub fn to_flat_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Single(text) => text.clone(),
            Self::Multiple(texts) => texts.join("; "),
        }
    }
}

/// Fields extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    url: String,
    fields: Vec<(String, FieldValue)>,
}

impl ExtractionResult {
    pub fn new(url: impl Into<String>, fields: Vec<(String, FieldValue)>) -> Self {
        Self {
            url: url.into(),
            fields,
        }
    }

    /// The page the fields came from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Looks up a field's value
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Iterates `(field, value)` pairs in spec order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("url", &self.url)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows of cell texts from one HTML table
///
/// A header row, if any, is simply the first row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

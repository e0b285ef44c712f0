//! Selector-driven extraction
//!
//! [`parser`] holds the pure HTML functions; [`Extractor`] pairs them with
//! the fetch engine.

mod extractor;
pub mod parser;
mod types;

pub use extractor::Extractor;
pub use parser::{
    fields_from_document, links_from_document, parse_fields, parse_links, parse_selector,
    parse_tables, tables_from_document, DEFAULT_LINK_SELECTOR, DEFAULT_TABLE_SELECTOR, MAX_LINKS,
};
pub use types::{ExtractionResult, FieldValue, SelectorSpec, Table, MAX_FIELD_VALUES};

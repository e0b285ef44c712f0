//! HTML parsing for field, link and table extraction
//!
//! These functions work on content that has already been fetched, so they
//! never touch the network. The `*_from_document` variants let a caller that
//! needs several kinds of extraction parse the page only once.

use crate::extract::types::{ExtractionResult, FieldValue, SelectorSpec, Table};
use crate::url::{origin_root, resolve_link, same_origin};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Most links returned by one link extraction
pub const MAX_LINKS: usize = 200;

/// Selector used for link discovery when the caller gives none
pub const DEFAULT_LINK_SELECTOR: &str = "a[href]";

/// Selector used for table extraction when the caller gives none
pub const DEFAULT_TABLE_SELECTOR: &str = "table";

/// Parses a CSS selector, keeping the error message
pub fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Extracts every field of a selector spec from an HTML page
///
/// # Field Rules
///
/// | Matches | Value |
/// |---------|-------|
/// | 0 | `Null` |
/// | 1 | trimmed text |
/// | >1 | trimmed texts of the first 10 matches |
///
/// A selector that fails to parse is logged and yields `Null` for its own
/// field; the remaining fields are still extracted.
///
/// # Example
///
/// ```
/// use harrow::extract::{parse_fields, FieldValue, SelectorSpec};
///
/// let spec = SelectorSpec::new().with_field("title", "h1").unwrap();
/// let html = "<html><body><h1> Hello </h1></body></html>";
/// let result = parse_fields(html, "https://example.com/", &spec);
/// assert_eq!(result.get("title"), Some(&FieldValue::Single("Hello".to_string())));
/// ```
pub fn parse_fields(html: &str, url: &str, spec: &SelectorSpec) -> ExtractionResult {
    let document = Html::parse_document(html);
    fields_from_document(&document, url, spec)
}

/// Field extraction over an already parsed document
pub fn fields_from_document(document: &Html, url: &str, spec: &SelectorSpec) -> ExtractionResult {
    let fields = spec
        .iter()
        .map(|(field, selector)| {
            let value = match parse_selector(selector) {
                Ok(selector) => FieldValue::from_matches(
                    document.select(&selector).map(element_text).collect(),
                ),
                Err(e) => {
                    tracing::error!("Error extracting field '{}' from {}: {}", field, url, e);
                    FieldValue::Null
                }
            };
            (field.to_string(), value)
        })
        .collect();

    ExtractionResult::new(url, fields)
}

/// Extracts same-origin links from an HTML page
///
/// # Link Rules
///
/// - Only elements matched by `link_selector` (default `a[href]`) are read,
///   and only their `href` attribute
/// - hrefs are resolved against the page's origin root
/// - Fragment-only, `javascript:`, `mailto:`, `tel:` and `data:` hrefs are skipped
/// - Only URLs with the page's scheme, host and port are kept
/// - URLs in `visited` and repeats are dropped; document order is kept
/// - At most 200 links are returned
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Absolute URLs
/// * `Err(ExtractError)` - The link selector could not be parsed
pub fn parse_links(
    html: &str,
    page_url: &Url,
    link_selector: Option<&str>,
    visited: &HashSet<String>,
) -> Result<Vec<String>, ExtractError> {
    let document = Html::parse_document(html);
    links_from_document(&document, page_url, link_selector, visited)
}

/// Link extraction over an already parsed document
pub fn links_from_document(
    document: &Html,
    page_url: &Url,
    link_selector: Option<&str>,
    visited: &HashSet<String>,
) -> Result<Vec<String>, ExtractError> {
    let selector = parse_selector(link_selector.unwrap_or(DEFAULT_LINK_SELECTOR))?;
    let base = origin_root(page_url);

    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute) = resolve_link(href, &base) else {
            continue;
        };
        if !same_origin(&absolute, page_url) {
            continue;
        }

        let link = absolute.to_string();
        if visited.contains(&link) || !seen.insert(link.clone()) {
            continue;
        }

        links.push(link);
        if links.len() >= MAX_LINKS {
            break;
        }
    }

    Ok(links)
}

/// Extracts tables from an HTML page
///
/// Each element matched by `table_selector` becomes one [`Table`]: every
/// `tr` inside it is a row and every `th`/`td` inside the row a cell.
/// Rows without cells are dropped. An element with no `tr` at all is
/// logged and skipped without affecting the other tables.
///
/// # Returns
///
/// * `Ok(Vec<Table>)` - The tables, empty when nothing matched
/// * `Err(ExtractError)` - The table selector could not be parsed
pub fn parse_tables(html: &str, table_selector: &str) -> Result<Vec<Table>, ExtractError> {
    let document = Html::parse_document(html);
    tables_from_document(&document, table_selector)
}

/// Table extraction over an already parsed document
pub fn tables_from_document(
    document: &Html,
    table_selector: &str,
) -> Result<Vec<Table>, ExtractError> {
    let selector = parse_selector(table_selector)?;
    let row_selector = parse_selector("tr")?;
    let cell_selector = parse_selector("th, td")?;

    let mut tables = Vec::new();
    let mut matched = 0;

    for (index, element) in document.select(&selector).enumerate() {
        matched += 1;
        match parse_table(element, index, &row_selector, &cell_selector) {
            Ok(table) => tables.push(table),
            Err(e) => tracing::warn!("Skipping table: {}", e),
        }
    }

    if matched == 0 {
        tracing::warn!("No tables found with selector '{}'", table_selector);
    }

    Ok(tables)
}

fn parse_table(
    element: ElementRef<'_>,
    index: usize,
    row_selector: &Selector,
    cell_selector: &Selector,
) -> Result<Table, ExtractError> {
    let mut rows = Vec::new();
    let mut saw_row = false;

    for row in element.select(row_selector) {
        saw_row = true;
        let cells: Vec<String> = row.select(cell_selector).map(element_text).collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if !saw_row {
        return Err(ExtractError::MalformedTable {
            index,
            reason: format!("<{}> element contains no rows", element.value().name()),
        });
    }

    Ok(Table::new(rows))
}

/// Trimmed text content of an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// Utility functions for header and cell parsing

/// Lowercases and joins words with `_`, so "Local authority name" matches
/// `local_authority_name`.
pub fn to_snake_case(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Reads a year from a header such as `2008` or `Year ending Mar 2008`.
pub fn parse_year(header: &str) -> Option<i32> {
    let last = header.split_whitespace().last()?;
    let year: i32 = last.parse().ok()?;
    (1900..=2100).contains(&year).then_some(year)
}

/// Whether a cell marks a missing value in published statistics tables.
pub fn is_missing(cell: &str) -> bool {
    matches!(cell.trim(), "" | ":" | ".." | "-" | "x" | "[x]")
}

/// Parses a price cell like `£125,000` or `125000.5`.
pub fn parse_price(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '£')
        .collect();
    cleaned.parse::<f64>().ok()
}

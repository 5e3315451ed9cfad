//! BibTeX formatting module
//!
//! Converts `BibTeXEntry` structures back to BibTeX source. Used when writing
//! a trimmed bibliography, so that removed fields really disappear from the
//! output instead of surviving in the raw source text.

use super::entry::BibTeXEntry;

/// Format a single BibTeX entry to string
pub fn format_entry(entry: &BibTeXEntry) -> String {
    let mut result = String::new();

    result.push('@');
    result.push_str(entry.entry_type.as_str());
    result.push('{');
    result.push_str(&entry.cite_key);
    result.push(',');
    result.push('\n');

    for field in &entry.fields {
        result.push_str("    ");
        result.push_str(&field.key);
        result.push_str(" = ");
        result.push_str(&format_field_value(&field.value));
        result.push(',');
        result.push('\n');
    }

    result.push('}');
    result
}

/// Format multiple entries, separated by a blank line
pub fn format_entries<'a>(entries: impl IntoIterator<Item = &'a BibTeXEntry>) -> String {
    entries
        .into_iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Numbers stay bare; everything else is braced so LaTeX markup survives.
fn format_field_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }
    format!("{{{}}}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::BibTeXEntryType;

    #[test]
    fn test_format_simple_entry() {
        let mut entry = BibTeXEntry::new("Smith2024".to_string(), BibTeXEntryType::Article);
        entry.add_field("author", "John Smith");
        entry.add_field("title", "A {Great} Paper");
        entry.add_field("year", "2024");

        let formatted = format_entry(&entry);
        assert_eq!(
            formatted,
            "@article{Smith2024,\n    author = {John Smith},\n    title = {A {Great} Paper},\n    year = 2024,\n}"
        );
    }

    #[test]
    fn test_format_keeps_unknown_type() {
        let entry = BibTeXEntry::new("T".to_string(), BibTeXEntryType::from_str("thesis"));
        assert!(format_entry(&entry).starts_with("@thesis{T,"));
    }

    #[test]
    fn test_empty_value_is_braced() {
        let mut entry = BibTeXEntry::new("E".to_string(), BibTeXEntryType::Misc);
        entry.add_field("note", "");
        assert!(format_entry(&entry).contains("note = {},"));
    }

    #[test]
    fn test_format_entries_joins_with_blank_line() {
        let a = BibTeXEntry::new("A".to_string(), BibTeXEntryType::Misc);
        let b = BibTeXEntry::new("B".to_string(), BibTeXEntryType::Misc);
        assert_eq!(format_entries([&a, &b]), "@misc{A,\n}\n\n@misc{B,\n}");
    }
}

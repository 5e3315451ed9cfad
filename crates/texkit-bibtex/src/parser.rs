//! BibTeX parser implementation using nom
//!
//! Handles the parts of BibTeX that show up in real reference-manager exports:
//! - @string definitions (and the built-in month macros)
//! - @preamble declarations
//! - @comment sections
//! - Braced and quoted field values, with nested braces
//! - String concatenation with #
//! - `@type{...}` and `@type(...)` delimiters
//!
//! Entries that fail to parse are recorded in [`BibTeXParseResult::errors`]
//! and skipped; parsing resumes at the next `@`.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    IResult,
};
use std::collections::HashMap;

use super::entry::{BibTeXEntry, BibTeXEntryType};

const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Parse error information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXParseError {
    pub line: u32,
    pub message: String,
}

/// Result of parsing a BibTeX file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BibTeXParseResult {
    pub entries: Vec<BibTeXEntry>,
    pub preambles: Vec<String>,
    pub strings: HashMap<String, String>,
    pub errors: Vec<BibTeXParseError>,
}

/// Error type for single-entry parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no entry found in input")]
    NoEntry,
    #[error("invalid syntax at line {0}")]
    InvalidSyntax(u32),
}

/// Parse a complete BibTeX source.
///
/// Never fails as a whole; malformed entries end up in `errors`.
pub fn parse(input: &str) -> BibTeXParseResult {
    let result = parse_bibtex(input);
    for error in &result.errors {
        tracing::warn!("bibtex line {}: {}", error.line, error.message);
    }
    result
}

/// Parse a single BibTeX entry
pub fn parse_entry(input: &str) -> Result<BibTeXEntry, ParseError> {
    let result = parse_bibtex(input);
    if let Some(error) = result.errors.first() {
        return Err(ParseError::InvalidSyntax(error.line));
    }
    result.entries.into_iter().next().ok_or(ParseError::NoEntry)
}

fn parse_bibtex(input: &str) -> BibTeXParseResult {
    let mut result = BibTeXParseResult::default();
    let mut remaining = input;

    while !remaining.is_empty() {
        remaining = skip_whitespace_and_comments(remaining);
        if remaining.is_empty() {
            break;
        }

        if !remaining.starts_with('@') {
            // Free text between entries is an implicit comment
            match remaining.find('@') {
                Some(pos) => {
                    remaining = &remaining[pos..];
                    continue;
                }
                None => break,
            }
        }

        let line = line_of(input, remaining);
        match parse_at_entry(remaining, &result.strings) {
            Ok((rest, at_entry)) => {
                match at_entry {
                    AtEntry::Entry(mut entry) => {
                        let consumed = &remaining[..remaining.len() - rest.len()];
                        entry.raw_bibtex = Some(consumed.trim().to_string());
                        result.entries.push(entry);
                    }
                    AtEntry::String(key, value) => {
                        result.strings.insert(key, value);
                    }
                    AtEntry::Preamble(text) => result.preambles.push(text),
                    AtEntry::Comment => {}
                }
                remaining = rest;
            }
            Err(_) => {
                result.errors.push(BibTeXParseError {
                    line,
                    message: format!("failed to parse entry starting with {:?}", head(remaining)),
                });
                match remaining[1..].find('@') {
                    Some(pos) => remaining = &remaining[pos + 1..],
                    None => break,
                }
            }
        }
    }

    result
}

/// 1-based line number of `rest` inside `input`
fn line_of(input: &str, rest: &str) -> u32 {
    let offset = input.len() - rest.len();
    input[..offset].matches('\n').count() as u32 + 1
}

fn head(s: &str) -> &str {
    let line = s.lines().next().unwrap_or(s);
    match line.char_indices().nth(40) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

enum AtEntry {
    Entry(BibTeXEntry),
    String(String, String),
    Preamble(String),
    Comment,
}

fn skip_whitespace_and_comments(input: &str) -> &str {
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        if rest.starts_with('%') {
            let end = rest.find('\n').unwrap_or(rest.len());
            rest = &rest[end..];
        } else {
            return rest;
        }
    }
}

fn parse_at_entry<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtEntry> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match entry_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtEntry::String(key, value)))
        }
        "preamble" => {
            let (rest, text) = parse_preamble(rest, strings)?;
            Ok((rest, AtEntry::Preamble(text)))
        }
        "comment" => {
            let (rest, _) = parse_comment_body(rest)?;
            Ok((rest, AtEntry::Comment))
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, entry_type, strings)?;
            Ok((rest, AtEntry::Entry(entry)))
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_cite_key_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '{' | '}' | '(' | ')' | '"' | '#' | '%' | '\'')
}

/// Opening `{` or `(` of a body; returns the matching closer
fn open_body(input: &str) -> IResult<&str, char> {
    let (rest, _) = multispace0(input)?;
    alt((map(char('{'), |_| '}'), map(char('('), |_| ')')))(rest)
}

fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, close) = open_body(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) = take_while1(is_identifier_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    Ok((rest, (key.to_lowercase(), value)))
}

fn parse_preamble<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let (rest, close) = open_body(input)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    Ok((rest, value))
}

/// Skip a @comment body: either a braced block or the rest of the line
fn parse_comment_body(input: &str) -> IResult<&str, ()> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, _) = parse_braced_content(rest)?;
        Ok((rest, ()))
    } else {
        let pos = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[pos..], ()))
    }
}

fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, BibTeXEntry> {
    let (rest, close) = open_body(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, cite_key) = take_while1(is_cite_key_char)(rest)?;
    let (rest, _) = multispace0(rest)?;

    let mut entry = BibTeXEntry::new(cite_key.to_string(), BibTeXEntryType::from_str(entry_type));

    // `@misc{key}` without any field is legal
    if let Some(rest) = rest.strip_prefix(close) {
        return Ok((rest, entry));
    }

    let (rest, _) = char(',')(rest)?;
    let (rest, fields) = parse_fields(rest, close, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(close)(rest)?;

    for (key, value) in fields {
        entry.add_field(key, value);
    }

    Ok((rest, entry))
}

fn parse_fields<'a>(
    input: &'a str,
    close: char,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;
        if rest.starts_with(close) {
            return Ok((rest, fields));
        }

        match parse_single_field(rest, strings) {
            Ok((rest, field)) => {
                fields.push(field);
                let (rest, _) = multispace0(rest)?;
                remaining = rest.strip_prefix(',').unwrap_or(rest);
            }
            Err(_) => return Ok((remaining, fields)),
        }
    }
}

fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) = take_while1(is_identifier_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (key.to_string(), value)))
}

/// Parse a field value: braced, quoted, number, or macro reference, joined by `#`
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(take_while1(is_identifier_char), |s: &str| resolve_macro(s, strings)),
        ))(rest)?;

        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => return Ok((rest, result)),
        }
    }
}

fn resolve_macro(name: &str, strings: &HashMap<String, String>) -> String {
    let lower = name.to_lowercase();
    if let Some(value) = strings.get(&lower) {
        return value.clone();
    }
    MONTH_MACROS
        .iter()
        .find(|(abbr, _)| *abbr == lower)
        .map(|(_, month)| month.to_string())
        .unwrap_or_else(|| name.to_string())
}

fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    Ok((rest, content[1..content.len() - 1].to_string()))
}

/// Braced content including the outer braces; nested braces are balanced
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }

    let mut depth = 0usize;
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    let Some(body) = input.strip_prefix('"') else {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    };

    let mut brace_depth = 0usize;
    let mut escaped = false;

    for (idx, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => brace_depth += 1,
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '"' if brace_depth == 0 => {
                return Ok((&body[idx + 1..], body[..idx].to_string()));
            }
            _ => {}
        }
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_entry() {
        let input = r#"
@article{Smith2024,
    author = {John Smith},
    title = {A Great Paper},
    year = {2024},
    journal = {Nature},
}
"#;
        let result = parse(input);
        assert_eq!(result.entries.len(), 1);
        assert!(result.errors.is_empty());

        let entry = &result.entries[0];
        assert_eq!(entry.cite_key, "Smith2024");
        assert_eq!(entry.entry_type, BibTeXEntryType::Article);
        assert_eq!(entry.author(), Some("John Smith"));
        assert_eq!(entry.title(), Some("A Great Paper"));
        assert_eq!(entry.year(), Some("2024"));
        assert!(entry
            .raw_bibtex
            .as_deref()
            .is_some_and(|raw| raw.starts_with("@article{Smith2024,") && raw.ends_with('}')));
    }

    #[test]
    fn test_parse_quoted_values() {
        let input = r#"
@article{Test2024,
    author = "Jane Doe",
    title = "Testing {"}Quotes{"}",
}
"#;
        let result = parse(input);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].author(), Some("Jane Doe"));
        assert_eq!(result.entries[0].title(), Some("Testing {\"}Quotes{\"}"));
    }

    #[test]
    fn test_parse_nested_braces() {
        let input = "@article{Test2024,\n    title = {A {B}ook about {LaTeX}},\n}";
        let result = parse(input);
        assert_eq!(result.entries[0].title(), Some("A {B}ook about {LaTeX}"));
    }

    #[test]
    fn test_parse_string_definitions_and_months() {
        let input = r#"
@string{Nature = "Nature"}
@article{Test2024,
    journal = nature,
    month = mar,
    note = "Vol. " # 12,
}
"#;
        let result = parse(input);
        assert_eq!(result.strings.get("nature"), Some(&"Nature".to_string()));
        let entry = &result.entries[0];
        assert_eq!(entry.get_field("journal"), Some("Nature"));
        assert_eq!(entry.get_field("month"), Some("March"));
        assert_eq!(entry.get_field("note"), Some("Vol. 12"));
    }

    #[test]
    fn test_cite_keys_with_punctuation() {
        let input = "@inproceedings{doe+lee:2020/v2, title = {X}}\n@misc{bare}";
        let result = parse(input);
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].cite_key, "doe+lee:2020/v2");
        assert_eq!(result.entries[1].cite_key, "bare");
        assert!(result.entries[1].fields.is_empty());
    }

    #[test]
    fn test_recovers_after_malformed_entry() {
        let input = "@article{Broken,\n  title = {unclosed\n\n@book{Good, title = {Fine}}\n";
        let result = parse(input);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 1);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].cite_key, "Good");
    }

    #[test]
    fn test_comments_and_preamble_are_skipped() {
        let input = r#"
% exported by a reference manager
@comment{jabref-meta: databaseType:bibtex;}
@preamble{"\newcommand{\noop}[1]{}"}
@article{Only, title = {One}}
"#;
        let result = parse(input);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.preambles.len(), 1);
    }

    #[test]
    fn test_parenthesized_bodies() {
        let input = r#"
@string(pub = "Physical Review")
@preamble("\relax")
@article(Paren2020,
    title = {Braces (and parens) inside},
    journal = pub,
)
@misc(bare)
"#;
        let result = parse(input);
        assert!(result.errors.is_empty());
        assert_eq!(result.preambles.len(), 1);
        assert_eq!(result.entries.len(), 2);

        let entry = &result.entries[0];
        assert_eq!(entry.cite_key, "Paren2020");
        assert_eq!(entry.title(), Some("Braces (and parens) inside"));
        assert_eq!(entry.get_field("journal"), Some("Physical Review"));
        assert_eq!(result.entries[1].cite_key, "bare");
    }

    #[test]
    fn test_mismatched_delimiters_are_errors() {
        let result = parse("@article(Bad, title = {T}}\n@book{Good, title = {G}}\n");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].cite_key, "Good");
    }

    #[test]
    fn test_parse_entry_errors() {
        assert_eq!(parse_entry("no entries here"), Err(ParseError::NoEntry));
        let entry = parse_entry("@book{K, title = {T}}").unwrap();
        assert_eq!(entry.cite_key, "K");
    }
}

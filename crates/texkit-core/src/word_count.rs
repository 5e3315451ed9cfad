//! Section-aware word counting
//!
//! Every line is checked for a sectioning command, outermost level first; the
//! first level whose pattern yields a title wins, so a line holds at most one
//! heading. The text from a heading command up to the next heading line is
//! detexed and counted, then counts are rolled up the heading hierarchy.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::detex::{count_words, detex};
use crate::sectioning::SectioningLevel;
use crate::source::TexDocument;

const INDENT: &str = "  ";

lazy_static! {
    // One pattern per level, in `SectioningLevel::ALL` order
    static ref HEADING_PATTERNS: Vec<(SectioningLevel, Regex)> = SectioningLevel::ALL
        .iter()
        .map(|&level| {
            let pattern = format!(
                r"\\(?:no)?{}\**(?:\[[^\]]*\])?\{{([^{{}}*][^{{}}]*)\}}",
                level.command()
            );
            (level, Regex::new(&pattern).unwrap())
        })
        .collect();
}

/// A sectioning command found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: SectioningLevel,
    pub title: String,
    /// Zero-based line index
    pub line: usize,
}

/// Find the heading on a line, if any.
///
/// Returns the level, the title and the byte range of the whole command.
pub fn detect_heading(line: &str) -> Option<(SectioningLevel, String, Range<usize>)> {
    HEADING_PATTERNS.iter().find_map(|(level, regex)| {
        let caps = regex.captures(line)?;
        let command = caps.get(0)?;
        let title = caps.get(1)?.as_str().trim().to_string();
        Some((*level, title, command.range()))
    })
}

/// All headings of a document in line order
pub fn find_headings(document: &TexDocument) -> Vec<Heading> {
    document
        .lines()
        .iter()
        .enumerate()
        .filter_map(|(line, text)| {
            detect_heading(text).map(|(level, title, _)| Heading { level, title, line })
        })
        .collect()
}

/// Roll local counts up the hierarchy.
///
/// A heading's cumulative count is its own local count plus the local counts
/// of the directly following headings that are nested deeper, stopping at the
/// first heading at the same or an outer level.
pub fn cumulative_counts(levels: &[SectioningLevel], local: &[usize]) -> Vec<usize> {
    (0..levels.len())
        .map(|i| {
            local[i]
                + (i + 1..levels.len())
                    .take_while(|&j| levels[j] > levels[i])
                    .map(|j| local[j])
                    .sum::<usize>()
        })
        .collect()
}

/// Word counts of one heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCount {
    pub heading: Heading,
    /// Words up to the next heading of any level.
    ///
    /// The heading title itself is not counted; text sharing the heading's
    /// line after the command is.
    pub local: usize,
    /// Words in the heading and all nested subheadings
    pub cumulative: usize,
}

/// Per-heading word counts of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCount {
    sections: Vec<SectionCount>,
}

impl WordCount {
    /// Count the words of a prepared document (see [`TexDocument::prepared`])
    pub fn from_document(document: &TexDocument) -> Self {
        let headings = find_headings(document);
        let mut local = Vec::with_capacity(headings.len());

        for (idx, heading) in headings.iter().enumerate() {
            let end = headings
                .get(idx + 1)
                .map(|next| next.line)
                .unwrap_or_else(|| document.len());
            let text = section_text(document, heading.line, end);
            let words = count_words(&detex(&text));
            tracing::debug!(
                "{} \"{}\" (lines {}..{}): {} words",
                heading.level,
                heading.title,
                heading.line,
                end,
                words
            );
            local.push(words);
        }

        let levels: Vec<SectioningLevel> = headings.iter().map(|h| h.level).collect();
        let cumulative = cumulative_counts(&levels, &local);

        let sections = headings
            .into_iter()
            .zip(local)
            .zip(cumulative)
            .map(|((heading, local), cumulative)| SectionCount {
                heading,
                local,
                cumulative,
            })
            .collect();
        Self { sections }
    }

    pub fn sections(&self) -> &[SectionCount] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sum of the cumulative counts of `\section` headings.
    ///
    /// Documents structured only by chapters or parts report 0 here.
    pub fn total(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.heading.level == SectioningLevel::Section)
            .map(|s| s.cumulative)
            .sum()
    }

    /// The two indented tables (local, then cumulative) and the total line
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(
            "\n\n  **word count from heading to next heading \
             (e.g., from section heading to next heading, which could be subsection)**\n\n",
        );
        for section in &self.sections {
            out.push_str(&report_line(&section.heading, section.local));
        }
        out.push_str("\n\n  **word count for each subpart (e.g., all words in a section)**\n\n");
        for section in &self.sections {
            out.push_str(&report_line(&section.heading, section.cumulative));
        }
        out.push_str(&format!(
            "\n\n{} in total words when summed across the section count\n",
            self.total()
        ));
        out
    }
}

/// The heading line without its command, followed by the lines up to `end`
fn section_text(document: &TexDocument, start: usize, end: usize) -> String {
    let first = &document.lines()[start];
    let remainder = match detect_heading(first) {
        Some((_, _, range)) => format!("{}{}", &first[..range.start], &first[range.end..]),
        None => first.clone(),
    };
    if end > start + 1 {
        format!("{}\n{}", remainder, document.span(start + 1, end))
    } else {
        remainder
    }
}

/// `count` indented by depth, then the title indented by depth again
fn report_line(heading: &Heading, count: usize) -> String {
    let depth = heading.level.depth();
    let last = SectioningLevel::Subparagraph.depth();
    format!(
        "{}{}{}{}{}\n",
        INDENT.repeat(depth),
        count,
        INDENT.repeat(last - depth),
        INDENT.repeat(depth),
        heading.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_heading_variants() {
        let (level, title, _) = detect_heading(r"\section*{Intro}").unwrap();
        assert_eq!((level, title.as_str()), (SectioningLevel::Section, "Intro"));

        let (level, title, _) = detect_heading(r"\subsection[Short]{Long title}").unwrap();
        assert_eq!((level, title.as_str()), (SectioningLevel::Subsection, "Long title"));

        let (level, _, _) = detect_heading(r"\subparagraph{Deep}").unwrap();
        assert_eq!(level, SectioningLevel::Subparagraph);
    }

    #[test]
    fn test_partial_is_not_a_part() {
        assert!(detect_heading(r"$\partial f / \partial x$").is_none());
        assert!(detect_heading(r"\section{*}").is_none());
    }

    #[test]
    fn test_outer_level_wins_on_shared_line() {
        let (level, title, _) = detect_heading(r"\subsection{B} \chapter{A}").unwrap();
        assert_eq!(level, SectioningLevel::Chapter);
        assert_eq!(title, "A");
    }

    #[test]
    fn test_cumulative_counts() {
        use SectioningLevel::*;
        let levels = [Chapter, Section, Subsection, Subsection, Section, Chapter];
        let local = [1, 2, 3, 4, 5, 6];
        assert_eq!(
            cumulative_counts(&levels, &local),
            vec![15, 9, 3, 4, 5, 6]
        );
    }

    #[test]
    fn test_section_subsection_example() {
        let source = "\\section{A}\none two three four five\n\\subsection{B}\nsix seven eight\n\\section{C}\nnine ten eleven twelve\n";
        let counts = WordCount::from_document(&TexDocument::from_source(source));
        let local: Vec<usize> = counts.sections().iter().map(|s| s.local).collect();
        let cumulative: Vec<usize> = counts.sections().iter().map(|s| s.cumulative).collect();
        assert_eq!(local, vec![5, 3, 4]);
        assert_eq!(cumulative, vec![8, 3, 4]);
        assert_eq!(counts.total(), 12);
    }

    #[test]
    fn test_text_after_heading_on_same_line_counts() {
        let source = "\\section{A} first words\nmore";
        let counts = WordCount::from_document(&TexDocument::from_source(source));
        assert_eq!(counts.sections()[0].local, 3);
    }

    #[test]
    fn test_heading_title_is_not_counted() {
        let source = "\\section{A Long Five Word Title}\nbody text";
        let counts = WordCount::from_document(&TexDocument::from_source(source));
        assert_eq!(counts.sections()[0].heading.title, "A Long Five Word Title");
        assert_eq!(counts.sections()[0].local, 2);
    }

    #[test]
    fn test_chapter_only_document_total_is_zero() {
        let source = "\\chapter{One}\nsome words here";
        let counts = WordCount::from_document(&TexDocument::from_source(source));
        assert_eq!(counts.sections()[0].cumulative, 3);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_render_layout() {
        let source = "\\section{A}\none two\n\\subsection{B}\nthree";
        let report = WordCount::from_document(&TexDocument::from_source(source)).render();
        assert!(report.contains("    2            A\n"));
        assert!(report.contains("      1            B\n"));
        assert!(report.contains("    3            A\n"));
        assert!(report.contains("3 in total words when summed across the section count"));
    }
}

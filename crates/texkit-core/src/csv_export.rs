//! CSV export of word counts
//!
//! Columns are the seven sectioning levels twice: titles first, then counts.
//! A row fills only its own level's column in each half.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{TexkitError, TexkitResult};
use crate::sectioning::SectioningLevel;
use crate::word_count::{SectionCount, WordCount};

const LEVELS: usize = SectioningLevel::ALL.len();

/// Which of the two counts a CSV file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    /// Heading to next heading
    Local,
    /// Heading including nested subheadings
    Cumulative,
}

impl CountKind {
    fn pick(self, section: &SectionCount) -> usize {
        match self {
            CountKind::Local => section.local,
            CountKind::Cumulative => section.cumulative,
        }
    }

    /// File name suffix appended to the document stem
    pub fn file_suffix(self) -> &'static str {
        match self {
            CountKind::Local => "-wordcount-till-next-header.csv",
            CountKind::Cumulative => "-wordcount.csv",
        }
    }
}

/// Path of the CSV file written next to `tex_path`
pub fn csv_path(tex_path: &Path, kind: CountKind) -> PathBuf {
    let stem = tex_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    tex_path.with_file_name(format!("{}{}", stem, kind.file_suffix()))
}

/// Write one table of counts to any writer
pub fn write_word_count_csv<W: Write>(
    writer: W,
    counts: &WordCount,
    kind: CountKind,
    delimiter: u8,
) -> TexkitResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let header: Vec<&str> = SectioningLevel::ALL
        .iter()
        .chain(SectioningLevel::ALL.iter())
        .map(|level| level.command())
        .collect();
    csv.write_record(&header)?;

    for section in counts.sections() {
        let depth = section.heading.level.depth();
        let mut row = vec![String::new(); 2 * LEVELS];
        row[depth] = section.heading.title.clone();
        row[LEVELS + depth] = kind.pick(section).to_string();
        csv.write_record(&row)?;
    }

    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write both CSV files next to the document; returns the paths written
pub fn export_word_counts(
    tex_path: &Path,
    counts: &WordCount,
    delimiter: u8,
) -> TexkitResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(2);
    for kind in [CountKind::Cumulative, CountKind::Local] {
        let path = csv_path(tex_path, kind);
        let file = std::fs::File::create(&path).map_err(|e| TexkitError::io(&path, e))?;
        write_word_count_csv(file, counts, kind, delimiter)?;
        tracing::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Parse a configured delimiter, which must be a single ASCII character
pub fn parse_delimiter(value: &str) -> TexkitResult<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        [b'\\', b't'] => Ok(b'\t'),
        _ => Err(TexkitError::Usage(format!(
            "csv delimiter must be a single ASCII character, got {:?}",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TexDocument;

    fn sample_counts() -> WordCount {
        let source = "\\section{Intro, part one}\na b c\n\\subsection{Details}\nd e\n";
        WordCount::from_document(&TexDocument::from_source(source))
    }

    #[test]
    fn test_csv_paths() {
        let tex = Path::new("/tmp/thesis.tex");
        assert_eq!(
            csv_path(tex, CountKind::Cumulative),
            PathBuf::from("/tmp/thesis-wordcount.csv")
        );
        assert_eq!(
            csv_path(tex, CountKind::Local),
            PathBuf::from("/tmp/thesis-wordcount-till-next-header.csv")
        );
    }

    #[test]
    fn test_columns_and_quoting() {
        let mut buffer = Vec::new();
        write_word_count_csv(&mut buffer, &sample_counts(), CountKind::Cumulative, b',').unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "part,chapter,section,subsection,subsubsection,paragraph,subparagraph,\
             part,chapter,section,subsection,subsubsection,paragraph,subparagraph"
        );
        // title in its level column, count in the matching column of the second half
        assert_eq!(lines[1], ",,\"Intro, part one\",,,,,,,5,,,,");
        assert_eq!(lines[2], ",,,Details,,,,,,,2,,,");
    }

    #[test]
    fn test_local_counts_with_semicolon() {
        let mut buffer = Vec::new();
        write_word_count_csv(&mut buffer, &sample_counts(), CountKind::Local, b';').unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().nth(1), Some(";;Intro, part one;;;;;;;3;;;;"));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
    }
}

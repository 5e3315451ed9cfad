//! LaTeX sectioning levels
//!
//! A single ordered enumeration used everywhere headings matter: heading
//! detection, detex highlighting, cumulative word counts and CSV layout.
//! Ordering is outermost first, so `Part < Chapter < ... < Subparagraph` and
//! "deeper" means "greater".

use serde::{Deserialize, Serialize};

/// A sectioning command, ordered from outermost to innermost
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectioningLevel {
    Part,
    Chapter,
    Section,
    Subsection,
    Subsubsection,
    Paragraph,
    Subparagraph,
}

impl SectioningLevel {
    /// All levels in priority order (outermost first)
    pub const ALL: [SectioningLevel; 7] = [
        SectioningLevel::Part,
        SectioningLevel::Chapter,
        SectioningLevel::Section,
        SectioningLevel::Subsection,
        SectioningLevel::Subsubsection,
        SectioningLevel::Paragraph,
        SectioningLevel::Subparagraph,
    ];

    /// The LaTeX command name without backslash
    pub fn command(self) -> &'static str {
        match self {
            SectioningLevel::Part => "part",
            SectioningLevel::Chapter => "chapter",
            SectioningLevel::Section => "section",
            SectioningLevel::Subsection => "subsection",
            SectioningLevel::Subsubsection => "subsubsection",
            SectioningLevel::Paragraph => "paragraph",
            SectioningLevel::Subparagraph => "subparagraph",
        }
    }

    /// Nesting depth, 0 for `\part`
    pub fn depth(self) -> usize {
        self as usize
    }

    /// Parse a command name (without backslash)
    pub fn from_command(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.command() == name)
    }
}

impl std::fmt::Display for SectioningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

//! LaTeX to plain text ("detex")
//!
//! A best-effort reduction of LaTeX source to readable text, built as an
//! ordered table of `(pattern, replacement)` rules grouped into stages:
//!
//! 1. [`DetexStage::Header`]: drop everything up to `\begin{document}`
//! 2. [`DetexStage::Comments`]: strip `%` comments, keeping `\%`
//! 3. [`DetexStage::Reduce`]: `\emph{x}` and friends become `x`
//! 4. [`DetexStage::Highlight`]: headings become `#--x--#`, `\cite{x}` becomes `[x]`
//! 5. [`DetexStage::Remove`]: `\label`, `\begin`, `\includegraphics`, ... become a space
//! 6. [`DetexStage::Replace`]: symbols, accents, math delimiters, braces, whitespace
//!
//! Later stages assume earlier ones ran. Brace matching is one level deep:
//! a command whose argument contains nested braces is left untouched by the
//! rule that would otherwise handle it.

use lazy_static::lazy_static;
use regex::Regex;

use crate::sectioning::SectioningLevel;

/// Wrapper commands replaced by their braced content
const REDUCE_COMMANDS: &[&str] = &[
    "emph",
    "textbf",
    "textit",
    "text",
    "IEEEauthorblockA",
    "IEEEauthorblockN",
    "author",
    "caption",
    "thanks",
];

/// Commands whose content is kept inside square brackets
const BRACKET_COMMANDS: &[&str] = &["title", "author", "thanks", "cite", "ref"];

/// Commands removed together with their `[...]` and `{...}` arguments
const REMOVE_COMMANDS: &[&str] = &[
    "maketitle",
    "footnote",
    "centering",
    "IEEEpeerreviewmaketitle",
    "includegraphics",
    "IEEEauthorrefmark",
    "label",
    "begin",
    "end",
    "big",
    "right",
    "left",
    "documentclass",
    "usepackage",
    "bibliographystyle",
    "bibliography",
    "cline",
    "multicolumn",
    "autocite",
    "parencite",
    "textcite",
    "citep",
    "citet",
    "cite",
    "caption",
    "ref",
    "input",
];

const DOUBLE_RULE: &str = "=============================================";
const SINGLE_RULE: &str = "_____________________________________________";

/// Symbol substitutions and cleanup, applied in order
const REPLACEMENTS: &[(&str, &str)] = &[
    (r"\\eg\b(?:\{\})? *", "e.g., "),
    (r"\\ldots\b", "..."),
    (r"\\Rightarrow\b", "=>"),
    (r"\\rightarrow\b", "->"),
    (r"\\leq?\b", "<="),
    (r"\\geq?\b", ">="),
    (r"\\_", "_"),
    (r"\\\\", "\n"),
    (r"~", " "),
    // column separators before `\&` is unescaped, so literal ampersands survive
    (r"([^\\])&", "${1}\t"),
    (r"\\&", "&"),
    (r"\\%", "%"),
    (r"\\item\b", "\t- "),
    (r"\\hline[ \t]*\\hline", DOUBLE_RULE),
    (r"[ \t]*\\hline", SINGLE_RULE),
    (r"\\'(?:\{e\}|e)", "é"),
    (r"\\`(?:\{a\}|a)", "à"),
    (r"\\'(?:\{o\}|o)", "ó"),
    (r"\\'(?:\{a\}|a)", "á"),
    (r#"\\"(?:\{a\}|a)"#, "ä"),
    (r#"\\"(?:\{o\}|o)"#, "ö"),
    (r#"\\"(?:\{u\}|u)"#, "ü"),
    // single-character math first, then general inline math
    (r"\$(.)\$", "${1}"),
    (r"\$([^\$]*)\$", "${1}"),
    (r"([^\\])\$", "${1}"),
    (r" +,", ","),
    (r" +", " "),
    (r" +\)", ")"),
    (r"\( +", "("),
    (r" +\.", "."),
    (r"\A([^\{]*)\}", "${1}"),
    (r"([^\\])\{([^\}]*)\}", "${1}${2}"),
    (r"\\\{", "{"),
    (r"\\\}", "}"),
    (r"[ \t]*\n", "\n"),
    (r"([ \t]*\n){3,}", "\n\n"),
];

/// One find/replace step of the pipeline
#[derive(Debug, Clone)]
pub struct DetexRule {
    regex: Regex,
    replacement: String,
    limit: usize,
}

impl DetexRule {
    fn new(pattern: &str, replacement: impl Into<String>) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            replacement: replacement.into(),
            limit: 0,
        }
    }

    fn first_only(mut self) -> Self {
        self.limit = 1;
        self
    }

    /// The regular expression this rule searches for
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// The replacement template (`${1}` refers to capture groups)
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Apply the rule to `text`
    pub fn apply(&self, text: &str) -> String {
        self.regex
            .replacen(text, self.limit, self.replacement.as_str())
            .into_owned()
    }
}

lazy_static! {
    static ref HEADER_RULES: Vec<DetexRule> =
        vec![DetexRule::new(r"(?s)\A.*?\\begin\{document\}", "").first_only()];

    static ref COMMENT_RULES: Vec<DetexRule> = vec![
        DetexRule::new(r"\A%.*", ""),
        DetexRule::new(r"([^\\])%.*", "${1}"),
    ];

    static ref REDUCE_RULES: Vec<DetexRule> = REDUCE_COMMANDS
        .iter()
        .map(|cmd| DetexRule::new(&format!(r"\\{}\{{([^\}}\{{]*)\}}", cmd), "${1}"))
        .collect();

    static ref HIGHLIGHT_RULES: Vec<DetexRule> = SectioningLevel::ALL
        .iter()
        .map(|level| {
            DetexRule::new(
                &format!(r"\\{}\**\{{([^\}}\{{]*)\}}", level.command()),
                "\n#--${1}--#\n",
            )
        })
        .chain(
            BRACKET_COMMANDS
                .iter()
                .map(|cmd| DetexRule::new(&format!(r"\\{}\{{([^\}}\{{]*)\}}", cmd), "[${1}]")),
        )
        .collect();

    static ref REMOVE_RULES: Vec<DetexRule> = REMOVE_COMMANDS
        .iter()
        .map(|cmd| {
            DetexRule::new(
                &format!(r"\\{}\b(?:\[[^\]]*\])*(?:\{{[^\}}\{{]*\}})*", cmd),
                " ",
            )
        })
        .collect();

    static ref REPLACE_RULES: Vec<DetexRule> = REPLACEMENTS
        .iter()
        .map(|(pattern, replacement)| DetexRule::new(pattern, *replacement))
        .collect();

    static ref BACKSLASH: Regex = Regex::new(r"\\").unwrap();
}

/// A group of rules applied together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetexStage {
    Header,
    Comments,
    Reduce,
    Highlight,
    Remove,
    Replace,
}

impl DetexStage {
    /// Stages in the order [`detex`] applies them
    pub const PIPELINE: [DetexStage; 6] = [
        DetexStage::Header,
        DetexStage::Comments,
        DetexStage::Reduce,
        DetexStage::Highlight,
        DetexStage::Remove,
        DetexStage::Replace,
    ];

    /// The rules of this stage, in application order
    pub fn rules(self) -> &'static [DetexRule] {
        match self {
            DetexStage::Header => HEADER_RULES.as_slice(),
            DetexStage::Comments => COMMENT_RULES.as_slice(),
            DetexStage::Reduce => REDUCE_RULES.as_slice(),
            DetexStage::Highlight => HIGHLIGHT_RULES.as_slice(),
            DetexStage::Remove => REMOVE_RULES.as_slice(),
            DetexStage::Replace => REPLACE_RULES.as_slice(),
        }
    }

    /// Run every rule of this stage over `text`
    pub fn apply(self, text: &str) -> String {
        apply_rules(text, self.rules())
    }
}

/// Apply rules strictly in sequence
pub fn apply_rules(text: &str, rules: &[DetexRule]) -> String {
    let mut text = text.to_string();
    for rule in rules {
        text = rule.apply(&text);
    }
    text
}

/// Strip LaTeX markup from `text`
pub fn detex(text: &str) -> String {
    DetexStage::PIPELINE
        .iter()
        .fold(text.to_string(), |acc, stage| stage.apply(&acc))
}

/// [`detex`] plus removal of any backslash left behind by unknown commands
pub fn detex_for_display(text: &str) -> String {
    BACKSLASH.replace_all(&detex(text), "").into_owned()
}

/// Number of whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_dropped() {
        let text = "\\documentclass{article}\n\\usepackage{x}\n\\begin{document}\nBody text";
        assert_eq!(DetexStage::Header.apply(text), "\nBody text");
        // no document environment: nothing to drop
        assert_eq!(DetexStage::Header.apply("plain"), "plain");
    }

    #[test]
    fn test_comments_stripped_but_escaped_percent_kept() {
        let text = "% leading\nfifty \\% done % trailing\nnext";
        assert_eq!(DetexStage::Comments.apply(text), "\nfifty \\% done \nnext");
    }

    #[test]
    fn test_reduce_single_brace_level() {
        assert_eq!(DetexStage::Reduce.apply(r"an \emph{important} word"), "an important word");
        // inner commands go first, which leaves the outer one a single level
        assert_eq!(DetexStage::Reduce.apply(r"\textbf{bold \emph{x}}"), "bold x");
        // nested plain braces are not reduced
        assert_eq!(DetexStage::Reduce.apply(r"\textit{a {b} c}"), r"\textit{a {b} c}");
    }

    #[test]
    fn test_highlight_headings_and_references() {
        assert_eq!(
            DetexStage::Highlight.apply(r"\section*{Intro} see \cite{knuth} and \ref{fig}"),
            "\n#--Intro--#\n see [knuth] and [fig]"
        );
        assert_eq!(
            DetexStage::Highlight.apply(r"\subparagraph{Tiny}"),
            "\n#--Tiny--#\n"
        );
    }

    #[test]
    fn test_remove_commands_with_arguments() {
        assert_eq!(
            DetexStage::Remove.apply(r"a\includegraphics[width=3cm]{fig.png}b"),
            "a b"
        );
        assert_eq!(DetexStage::Remove.apply(r"\label{sec:x}"), " ");
        // whole-word match: \rightarrow is not \right
        assert_eq!(DetexStage::Remove.apply(r"\rightarrow"), r"\rightarrow");
    }

    #[test]
    fn test_replace_symbols() {
        let replaced = DetexStage::Replace.apply(r"a \ldots b \rightarrow c~d \& e");
        assert_eq!(replaced, "a... b -> c d & e");
        assert_eq!(DetexStage::Replace.apply(r"x \le y \geq z"), "x <= y >= z");
        assert_eq!(DetexStage::Replace.apply(r#"caf\'e na\"{i}ve"#), "café na\\\"ive");
        assert_eq!(DetexStage::Replace.apply("a & b"), "a \t b");
    }

    #[test]
    fn test_rule_tables() {
        let replace = DetexStage::Replace.rules();
        assert_eq!(replace.len(), REPLACEMENTS.len());
        for (rule, (pattern, replacement)) in replace.iter().zip(REPLACEMENTS) {
            assert_eq!(rule.pattern(), *pattern);
            assert_eq!(rule.replacement(), *replacement);
        }

        let remove = DetexStage::Remove.rules();
        assert_eq!(remove.len(), REMOVE_COMMANDS.len());
        for (rule, cmd) in remove.iter().zip(REMOVE_COMMANDS) {
            assert!(rule.pattern().starts_with(&format!(r"\\{}\b", cmd)));
            assert_eq!(rule.replacement(), " ");
        }
    }

    #[test]
    fn test_math_delimiters() {
        assert_eq!(DetexStage::Replace.apply(r"let $x$ and $a+b$ be"), "let x and a+b be");
        assert_eq!(DetexStage::Replace.apply(r"costs \$5"), r"costs \$5");
    }

    #[test]
    fn test_whitespace_cleanup() {
        assert_eq!(DetexStage::Replace.apply("a  ,b ."), "a,b.");
        assert_eq!(DetexStage::Replace.apply("a  \n\n\n\n b"), "a\n\n b");
    }

    #[test]
    fn test_lonely_braces() {
        assert_eq!(DetexStage::Replace.apply("x {grouped} y"), "x grouped y");
        assert_eq!(DetexStage::Replace.apply("tail} rest"), "tail rest");
    }

    #[test]
    fn test_full_pipeline() {
        let source = r"\documentclass{article}
\begin{document}
\section{Introduction}\label{sec:intro}
We use \emph{very} simple tools~\cite{knuth1984}. % todo
\begin{itemize}
\item First
\end{itemize}
\end{document}
";
        let text = detex(source);
        assert!(text.contains("#--Introduction--#"));
        assert!(text.contains("We use very simple tools [knuth1984]."));
        assert!(text.contains("\t- First"));
        assert!(!text.contains("todo"));
        assert!(!text.contains("itemize"));
        // heading marker, six body words, the item bullet and its word
        assert_eq!(count_words(&text), 9);
    }

    #[test]
    fn test_display_strips_leftover_backslashes() {
        assert_eq!(detex_for_display(r"\unknown word"), "unknown word");
    }

    #[test]
    fn test_pipeline_order() {
        assert_eq!(DetexStage::PIPELINE[0], DetexStage::Header);
        assert_eq!(DetexStage::PIPELINE[5], DetexStage::Replace);
        assert!(DetexStage::PIPELINE.iter().all(|s| !s.rules().is_empty()));
    }
}

//! Subcommand implementations
//!
//! Each command prints an upper-cased banner, then its report on stdout.

use std::path::{Path, PathBuf};

use texkit_bibtex::{expand_field_selection, load_bibliography, CachePolicy};
use texkit_core::{
    create_bibliography as rewrite_bibliography, detex_for_display, export_word_counts,
    read_tex_file, CitationExtractor, CitationFilter, CitationReport, RewriteRequest, TexDocument,
    TexkitConfig, TexkitError, TexkitResult, WordCount,
};

fn banner(text: &str) {
    println!("{}", text.to_uppercase());
}

fn word_count_banner(tex: &Path, write_csv: bool) -> String {
    let mut text = format!("\n\nword count for file {}", tex.display());
    if write_csv {
        text.push_str(" - writing counts to two csv files");
    }
    text
}

/// Expanded, sorted list of the fields a rewrite drops
fn removal_notice(remove_fields: &[String]) -> String {
    let mut fields: Vec<String> = expand_field_selection(remove_fields).into_iter().collect();
    fields.sort();
    format!(
        "the following fields will be removed from the new bibliography: {}",
        fields.join(", ")
    )
}

pub fn detex(tex: &Path, output: Option<&Path>) -> TexkitResult<()> {
    let text = detex_for_display(&read_tex_file(tex)?);
    banner(&format!("detex file {}", tex.display()));
    match output {
        Some(path) => {
            std::fs::write(path, text).map_err(|e| TexkitError::io(path, e))?;
            println!("wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

pub fn count_words(
    tex: &Path,
    ignore_tc: bool,
    write_csv: bool,
    config: &TexkitConfig,
) -> TexkitResult<()> {
    // validate before doing any work
    let delimiter = config.csv_delimiter_byte()?;
    let document = TexDocument::from_file(tex)?.prepared(ignore_tc);

    banner(&word_count_banner(tex, write_csv));
    let counts = WordCount::from_document(&document);
    if counts.is_empty() {
        tracing::warn!("no sectioning commands found in {}", tex.display());
    }
    print!("{}", counts.render());

    if write_csv {
        for path in export_word_counts(tex, &counts, delimiter)? {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

pub fn count_citations(
    tex: &Path,
    bibliography: Option<&Path>,
    citation_keys: Vec<String>,
    patterns: Vec<String>,
    ignore_tc: bool,
    cache: CachePolicy,
    config: &TexkitConfig,
) -> TexkitResult<()> {
    let filter = CitationFilter {
        key_filters: citation_keys,
        patterns,
    };
    if !filter.patterns.is_empty() && bibliography.is_none() {
        return Err(TexkitError::Usage(
            "--patterns requires --bibliography".to_string(),
        ));
    }

    let extractor = CitationExtractor::new(&config.cite_commands)?;
    let document = TexDocument::from_file(tex)?.prepared(ignore_tc);
    let bibliography = bibliography
        .map(|path| load_bibliography(path, cache))
        .transpose()?;

    banner(&format!("counting citations in {}", tex.display()));
    let keys = filter.apply(extractor.extract(&document), bibliography.as_ref())?;
    let report = CitationReport::from_keys(&keys);
    print!("{}", report.render(bibliography.as_ref()));
    Ok(())
}

pub fn create_bibliography(
    tex: PathBuf,
    bibliography: PathBuf,
    output: PathBuf,
    remove_fields: Vec<String>,
    cache: CachePolicy,
    config: &TexkitConfig,
) -> TexkitResult<()> {
    banner("creating new bibfile");
    println!("input tex document: {}", tex.display());
    println!("input bibtex database: {}", bibliography.display());

    let remove_fields = if remove_fields.is_empty() {
        config.remove_fields.clone()
    } else {
        remove_fields
    };
    println!("{}", removal_notice(&remove_fields));
    let request = RewriteRequest {
        tex_path: tex,
        bib_path: bibliography,
        output_path: output,
        remove_fields,
        cache,
    };
    let extractor = CitationExtractor::new(&config.cite_commands)?;
    let summary = rewrite_bibliography(&request, &extractor)?;

    println!(
        "found {} citations in the file {}\nwriting new bibtex file to {}",
        summary.cited,
        request.tex_path.display(),
        request.output_path.display()
    );
    if !summary.missing.is_empty() {
        println!(
            "{} cited keys were not found in the bibliography: {}",
            summary.missing.len(),
            summary.missing.join(", ")
        );
    }
    Ok(())
}

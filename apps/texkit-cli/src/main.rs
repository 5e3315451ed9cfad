//! texkit - LaTeX helper tools
//!
//! Plain-text rendering, per-section word counts, citation statistics and
//! trimmed bibliographies for LaTeX documents.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use texkit_bibtex::CachePolicy;
use texkit_core::TexkitConfig;

#[derive(Parser)]
#[command(name = "texkit")]
#[command(version)]
#[command(about = "Word counts, citation statistics and bibliography trimming for LaTeX", long_about = None)]
struct Cli {
    /// Use the JSON sidecar cache (<bib>.json) of parsed bibliographies
    #[arg(long, global = true)]
    cache: bool,

    /// Re-parse the bibliography and overwrite its JSON cache
    #[arg(long, global = true)]
    refresh_cache: bool,

    /// Configuration file (default: ./texkit.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Strip LaTeX markup and print (or write) the plain text
    Detex {
        /// Path to the LaTeX file
        tex: PathBuf,

        /// Write the text to FILE instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Count words per heading and per subpart
    CountWords {
        /// Path to the LaTeX file
        tex: PathBuf,

        /// Ignore lines between %TC:ignore and %TC:endignore
        #[arg(short = 'i', long)]
        ignore_tc: bool,

        /// Write <stem>-wordcount.csv and <stem>-wordcount-till-next-header.csv
        #[arg(short = 'w', long)]
        write_csv: bool,
    },

    /// Show how often each reference is cited
    CountCitations {
        /// Path to the LaTeX file
        tex: PathBuf,

        /// BibTeX file used to annotate keys and for --patterns
        #[arg(short = 'b', long)]
        bibliography: Option<PathBuf>,

        /// Only keys containing one of these strings
        #[arg(short = 'c', long, num_args = 1..)]
        citation_keys: Vec<String>,

        /// Only references whose title or authors match (case-insensitive regex)
        #[arg(short = 'p', long, num_args = 1..)]
        patterns: Vec<String>,

        /// Ignore lines between %TC:ignore and %TC:endignore
        #[arg(short = 'i', long)]
        ignore_tc: bool,
    },

    /// Write a bibliography holding only the entries cited in a document
    CreateBibliography {
        /// Path to the LaTeX file
        tex: PathBuf,

        /// Source BibTeX file
        #[arg(short = 'b', long)]
        bibliography: PathBuf,

        /// Output BibTeX file
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Fields to remove ("most" selects a preset); defaults to the config value
        #[arg(short = 'r', long, num_args = 1..)]
        remove_fields: Vec<String>,
    },
}

impl Cli {
    fn cache_policy(&self, config: &TexkitConfig) -> CachePolicy {
        if self.refresh_cache {
            CachePolicy::Refresh
        } else if self.cache || config.use_cache {
            CachePolicy::ReadWrite
        } else {
            CachePolicy::Disabled
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TexkitConfig::load(cli.config.as_deref())?;
    let cache = cli.cache_policy(&config);

    match cli.command {
        Commands::Detex { tex, output } => commands::detex(&tex, output.as_deref())?,
        Commands::CountWords {
            tex,
            ignore_tc,
            write_csv,
        } => commands::count_words(&tex, ignore_tc, write_csv, &config)?,
        Commands::CountCitations {
            tex,
            bibliography,
            citation_keys,
            patterns,
            ignore_tc,
        } => commands::count_citations(
            &tex,
            bibliography.as_deref(),
            citation_keys,
            patterns,
            ignore_tc,
            cache,
            &config,
        )?,
        Commands::CreateBibliography {
            tex,
            bibliography,
            output,
            remove_fields,
        } => commands::create_bibliography(tex, bibliography, output, remove_fields, cache, &config)?,
    }

    Ok(())
}

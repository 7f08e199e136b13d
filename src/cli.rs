use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A cross-file symbol and call resolution engine for indentation-sensitive,
/// dynamically-typed codebases.
///
/// pygraph consumes a pre-parsed `IndexInput` JSON document and resolves
/// imports, base classes, and call sites into a queryable dependency,
/// inheritance, and call graph — it never parses source itself.
#[derive(Parser, Debug)]
#[command(
    name = "pygraph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for summary and query results.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable plain-text summary (default).
    #[default]
    Text,
    /// Structured JSON object suitable for programmatic consumption.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a graph from an `IndexInput` JSON document and write a snapshot.
    Build {
        /// Path to the `IndexInput` JSON document to ingest.
        input: PathBuf,

        /// Project root snapshots are written under (`<root>/.pygraph/graph.bin`).
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Print per-phase diagnostics to stderr.
        #[arg(short, long)]
        verbose: bool,

        /// Output format for the final summary.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the aggregate statistics of the most recent snapshot.
    Stats {
        /// Project root holding the snapshot.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate a snapshot's internal consistency without rebuilding it.
    ///
    /// Reports duplicate module paths and orphaned `module_map` targets;
    /// exits non-zero when issues are found.
    Validate {
        /// Project root holding the snapshot.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Union a peer snapshot into the project root's snapshot.
    Merge {
        /// Path to the peer snapshot (`graph.bin`) to merge in.
        peer: PathBuf,

        /// Project root holding the base snapshot.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Resolve one symbol against the project root's snapshot and print the
    /// matching node id, if any.
    Resolve {
        /// Symbol name to resolve (bare or dotted, e.g. `Loader.load`).
        symbol: String,

        /// File id providing the resolution context (its module and imports).
        #[arg(long)]
        from: String,

        /// Project root holding the snapshot.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

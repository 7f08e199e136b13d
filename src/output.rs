use crate::error::BuildStats;
use crate::cli::OutputFormat;

/// Print a summary of a build's aggregate statistics.
///
/// - `Json`: emit a pretty-printed JSON object to stdout.
/// - `Text`: emit a plain human-readable summary to stdout.
///
/// Any issues found are always written to **stderr**, so the stdout stream
/// stays clean for downstream JSON consumers even under `Json`.
pub fn print_summary(stats: &BuildStats, format: &OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        match serde_json::to_string_pretty(stats) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("error serialising stats: {e}"),
        }
        return;
    }

    println!(
        "Processed {} files, {} modules, {} symbols exported",
        stats.files_processed, stats.modules_created, stats.symbols_exported,
    );
    println!(
        "  {} dependency edges, {} inheritance edges, {} call edges",
        stats.dependency_edges, stats.inheritance_edges, stats.call_edges,
    );
    println!(
        "  Resolved {} of {} call sites",
        stats.calls_resolved, stats.calls_total,
    );

    if !stats.issues.is_empty() {
        eprintln!("  {} issue(s) found:", stats.issues.len());
        for issue in &stats.issues {
            eprintln!("    [{:?}] {}", issue.kind, issue.message);
        }
    }
}

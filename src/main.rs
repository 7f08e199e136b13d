mod cli;
mod config;
mod element;
mod error;
mod global_index;
mod graph;
mod ingest;
mod module_resolver;
mod output;
mod path_module;
mod snapshot;
mod symbol_resolver;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;

use cli::{Cli, Commands, OutputFormat};
use config::PygraphConfig;
use error::BuildStats;
use global_index::GlobalIndex;
use snapshot::BuiltIndex;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            root,
            verbose,
            format,
        } => cmd_build(&input, &root, verbose, &format),
        Commands::Stats { root, format } => cmd_stats(&root, &format),
        Commands::Validate { root, format } => cmd_validate(&root, &format),
        Commands::Merge { peer, root } => cmd_merge(&peer, &root),
        Commands::Resolve { symbol, from, root } => cmd_resolve(&symbol, &from, &root),
    }
}

fn cmd_build(input_path: &Path, root: &Path, verbose: bool, format: &OutputFormat) -> Result<()> {
    let config = PygraphConfig::load(root);
    if verbose {
        if let Some(name) = &config.repo_name {
            eprintln!("  config: repo_name = {name}");
        }
    }

    let (input, mut issues) = ingest::read(input_path)
        .with_context(|| format!("reading ingestion input from {}", input_path.display()))?;
    if verbose {
        eprintln!(
            "  ingested {} elements, {} files with calls, {} files with assignments",
            input.elements.len(),
            input.calls.len(),
            input.assignments.len(),
        );
    }

    let index = GlobalIndex::build(&input.elements, root);
    issues.extend(index.validate().into_iter().map(error::Issue::structural));
    if verbose {
        eprintln!(
            "  global index: {} modules, {} exported symbols",
            index.modules_len(),
            index.exports_len(),
        );
    }

    let (graph, builder_stats) =
        graph::builder::build(&input.elements, &index, &input.calls, &input.assignments);
    if verbose {
        eprintln!(
            "  graph: {} dependency edges, {} inheritance edges, {} call edges",
            graph.dependency_edge_count(),
            graph.inheritance_edge_count(),
            graph.call_edge_count(),
        );
    }

    let mut stats: BuildStats = builder_stats.into();
    stats.issues.extend(issues);

    let built = BuiltIndex::new(input.repo_name, input.elements, index, graph);
    snapshot::save(root, &built)
        .with_context(|| format!("writing snapshot under {}", root.display()))?;

    output::print_summary(&stats, format);
    Ok(())
}

fn cmd_stats(root: &Path, format: &OutputFormat) -> Result<()> {
    let built = snapshot::load(root)
        .with_context(|| format!("no snapshot found under {}", root.display()))?;

    let stats = BuildStats {
        files_processed: built
            .elements
            .iter()
            .filter(|e| e.kind == element::ElementKind::File)
            .count(),
        modules_created: built.index.modules_len(),
        symbols_exported: built.index.exports_len(),
        dependency_edges: built.graph.dependency_edge_count(),
        inheritance_edges: built.graph.inheritance_edge_count(),
        call_edges: built.graph.call_edge_count(),
        calls_resolved: 0,
        calls_total: 0,
        issues: built.index.validate().into_iter().map(error::Issue::structural).collect(),
    };

    output::print_summary(&stats, format);
    Ok(())
}

fn cmd_validate(root: &Path, format: &OutputFormat) -> Result<()> {
    let built = snapshot::load(root)
        .with_context(|| format!("no snapshot found under {}", root.display()))?;
    let issues: Vec<error::Issue> = built
        .index
        .validate()
        .into_iter()
        .map(error::Issue::structural)
        .collect();

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else if issues.is_empty() {
        println!("no issues found");
    } else {
        for issue in &issues {
            println!("[{:?}] {}", issue.kind, issue.message);
        }
    }

    if !issues.is_empty() {
        bail!("{} issue(s) found", issues.len());
    }
    Ok(())
}

fn cmd_merge(peer_path: &Path, root: &Path) -> Result<()> {
    let mut base = snapshot::load(root)
        .with_context(|| format!("no snapshot found under {}", root.display()))?;
    let peer = snapshot::load_from_file(peer_path)
        .with_context(|| format!("could not load peer snapshot {}", peer_path.display()))?;

    snapshot::merge_builds(&mut base, &peer);
    snapshot::save(root, &base)?;

    println!(
        "merged: {} elements, {} dependency edges, {} inheritance edges, {} call edges",
        base.elements.len(),
        base.graph.dependency_edge_count(),
        base.graph.inheritance_edge_count(),
        base.graph.call_edge_count(),
    );
    Ok(())
}

fn cmd_resolve(symbol: &str, from: &str, root: &Path) -> Result<()> {
    let built = snapshot::load(root)
        .with_context(|| format!("no snapshot found under {}", root.display()))?;
    let Some(from_elem) = built.element_by_id(from) else {
        bail!("unknown file id '{from}'");
    };

    let result = symbol_resolver::resolve(&built.index, symbol, from, &from_elem.metadata.imports);
    match result {
        Some(id) => println!("{id}"),
        None => println!("unresolved"),
    }
    Ok(())
}

//! C0 — Ingestion reader (ambient).
//!
//! Reads the externally-produced `IndexInput` JSON document — the contract
//! boundary between whatever extracts entities/calls/assignments from
//! source and this crate's resolution pipeline, which never parses source
//! itself (see SPEC_FULL.md §1, §4.0).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::element::{AssignmentMap, CallRecord, CodeElement};
use crate::error::Issue;

/// On-disk shape of one ingestion document: everything the Graph Builder (C5)
/// needs for a single repository's build, keyed by file id where per-file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInput {
    pub repo_name: String,
    pub elements: Vec<CodeElement>,
    #[serde(default)]
    pub calls: HashMap<String, Vec<CallRecord>>,
    #[serde(default)]
    pub assignments: HashMap<String, AssignmentMap>,
}

/// Reads and shape-validates an `IndexInput` document from `path`.
///
/// Shape validation confirms every `calls`/`assignments` key names a file id
/// that actually appears among `elements` — a dangling key is reported as a
/// structural inconsistency, not a hard failure, matching this crate's
/// general policy of surfacing issues rather than refusing to build.
pub fn read(path: &Path) -> anyhow::Result<(IndexInput, Vec<Issue>)> {
    let contents = std::fs::read_to_string(path)?;
    let input: IndexInput = serde_json::from_str(&contents)?;
    let issues = validate(&input);
    Ok((input, issues))
}

fn validate(input: &IndexInput) -> Vec<Issue> {
    let known_ids: std::collections::HashSet<&str> =
        input.elements.iter().map(|e| e.id.as_str()).collect();
    let mut issues = Vec::new();

    for file_id in input.calls.keys() {
        if !known_ids.contains(file_id.as_str()) {
            issues.push(Issue::structural(format!(
                "calls entry references unknown file id '{file_id}'"
            )));
        }
    }
    for file_id in input.assignments.keys() {
        if !known_ids.contains(file_id.as_str()) {
            issues.push(Issue::structural(format!(
                "assignments entry references unknown file id '{file_id}'"
            )));
        }
    }

    issues
}

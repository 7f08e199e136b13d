//! Structural-inconsistency reporting. These are findings about the input
//! data, not exceptions — callers decide whether to fail or just print them.

use serde::{Deserialize, Serialize};

/// One structural inconsistency found while building or validating an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A reference (import target, base class, call target) a resolver
    /// could not find a matching definition for.
    ResolutionMiss,
    /// An internal table points at something that does not exist — e.g. a
    /// `module_map` entry whose file id was never produced.
    StructuralInconsistency,
    /// A cross-repo or self-reference invariant would have been violated by
    /// an edge the builder refused to add.
    InvariantViolation,
}

impl Issue {
    pub fn structural(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::StructuralInconsistency,
            message: message.into(),
        }
    }

    pub fn resolution_miss(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::ResolutionMiss,
            message: message.into(),
        }
    }
}

/// Aggregated counts surfaced by `pygraph stats` / `pygraph build`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    pub files_processed: usize,
    pub modules_created: usize,
    pub symbols_exported: usize,
    pub dependency_edges: usize,
    pub inheritance_edges: usize,
    pub call_edges: usize,
    pub calls_resolved: usize,
    pub calls_total: usize,
    pub issues: Vec<Issue>,
}

impl From<crate::graph::builder::BuildStats> for BuildStats {
    fn from(s: crate::graph::builder::BuildStats) -> Self {
        Self {
            files_processed: s.files_processed,
            modules_created: s.modules_created,
            symbols_exported: s.symbols_exported,
            dependency_edges: s.dependency_edges,
            inheritance_edges: s.inheritance_edges,
            call_edges: s.call_edges,
            calls_resolved: s.calls_resolved,
            calls_total: s.calls_total,
            issues: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_builder_stats() {
        let builder_stats = crate::graph::builder::BuildStats {
            files_processed: 3,
            calls_total: 5,
            calls_resolved: 4,
            ..Default::default()
        };
        let stats: BuildStats = builder_stats.into();
        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.calls_resolved, 4);
        assert!(stats.issues.is_empty());
    }
}

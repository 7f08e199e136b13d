//! Edge attribute types for the three graphs owned by [`super::CodeGraph`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::element::CallType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Resolver,
    Fallback,
}

/// `importer -> imported`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub module: String,
    pub level: u32,
    pub resolution: Resolution,
}

/// `subclass -> superclass`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceEdge {
    pub base_name: String,
}

/// `caller -> callee`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEdge {
    pub call_name: String,
    pub call_type: CallType,
    pub file_path: PathBuf,
    pub node_text: String,
}

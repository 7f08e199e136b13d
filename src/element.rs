//! The entity and record shapes produced by the external parser and consumed,
//! unchanged, by the resolution pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Discriminant for [`CodeElement`]. A method is a `Function` whose
/// `class_name` metadata is set, not a separate kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    File,
    Class,
    Function,
    Documentation,
}

/// Kind-specific metadata, accessed only after matching on the element's
/// `kind` — mirrors the tagged-union shape of the upstream parser's record
/// rather than a class hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Set for `ElementKind::File` elements.
    pub imports: Vec<ImportRecord>,
    /// Set for `ElementKind::Class` elements — base class names as they
    /// textually appear in the source.
    pub bases: Vec<String>,
    /// Set for `ElementKind::Function` elements that are methods.
    pub class_name: Option<String>,
    /// Set for `ElementKind::Function` elements.
    pub parameters: Vec<String>,
}

/// A single parsed code artifact: a file, a class, a function/method, or a
/// documentation block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeElement {
    /// Stable, globally-unique id: `{repo}_{kind}_{hash(repo, path, qualified-name)}`.
    pub id: String,
    pub kind: ElementKind,
    pub name: String,
    pub file_path: PathBuf,
    pub relative_path: PathBuf,
    pub repo_name: String,
    pub metadata: Metadata,

    /// Passenger fields carried through to snapshot output but never read by
    /// the resolution logic itself.
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub summary: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
}

impl CodeElement {
    /// True if this element is a method (a function with an owning class).
    pub fn is_method(&self) -> bool {
        self.kind == ElementKind::Function && self.metadata.class_name.is_some()
    }

    /// True if this file element's name is the package-initializer convention.
    pub fn is_package_file(&self) -> bool {
        self.file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s == "__init__")
            .unwrap_or(false)
    }
}

/// An `import`/`from ... import ...` statement inside a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Module name after `from` (may be empty for `from . import X`).
    pub module: String,
    /// Names listed after `import`.
    pub names: Vec<String>,
    /// Single alias — only meaningful when `names` has exactly one element.
    pub alias: Option<String>,
    /// 0 = absolute, k = relative with k leading dots.
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Simple,
    Attribute,
}

/// One call site, as produced by the external call extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Final attribute in the call (`c` for `a.b.c()`).
    pub call_name: String,
    pub call_type: CallType,
    /// Left-most identifier for `attribute` calls (`self`, `cls`, `service`, ...).
    pub base_object: Option<String>,
    /// `"kind::name"` of the smallest enclosing definition, or `None` at module scope.
    pub scope_id: Option<String>,
    pub node_text: String,
}

/// Per-scope variable → candidate-class-names map, keyed by `scope_id`
/// (plus the pseudo-scopes `"global"` and `"function::__init__"`).
pub type AssignmentMap = std::collections::HashMap<String, std::collections::HashMap<String, Vec<String>>>;

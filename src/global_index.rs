//! C2 — Global Index.
//!
//! Owns the three lookup tables (`file_map`, `module_map`, `export_map`)
//! built once per repository, plus a memoized `file_id → module_path`
//! reverse map so every resolution afterwards is an O(1) hash probe instead
//! of the linear scan the upstream tool performs on each lookup.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::element::{CodeElement, ElementKind};
use crate::path_module::file_path_to_module_path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalIndex {
    file_map: HashMap<String, String>,
    module_map: HashMap<String, String>,
    reverse_module: HashMap<String, String>,
    export_map: HashMap<String, HashMap<String, String>>,
    /// Duplicate-module-path collisions recorded at build time (first
    /// writer wins in `module_map`; every subsequent collision is reported
    /// here, non-fatally, per the spec's validation contract).
    duplicate_module_issues: Vec<String>,
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl GlobalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase A + Phase B build, consuming the full entity list for one repo.
    pub fn build(elements: &[CodeElement], repo_root: &Path) -> Self {
        let mut index = Self::new();

        // Phase A: files only.
        for elem in elements.iter().filter(|e| e.kind == ElementKind::File) {
            let key = path_key(&elem.file_path);
            index.file_map.insert(key, elem.id.clone());

            if let Some(module_path) = file_path_to_module_path(&elem.file_path, repo_root) {
                if let Some(existing) = index.module_map.get(&module_path) {
                    if existing != &elem.id {
                        index.duplicate_module_issues.push(format!(
                            "duplicate module path '{module_path}': already mapped to '{existing}', also claimed by '{}'",
                            elem.id
                        ));
                    }
                } else {
                    index.module_map.insert(module_path.clone(), elem.id.clone());
                    index.reverse_module.insert(elem.id.clone(), module_path);
                }
            }
        }

        // Phase B: classes and functions.
        for elem in elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Class | ElementKind::Function))
        {
            let Some(file_id) = index.file_map.get(&path_key(&elem.file_path)).cloned() else {
                continue;
            };
            let Some(module_path) = index.reverse_module.get(&file_id).cloned() else {
                continue;
            };

            index
                .export_map
                .entry(module_path.clone())
                .or_default()
                .insert(elem.name.clone(), elem.id.clone());

            if let Some(class_name) = &elem.metadata.class_name {
                index
                    .export_map
                    .entry(module_path)
                    .or_default()
                    .insert(format!("{class_name}.{}", elem.name), elem.id.clone());
            }
        }

        index
    }

    pub fn file_id_by_path(&self, path: &Path) -> Option<&str> {
        self.file_map.get(&path_key(path)).map(String::as_str)
    }

    pub fn file_id_by_module(&self, module: &str) -> Option<&str> {
        self.module_map.get(module).map(String::as_str)
    }

    /// O(1) reverse lookup, memoized at build time.
    pub fn module_of_file(&self, file_id: &str) -> Option<&str> {
        self.reverse_module.get(file_id).map(String::as_str)
    }

    pub fn exported_symbol(&self, module: &str, name: &str) -> Option<&str> {
        self.export_map.get(module)?.get(name).map(String::as_str)
    }

    pub fn module_exports(&self, module: &str) -> Option<&HashMap<String, String>> {
        self.export_map.get(module)
    }

    pub fn modules_len(&self) -> usize {
        self.module_map.len()
    }

    pub fn files_len(&self) -> usize {
        self.file_map.len()
    }

    pub fn exports_len(&self) -> usize {
        self.export_map.values().map(|m| m.len()).sum()
    }

    /// Structural-inconsistency report: orphaned `module_map` targets plus
    /// the duplicate-module-path collisions recorded during build.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.duplicate_module_issues.clone();
        let known_file_ids: std::collections::HashSet<&str> =
            self.file_map.values().map(String::as_str).collect();
        for (module, file_id) in &self.module_map {
            if !known_file_ids.contains(file_id.as_str()) {
                issues.push(format!(
                    "module '{module}' maps to unknown file id '{file_id}'"
                ));
            }
        }
        issues
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Unions a peer index into this one. Used by snapshot merge (§6):
    /// `module_map`/`export_map` entries are only inserted when the key is
    /// absent, never overwritten, keeping each repo's first-writer-wins
    /// result stable across merges.
    pub fn merge_from(&mut self, other: &GlobalIndex) {
        for (path, id) in &other.file_map {
            self.file_map.entry(path.clone()).or_insert_with(|| id.clone());
        }
        for (module, id) in &other.module_map {
            self.module_map.entry(module.clone()).or_insert_with(|| id.clone());
        }
        for (id, module) in &other.reverse_module {
            self.reverse_module.entry(id.clone()).or_insert_with(|| module.clone());
        }
        for (module, exports) in &other.export_map {
            let entry = self.export_map.entry(module.clone()).or_default();
            for (name, id) in exports {
                entry.entry(name.clone()).or_insert_with(|| id.clone());
            }
        }
        self.duplicate_module_issues
            .extend(other.duplicate_module_issues.iter().cloned());
    }
}

//! Versioned, atomically-written binary persistence for a built index —
//! the `.pygraph/graph.bin` snapshot described in SPEC_FULL.md §6.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::element::{CodeElement, ImportRecord};
use crate::global_index::GlobalIndex;
use crate::graph::CodeGraph;

/// Bump when any serialized struct's layout changes — bincode has no
/// self-describing schema, so a stale snapshot must be detected by version
/// tag alone, not by attempting (and silently misinterpreting) a decode.
pub const SNAPSHOT_VERSION: u32 = 1;

pub const SNAPSHOT_DIR: &str = ".pygraph";
pub const SNAPSHOT_FILE: &str = "graph.bin";

/// Everything one `build` produces for a repository, in a form that survives
/// a bincode round-trip.
///
/// Carries both an id-keyed and a name-keyed element index (§6): the
/// id index is authoritative and is what every lookup in this crate uses;
/// the name index exists only as a secondary lookup for legacy snapshots
/// that predate the id index, and silently loses entities sharing a name
/// since it only ever kept the last writer.
#[derive(Serialize, Deserialize)]
pub struct BuiltIndex {
    pub version: u32,
    pub repo_name: String,
    pub elements: Vec<CodeElement>,
    pub index: GlobalIndex,
    pub graph: CodeGraph,

    id_index: HashMap<String, usize>,
    name_index: HashMap<String, usize>,
    /// `file_id -> that file's import records`, mirroring §6's file→imports map.
    file_imports: HashMap<String, Vec<ImportRecord>>,
}

impl BuiltIndex {
    pub fn new(repo_name: String, elements: Vec<CodeElement>, index: GlobalIndex, graph: CodeGraph) -> Self {
        let (id_index, name_index, file_imports) = build_element_indices(&elements);
        Self {
            version: SNAPSHOT_VERSION,
            repo_name,
            elements,
            index,
            graph,
            id_index,
            name_index,
            file_imports,
        }
    }

    /// Looks up an element by id — the authoritative index (§6).
    pub fn element_by_id(&self, id: &str) -> Option<&CodeElement> {
        self.id_index.get(id).map(|&i| &self.elements[i])
    }

    /// Looks up an element by name — secondary lookup only, for legacy
    /// snapshots that carry no id index; last writer wins on a name
    /// collision, which is exactly the historical data loss this crate's id
    /// index exists to avoid.
    pub fn element_by_name(&self, name: &str) -> Option<&CodeElement> {
        self.name_index.get(name).map(|&i| &self.elements[i])
    }

    pub fn imports_for_file(&self, file_id: &str) -> Option<&[ImportRecord]> {
        self.file_imports.get(file_id).map(Vec::as_slice)
    }

    /// Rebuilds the id/name/file-imports indices from `self.elements`. Call
    /// after mutating `elements` directly (e.g. during merge) to keep the
    /// indices in sync.
    fn reindex(&mut self) {
        let (id_index, name_index, file_imports) = build_element_indices(&self.elements);
        self.id_index = id_index;
        self.name_index = name_index;
        self.file_imports = file_imports;
    }
}

fn build_element_indices(
    elements: &[CodeElement],
) -> (HashMap<String, usize>, HashMap<String, usize>, HashMap<String, Vec<ImportRecord>>) {
    let mut id_index = HashMap::new();
    let mut name_index = HashMap::new();
    let mut file_imports = HashMap::new();

    for (i, elem) in elements.iter().enumerate() {
        id_index.insert(elem.id.clone(), i);
        name_index.insert(elem.name.clone(), i);
        if elem.kind == crate::element::ElementKind::File {
            file_imports.insert(elem.id.clone(), elem.metadata.imports.clone());
        }
    }

    (id_index, name_index, file_imports)
}

pub fn snapshot_path(project_root: &Path) -> PathBuf {
    project_root.join(SNAPSHOT_DIR).join(SNAPSHOT_FILE)
}

/// Writes `built` to `<project_root>/.pygraph/graph.bin`, via a temp file in
/// the same directory followed by a rename, so a crash mid-write never
/// leaves a half-written snapshot in the real path.
pub fn save(project_root: &Path, built: &BuiltIndex) -> anyhow::Result<()> {
    let dir = project_root.join(SNAPSHOT_DIR);
    std::fs::create_dir_all(&dir)?;

    let target = snapshot_path(project_root);
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    bincode::serde::encode_into_std_write(built, &mut tmp, bincode::config::standard())?;
    std::io::Write::flush(tmp.as_file_mut())?;
    tmp.persist(&target)?;

    Ok(())
}

/// Loads a snapshot from `<project_root>/.pygraph/graph.bin`. Returns `None`
/// when the file is absent, version-mismatched, or corrupt — the caller
/// rebuilds from scratch rather than treating this as fatal.
pub fn load(project_root: &Path) -> Option<BuiltIndex> {
    load_from_file(&snapshot_path(project_root))
}

/// Loads a snapshot from an arbitrary path rather than a project root's
/// conventional location — used by `merge` to read a peer snapshot file.
pub fn load_from_file(path: &Path) -> Option<BuiltIndex> {
    let bytes = std::fs::read(path).ok()?;
    let result =
        bincode::serde::decode_from_slice::<BuiltIndex, _>(&bytes, bincode::config::standard());
    match result {
        Ok((built, _)) if built.version == SNAPSHOT_VERSION => Some(built),
        _ => None,
    }
}

/// Unions a peer snapshot into `base`: elements are appended when their id is
/// unseen, the global index and all three graphs are unioned by id (never by
/// name) via their own `merge_from`. Mirrors the upstream tool's
/// `merge_from_file`, including the id-over-name preference that avoids its
/// documented name-collision data loss.
pub fn merge_builds(base: &mut BuiltIndex, peer: &BuiltIndex) {
    let known_ids: std::collections::HashSet<&str> =
        base.elements.iter().map(|e| e.id.as_str()).collect();
    let mut appended = false;
    for elem in &peer.elements {
        if !known_ids.contains(elem.id.as_str()) {
            base.elements.push(elem.clone());
            appended = true;
        }
    }
    if appended {
        base.reindex();
    }
    base.index.merge_from(&peer.index);
    base.graph.merge_from(&peer.graph);
}

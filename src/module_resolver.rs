//! C3 — Module Resolver.
//!
//! Resolves an import record (absolute or relative, with the
//! package-vs-module strip asymmetry) to a file id.

use crate::global_index::GlobalIndex;

/// `resolve(current_module, import_name, level, is_package) -> file_id | None`.
///
/// `is_package` is true iff the file whose imports are being resolved is an
/// `__init__`-style package file.
pub fn resolve(
    index: &GlobalIndex,
    current_module: &str,
    import_name: &str,
    level: u32,
    is_package: bool,
) -> Option<String> {
    if level == 0 {
        return resolve_absolute(index, import_name);
    }
    resolve_relative(index, current_module, import_name, level, is_package)
}

fn resolve_absolute(index: &GlobalIndex, import_name: &str) -> Option<String> {
    index.file_id_by_module(import_name).map(String::from)
}

fn resolve_relative(
    index: &GlobalIndex,
    current_module: &str,
    import_name: &str,
    level: u32,
    is_package: bool,
) -> Option<String> {
    let segments: Vec<&str> = if current_module.is_empty() {
        Vec::new()
    } else {
        current_module.split('.').collect()
    };

    let strip = if is_package { level.saturating_sub(1) } else { level } as usize;
    if strip > segments.len() {
        return None;
    }

    let parent = &segments[..segments.len() - strip];

    let target = if import_name.is_empty() {
        parent.join(".")
    } else if parent.is_empty() {
        import_name.to_string()
    } else {
        format!("{}.{}", parent.join("."), import_name)
    };

    index.file_id_by_module(&target).map(String::from)
}

//! C4 — Symbol Resolver.
//!
//! Resolves a bare or dotted symbol name, in the context of a file's
//! imports, to a definition node id. Local resolution is tried first, then
//! each import record in declaration order.

use crate::element::ImportRecord;
use crate::global_index::GlobalIndex;
use crate::module_resolver;

/// `resolve(symbol, current_file_id, imports) -> node_id | None`.
pub fn resolve(
    index: &GlobalIndex,
    symbol: &str,
    current_file_id: &str,
    imports: &[ImportRecord],
) -> Option<String> {
    if symbol.is_empty() || current_file_id.is_empty() {
        return None;
    }

    if let Some(hit) = resolve_local(index, symbol, current_file_id) {
        return Some(hit);
    }

    resolve_imported(index, symbol, current_file_id, imports)
}

fn resolve_local(index: &GlobalIndex, symbol: &str, current_file_id: &str) -> Option<String> {
    let module = index.module_of_file(current_file_id)?;
    index.exported_symbol(module, symbol).map(String::from)
}

fn resolve_imported(
    index: &GlobalIndex,
    symbol: &str,
    current_file_id: &str,
    imports: &[ImportRecord],
) -> Option<String> {
    let current_module = index.module_of_file(current_file_id).unwrap_or("");

    for import in imports {
        if !matches_import(symbol, import) {
            continue;
        }

        // The original resolver always resolves the import's target module
        // with is_package=false at this call site — carried over verbatim.
        let Some(target_file_id) =
            module_resolver::resolve(index, current_module, &import.module, import.level, false)
        else {
            continue;
        };
        let Some(target_module) = index.module_of_file(&target_file_id) else {
            continue;
        };

        // 1. Exact match against a listed name.
        if import.names.iter().any(|n| n == symbol) {
            if let Some(hit) = index.exported_symbol(target_module, symbol) {
                return Some(hit.to_string());
            }
        }

        // 2. Alias match.
        if let Some(alias) = &import.alias {
            if symbol == alias {
                let original = import.names.first().cloned().unwrap_or_else(|| symbol.to_string());
                if let Some(hit) = index.exported_symbol(target_module, &original) {
                    return Some(hit.to_string());
                }
            }
        }

        // 3. Dotted match on `N.method` for N in names[]: the target module
        // already stores `Class.method` entries, so fetch the full symbol.
        let dotted_via_name = import
            .names
            .iter()
            .any(|n| symbol.starts_with(&format!("{n}.")));
        if dotted_via_name {
            if let Some(hit) = index.exported_symbol(target_module, symbol) {
                return Some(hit.to_string());
            }
        }

        // 4. Dotted match on `module.symbol`: the target module's export_map
        // only ever stores bare/`Class.method` names, so strip the module
        // prefix before looking the remainder up.
        if !import.module.is_empty() && symbol.starts_with(&format!("{}.", import.module)) {
            let actual_symbol = &symbol[import.module.len() + 1..];
            if let Some(hit) = index.exported_symbol(target_module, actual_symbol) {
                return Some(hit.to_string());
            }
        }
    }

    None
}

/// Whether `symbol` matches this import statement under any of the four
/// rules in §4.4.
fn matches_import(symbol: &str, import: &ImportRecord) -> bool {
    if import.names.iter().any(|n| n == symbol) {
        return true;
    }
    if let Some(alias) = &import.alias {
        if symbol == alias {
            return true;
        }
    }
    if !import.module.is_empty() && symbol.starts_with(&format!("{}.", import.module)) {
        return true;
    }
    if import
        .names
        .iter()
        .any(|n| symbol.starts_with(&format!("{n}.")))
    {
        return true;
    }
    false
}

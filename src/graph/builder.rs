//! C5 — Graph Builder.
//!
//! Consumes entities plus per-file call/assignment records and produces the
//! three graphs, delegating import resolution to C3 and symbol/base-class/
//! callee resolution to C4.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::element::{AssignmentMap, CallRecord, CallType, CodeElement, ElementKind, ImportRecord};
use crate::global_index::GlobalIndex;
use crate::graph::CodeGraph;
use crate::graph::edge::{CallEdge, DependencyEdge, InheritanceEdge, Resolution};
use crate::module_resolver;
use crate::symbol_resolver;

/// Aggregated counts surfaced to end users (§7).
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub files_processed: usize,
    pub modules_created: usize,
    pub symbols_exported: usize,
    pub dependency_edges: usize,
    pub inheritance_edges: usize,
    pub call_edges: usize,
    pub calls_resolved: usize,
    pub calls_total: usize,
}

/// Precomputed lookups kept linear-time per the spec's requirement that the
/// builder's inner loops never rescan the full entity list.
struct Scopes<'a> {
    /// `(file_path, kind, name) -> node_id`, for every function/method/class.
    scope_lookup: HashMap<(PathBuf, &'static str, String), String>,
    /// `class name -> [class entity]`, for inheritance fallback.
    classes_by_name: HashMap<String, Vec<&'a CodeElement>>,
}

fn precompute(elements: &[CodeElement]) -> Scopes<'_> {
    let mut scope_lookup = HashMap::new();
    let mut classes_by_name: HashMap<String, Vec<&CodeElement>> = HashMap::new();

    for elem in elements {
        match elem.kind {
            ElementKind::Function => {
                scope_lookup.insert(
                    (elem.file_path.clone(), "function", elem.name.clone()),
                    elem.id.clone(),
                );
            }
            ElementKind::Class => {
                scope_lookup.insert(
                    (elem.file_path.clone(), "class", elem.name.clone()),
                    elem.id.clone(),
                );
                classes_by_name.entry(elem.name.clone()).or_default().push(elem);
            }
            _ => {}
        }
    }

    Scopes {
        scope_lookup,
        classes_by_name,
    }
}

fn file_imports(elem: &CodeElement) -> &[ImportRecord] {
    &elem.metadata.imports
}

/// Build all three graphs for one repository's entities.
///
/// `calls` and `assignments` are keyed by file id, matching the ingestion
/// contract (§6-ambient).
pub fn build(
    elements: &[CodeElement],
    index: &GlobalIndex,
    calls: &HashMap<String, Vec<CallRecord>>,
    assignments: &HashMap<String, AssignmentMap>,
) -> (CodeGraph, BuildStats) {
    let mut graph = CodeGraph::new();
    let elements_by_id: HashMap<&str, &CodeElement> =
        elements.iter().map(|e| (e.id.as_str(), e)).collect();
    let scopes = precompute(elements);

    let mut stats = BuildStats {
        files_processed: elements.iter().filter(|e| e.kind == ElementKind::File).count(),
        modules_created: index.modules_len(),
        symbols_exported: index.exports_len(),
        ..Default::default()
    };

    build_dependency_graph(elements, index, &elements_by_id, &mut graph, &mut stats);
    build_inheritance_graph(elements, index, &elements_by_id, &scopes, &mut graph, &mut stats);
    build_call_graph(
        elements,
        index,
        &elements_by_id,
        &scopes,
        calls,
        assignments,
        &mut graph,
        &mut stats,
    );

    (graph, stats)
}

fn build_dependency_graph(
    elements: &[CodeElement],
    index: &GlobalIndex,
    elements_by_id: &HashMap<&str, &CodeElement>,
    graph: &mut CodeGraph,
    stats: &mut BuildStats,
) {
    for elem in elements.iter().filter(|e| e.kind == ElementKind::File) {
        graph.ensure_dependency_node(&elem.id);
        let Some(module_path) = index.module_of_file(&elem.id) else {
            continue; // no module path: node added, but no edges can be built
        };
        let is_package = elem.is_package_file();

        for import in file_imports(elem) {
            let targets: Vec<String> = if !import.module.is_empty() {
                vec![import.module.clone()]
            } else if import.level > 0 && !import.names.is_empty() {
                import.names.clone()
            } else {
                Vec::new()
            };

            for target_name in targets {
                let Some(target_file_id) =
                    module_resolver::resolve(index, module_path, &target_name, import.level, is_package)
                else {
                    continue;
                };
                if target_file_id == elem.id {
                    continue; // self-import (I2)
                }
                let Some(target_elem) = elements_by_id.get(target_file_id.as_str()) else {
                    continue;
                };
                if target_elem.repo_name != elem.repo_name {
                    continue; // cross-repo isolation (I1)
                }
                graph.add_dependency_edge(
                    &elem.id,
                    &target_file_id,
                    DependencyEdge {
                        module: target_name,
                        level: import.level,
                        resolution: Resolution::Resolver,
                    },
                );
                stats.dependency_edges += 1;
            }
        }
    }
}

fn build_inheritance_graph(
    elements: &[CodeElement],
    index: &GlobalIndex,
    elements_by_id: &HashMap<&str, &CodeElement>,
    scopes: &Scopes,
    graph: &mut CodeGraph,
    stats: &mut BuildStats,
) {
    for elem in elements.iter().filter(|e| e.kind == ElementKind::Class) {
        graph.ensure_inheritance_node(&elem.id);
        let Some(file_id) = index.file_id_by_path(&elem.file_path).map(str::to_string) else {
            continue;
        };
        let Some(file_elem) = elements_by_id.get(file_id.as_str()) else {
            continue;
        };
        let imports = file_imports(file_elem);

        for base_name in &elem.metadata.bases {
            let resolved = symbol_resolver::resolve(index, base_name, &file_id, imports);
            let base_id = resolved.or_else(|| {
                scopes
                    .classes_by_name
                    .get(base_name)
                    .and_then(|candidates| candidates.iter().find(|c| c.repo_name == elem.repo_name))
                    .map(|c| c.id.clone())
            });

            let Some(base_id) = base_id else { continue };
            if base_id == elem.id {
                continue; // self-inheritance (I2)
            }
            let Some(base_elem) = elements_by_id.get(base_id.as_str()) else {
                continue;
            };
            if base_elem.repo_name != elem.repo_name {
                continue; // I1
            }

            graph.add_inheritance_edge(
                &elem.id,
                &base_id,
                InheritanceEdge {
                    base_name: base_name.clone(),
                },
            );
            stats.inheritance_edges += 1;
        }
    }
}

fn parse_scope_id(scope_id: &str) -> Option<(&str, &str)> {
    let mut parts = scope_id.splitn(2, "::");
    let kind = parts.next()?;
    let name = parts.next()?;
    Some((kind, name))
}

fn caller_id_for(
    file_elem: &CodeElement,
    scope_id: Option<&str>,
    scope_lookup: &HashMap<(PathBuf, &'static str, String), String>,
) -> String {
    let Some(scope_id) = scope_id else {
        return file_elem.id.clone();
    };
    let Some((kind, name)) = parse_scope_id(scope_id) else {
        return file_elem.id.clone(); // malformed scope_id degrades to file-level
    };
    let kind_key: &'static str = match kind {
        "class" => "class",
        _ => "function",
    };
    scope_lookup
        .get(&(file_elem.file_path.clone(), kind_key, name.to_string()))
        .cloned()
        // A lookup miss (valid format, no matching entity) also degrades to
        // file-level attribution — see SPEC_FULL.md §4.5 and DESIGN.md.
        .unwrap_or_else(|| file_elem.id.clone())
}

fn is_local_var(base: &str, scope_id: Option<&str>, assignments: &AssignmentMap) -> bool {
    let mut scopes_to_check: Vec<&str> = vec!["global", "function::__init__"];
    if let Some(sid) = scope_id {
        scopes_to_check.push(sid);
    }
    scopes_to_check
        .iter()
        .any(|s| assignments.get(*s).map(|vars| vars.contains_key(base)).unwrap_or(false))
}

fn caller_class_name(caller_elem: Option<&&CodeElement>) -> Option<String> {
    caller_elem.and_then(|e| {
        if e.kind == ElementKind::Function {
            e.metadata.class_name.clone()
        } else {
            None
        }
    })
}

/// Instance-method resolution — the hardest single routine (§4.5).
fn resolve_instance_method(
    base_object: &str,
    call_name: &str,
    scope_id: Option<&str>,
    assignments: &AssignmentMap,
    index: &GlobalIndex,
    current_file_id: &str,
    imports: &[ImportRecord],
    elements: &[CodeElement],
    elements_by_id: &HashMap<&str, &CodeElement>,
) -> Vec<String> {
    // Step 1: candidate class names, checking scopes in order.
    let mut candidate_scopes: Vec<String> = Vec::new();
    if let Some(sid) = scope_id {
        candidate_scopes.push(sid.to_string());
    }
    candidate_scopes.push("function::__init__".to_string());
    candidate_scopes.push("global".to_string());

    let mut candidates: Vec<String> = Vec::new();
    for scope in &candidate_scopes {
        if let Some(vars) = assignments.get(scope) {
            if let Some(classes) = vars.get(base_object) {
                candidates = classes.clone();
                break;
            }
        }
    }

    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for class_name in candidates {
        let Some(class_id) = symbol_resolver::resolve(index, &class_name, current_file_id, imports)
        else {
            continue;
        };
        let Some(class_elem) = elements_by_id.get(class_id.as_str()) else {
            continue;
        };

        let resolved = symbol_resolver::resolve(
            index,
            &format!("{class_name}.{call_name}"),
            current_file_id,
            imports,
        )
        .or_else(|| symbol_resolver::resolve(index, call_name, current_file_id, imports))
        .or_else(|| {
            elements
                .iter()
                .find(|e| {
                    e.kind == ElementKind::Function
                        && e.name == call_name
                        && e.file_path == class_elem.file_path
                        && e.metadata.class_name.as_deref() == Some(class_name.as_str())
                })
                .map(|e| e.id.clone())
        })
        // Step (e): recall-over-precision fallback — the class itself.
        .unwrap_or_else(|| class_id.clone());

        if seen.insert(resolved.clone()) {
            result.push(resolved);
        }
    }

    result
}

fn resolve_callees(
    call: &CallRecord,
    caller_elem: Option<&&CodeElement>,
    file_elem: &CodeElement,
    imports: &[ImportRecord],
    assignments_for_file: &AssignmentMap,
    index: &GlobalIndex,
    elements: &[CodeElement],
    elements_by_id: &HashMap<&str, &CodeElement>,
) -> Vec<String> {
    match call.call_type {
        CallType::Simple => symbol_resolver::resolve(index, &call.call_name, &file_elem.id, imports)
            .into_iter()
            .collect(),
        CallType::Attribute => {
            let Some(base) = &call.base_object else {
                return symbol_resolver::resolve(index, &call.call_name, &file_elem.id, imports)
                    .into_iter()
                    .collect();
            };

            let not_local = !is_local_var(base, call.scope_id.as_deref(), assignments_for_file);
            let module_import = imports.iter().find(|i| &i.module == base);

            if not_local && module_import.is_some() {
                return symbol_resolver::resolve(
                    index,
                    &format!("{base}.{}", call.call_name),
                    &file_elem.id,
                    imports,
                )
                .into_iter()
                .collect();
            }

            if (base == "self" || base == "cls") && caller_class_name(caller_elem).is_some() {
                let class_name = caller_class_name(caller_elem).unwrap();
                if let Some(hit) = symbol_resolver::resolve(
                    index,
                    &format!("{class_name}.{}", call.call_name),
                    &file_elem.id,
                    imports,
                ) {
                    return vec![hit];
                }
                return symbol_resolver::resolve(index, &call.call_name, &file_elem.id, imports)
                    .into_iter()
                    .collect();
            }

            resolve_instance_method(
                base,
                &call.call_name,
                call.scope_id.as_deref(),
                assignments_for_file,
                index,
                &file_elem.id,
                imports,
                elements,
                elements_by_id,
            )
        }
    }
}

/// One call site's resolution, computed independently of every other site so
/// the per-file outer loop can run on Rayon's pool; the graph itself is only
/// ever mutated afterward, on the calling thread.
struct ResolvedCall {
    caller_id: String,
    callee_ids: Vec<String>,
    edge: CallEdge,
}

fn resolve_one_file(
    file_elem: &CodeElement,
    calls_for_file: &[CallRecord],
    assignments_for_file: &AssignmentMap,
    index: &GlobalIndex,
    elements: &[CodeElement],
    elements_by_id: &HashMap<&str, &CodeElement>,
    scopes: &Scopes,
) -> Vec<ResolvedCall> {
    let imports = file_imports(file_elem);

    calls_for_file
        .iter()
        .map(|call| {
            let caller_id = caller_id_for(file_elem, call.scope_id.as_deref(), &scopes.scope_lookup);
            let caller_elem = elements_by_id.get(caller_id.as_str());

            let mut callee_ids = resolve_callees(
                call,
                caller_elem,
                file_elem,
                imports,
                assignments_for_file,
                index,
                elements,
                elements_by_id,
            );
            let mut seen = HashSet::new();
            callee_ids.retain(|id| seen.insert(id.clone()));

            ResolvedCall {
                caller_id,
                callee_ids,
                edge: CallEdge {
                    call_name: call.call_name.clone(),
                    call_type: call.call_type,
                    file_path: file_elem.file_path.clone(),
                    node_text: call.node_text.clone(),
                },
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn build_call_graph(
    elements: &[CodeElement],
    index: &GlobalIndex,
    elements_by_id: &HashMap<&str, &CodeElement>,
    scopes: &Scopes,
    calls: &HashMap<String, Vec<CallRecord>>,
    assignments: &HashMap<String, AssignmentMap>,
    graph: &mut CodeGraph,
    stats: &mut BuildStats,
) {
    use rayon::prelude::*;

    let empty_assignments = AssignmentMap::new();
    let files: Vec<&CodeElement> = elements.iter().filter(|e| e.kind == ElementKind::File).collect();

    // Each file's call sites resolve independently of every other file's —
    // run the resolution fan-out in parallel, then apply sequentially so
    // edge insertion order (and therefore stats) stays deterministic.
    let per_file: Vec<(String, Vec<ResolvedCall>)> = files
        .into_par_iter()
        .filter_map(|file_elem| {
            let calls_for_file = calls.get(&file_elem.id)?;
            let assignments_for_file = assignments.get(&file_elem.id).unwrap_or(&empty_assignments);
            let resolved = resolve_one_file(
                file_elem,
                calls_for_file,
                assignments_for_file,
                index,
                elements,
                elements_by_id,
                scopes,
            );
            Some((file_elem.repo_name.clone(), resolved))
        })
        .collect();

    for (file_repo, resolved_calls) in per_file {
        for resolved in resolved_calls {
            stats.calls_total += 1;
            graph.ensure_call_node(&resolved.caller_id);

            if !resolved.callee_ids.is_empty() {
                stats.calls_resolved += 1;
            }

            for callee_id in resolved.callee_ids {
                if callee_id == resolved.caller_id {
                    continue; // I2
                }
                let Some(callee_elem) = elements_by_id.get(callee_id.as_str()) else {
                    continue;
                };
                if callee_elem.repo_name != file_repo {
                    continue; // I1
                }
                graph.add_call_edge(&resolved.caller_id, &callee_id, resolved.edge.clone());
                stats.call_edges += 1;
            }
        }
    }
}

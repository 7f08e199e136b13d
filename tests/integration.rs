//! Integration test suite — drives the compiled `pygraph` binary via
//! subprocess against hand-built `IndexInput` fixtures, one per literal
//! end-to-end scenario plus the ambient round-trip behaviors.
//!
//! `CARGO_BIN_EXE_pygraph` is set automatically by Cargo during `cargo test`
//! to point at the compiled binary for the current profile.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{Value, json};

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pygraph"))
}

fn run_success(args: &[&str]) -> String {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke pygraph binary");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        out.status.success(),
        "command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
        args,
        out.status,
        stdout,
        stderr
    );
    stdout
}

fn run_failure(args: &[&str]) -> (String, String) {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke pygraph binary");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        !out.status.success(),
        "command {:?} expected to fail but exited successfully\nstdout: {}\nstderr: {}",
        args,
        stdout,
        stderr
    );
    (stdout, stderr)
}

fn write_input(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn build_and_get_stats(root: &Path, input: &Path) -> Value {
    run_success(&[
        "build",
        input.to_str().unwrap(),
        "--root",
        root.to_str().unwrap(),
    ]);
    let stdout = run_success(&[
        "stats",
        "--root",
        root.to_str().unwrap(),
        "--format",
        "json",
    ]);
    serde_json::from_str(&stdout).expect("stats output should be valid JSON")
}

fn file_elem(id: &str, path: &Path, repo: &str, imports: Value) -> Value {
    json!({
        "id": id,
        "kind": "file",
        "name": path.file_name().unwrap().to_string_lossy(),
        "file_path": path,
        "relative_path": path,
        "repo_name": repo,
        "metadata": {
            "imports": imports,
            "bases": [],
            "class_name": null,
            "parameters": [],
        },
        "signature": null,
        "docstring": null,
        "summary": null,
        "start_line": null,
        "end_line": null,
    })
}

fn function_elem(id: &str, name: &str, path: &Path, repo: &str, class_name: Option<&str>) -> Value {
    json!({
        "id": id,
        "kind": "function",
        "name": name,
        "file_path": path,
        "relative_path": path,
        "repo_name": repo,
        "metadata": {
            "imports": [],
            "bases": [],
            "class_name": class_name,
            "parameters": [],
        },
        "signature": null,
        "docstring": null,
        "summary": null,
        "start_line": null,
        "end_line": null,
    })
}

fn class_elem(id: &str, name: &str, path: &Path, repo: &str, bases: Vec<&str>) -> Value {
    json!({
        "id": id,
        "kind": "class",
        "name": name,
        "file_path": path,
        "relative_path": path,
        "repo_name": repo,
        "metadata": {
            "imports": [],
            "bases": bases,
            "class_name": null,
            "parameters": [],
        },
        "signature": null,
        "docstring": null,
        "summary": null,
        "start_line": null,
        "end_line": null,
    })
}

fn call(name: &str, call_type: &str, base: Option<&str>, scope: Option<&str>) -> Value {
    json!({
        "call_name": name,
        "call_type": call_type,
        "base_object": base,
        "scope_id": scope,
        "node_text": format!("{name}()"),
    })
}

// ---------------------------------------------------------------------------
// 1. Absolute import
// ---------------------------------------------------------------------------

#[test]
fn absolute_import_produces_dependency_edge_and_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let b_path = dir.path().join("a/b.py");
    let c_path = dir.path().join("a/c.py");

    let input = json!({
        "repo_name": "repo",
        "elements": [
            file_elem("fb", &b_path, "repo", json!([
                {"module": "a.c", "names": ["f"], "alias": null, "level": 0}
            ])),
            file_elem("fc", &c_path, "repo", json!([])),
            function_elem("fn_f", "f", &c_path, "repo", None),
        ],
        "calls": {},
        "assignments": {},
    });
    let input_path = write_input(dir.path(), "input.json", &input);

    let stats = build_and_get_stats(dir.path(), &input_path);
    assert_eq!(stats["dependency_edges"], 1);

    let resolved = run_success(&[
        "resolve",
        "f",
        "--from",
        "fb",
        "--root",
        dir.path().to_str().unwrap(),
    ]);
    assert_eq!(resolved.trim(), "fn_f");
}

// ---------------------------------------------------------------------------
// 2. Relative import from a package file
// ---------------------------------------------------------------------------

#[test]
fn relative_import_from_package_resolves_with_is_package_true() {
    let dir = tempfile::tempdir().unwrap();
    let init_path = dir.path().join("pkg/__init__.py");
    let util_path = dir.path().join("pkg/util.py");

    let input = json!({
        "repo_name": "repo",
        "elements": [
            file_elem("finit", &init_path, "repo", json!([
                {"module": "", "names": ["util"], "alias": null, "level": 1}
            ])),
            file_elem("futil", &util_path, "repo", json!([])),
        ],
        "calls": {},
        "assignments": {},
    });
    let input_path = write_input(dir.path(), "input.json", &input);

    let stats = build_and_get_stats(dir.path(), &input_path);
    assert_eq!(stats["dependency_edges"], 1);
}

// ---------------------------------------------------------------------------
// 3. Cross-file inheritance
// ---------------------------------------------------------------------------

#[test]
fn cross_file_inheritance_produces_edge() {
    let dir = tempfile::tempdir().unwrap();
    let m_path = dir.path().join("m.py");
    let n_path = dir.path().join("n.py");

    let input = json!({
        "repo_name": "repo",
        "elements": [
            file_elem("fm", &m_path, "repo", json!([])),
            class_elem("cbase", "Base", &m_path, "repo", vec![]),
            file_elem("fn", &n_path, "repo", json!([
                {"module": "m", "names": ["Base"], "alias": null, "level": 0}
            ])),
            class_elem("cchild", "Child", &n_path, "repo", vec!["Base"]),
        ],
        "calls": {},
        "assignments": {},
    });
    let input_path = write_input(dir.path(), "input.json", &input);

    let stats = build_and_get_stats(dir.path(), &input_path);
    assert_eq!(stats["inheritance_edges"], 1);

    let resolved = run_success(&[
        "resolve",
        "Base",
        "--from",
        "fn",
        "--root",
        dir.path().to_str().unwrap(),
    ]);
    assert_eq!(resolved.trim(), "cbase");
}

// ---------------------------------------------------------------------------
// 4. self/cls method call
// ---------------------------------------------------------------------------

#[test]
fn self_method_call_resolves_to_sibling_method() {
    let dir = tempfile::tempdir().unwrap();
    let x_path = dir.path().join("x.py");

    let input = json!({
        "repo_name": "repo",
        "elements": [
            file_elem("fx", &x_path, "repo", json!([])),
            class_elem("cA", "A", &x_path, "repo", vec![]),
            function_elem("mf", "f", &x_path, "repo", Some("A")),
            function_elem("mg", "g", &x_path, "repo", Some("A")),
        ],
        "calls": {
            "fx": [call("g", "attribute", Some("self"), Some("function::f"))],
        },
        "assignments": {},
    });
    let input_path = write_input(dir.path(), "input.json", &input);

    let stats = build_and_get_stats(dir.path(), &input_path);
    assert_eq!(stats["call_edges"], 1);
    assert_eq!(stats["calls_resolved"], 1);
}

// ---------------------------------------------------------------------------
// 5. Instance-method call with type inference
// ---------------------------------------------------------------------------

#[test]
fn instance_method_call_infers_type_from_constructor_assignment() {
    let dir = tempfile::tempdir().unwrap();
    let y_path = dir.path().join("y.py");

    let input = json!({
        "repo_name": "repo",
        "elements": [
            file_elem("fy", &y_path, "repo", json!([])),
            class_elem("cL", "L", &y_path, "repo", vec![]),
            function_elem("mload", "load", &y_path, "repo", Some("L")),
            class_elem("cS", "S", &y_path, "repo", vec![]),
            function_elem("minit", "__init__", &y_path, "repo", Some("S")),
            function_elem("mrun", "run", &y_path, "repo", Some("S")),
        ],
        "calls": {
            "fy": [call("load", "attribute", Some("loader"), Some("function::run"))],
        },
        "assignments": {
            "fy": {
                "function::__init__": {
                    "loader": ["L"]
                }
            }
        },
    });
    let input_path = write_input(dir.path(), "input.json", &input);

    let stats = build_and_get_stats(dir.path(), &input_path);
    assert_eq!(stats["call_edges"], 1);
    assert_eq!(stats["calls_resolved"], 1);
}

// ---------------------------------------------------------------------------
// 6. Module-name shadowing
// ---------------------------------------------------------------------------

#[test]
fn local_variable_shadows_same_named_module_import() {
    let dir = tempfile::tempdir().unwrap();
    let z_path = dir.path().join("z.py");
    let svc_path = dir.path().join("service.py");

    let input = json!({
        "repo_name": "repo",
        "elements": [
            file_elem("fz", &z_path, "repo", json!([
                {"module": "service", "names": [], "alias": null, "level": 0}
            ])),
            class_elem("cSvc", "Svc", &z_path, "repo", vec![]),
            function_elem("mcall", "call", &z_path, "repo", Some("Svc")),
            function_elem("mh", "h", &z_path, "repo", None),
            file_elem("fsvc", &svc_path, "repo", json!([])),
        ],
        "calls": {
            "fz": [call("call", "attribute", Some("service"), Some("function::h"))],
        },
        "assignments": {
            "fz": {
                "function::h": {
                    "service": ["Svc"]
                }
            }
        },
    });
    let input_path = write_input(dir.path(), "input.json", &input);

    let stats = build_and_get_stats(dir.path(), &input_path);
    // The local `service = Svc()` shadows the `import service` module: the
    // call resolves to Svc.call, not a module-attribute lookup on `service`.
    assert_eq!(stats["call_edges"], 1);
    assert_eq!(stats["calls_resolved"], 1);

    let resolved = run_success(&[
        "resolve",
        "Svc.call",
        "--from",
        "fz",
        "--root",
        dir.path().to_str().unwrap(),
    ]);
    assert_eq!(resolved.trim(), "mcall");
}

// ---------------------------------------------------------------------------
// 7. Cross-repo isolation, exercised via independent builds plus merge
// (also covers the ambient merge round-trip behavior).
// ---------------------------------------------------------------------------

#[test]
fn independent_repo_builds_merge_without_crossing_edges() {
    let repo_a_root = tempfile::tempdir().unwrap();
    let repo_b_root = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();

    // Distinct ids per repo: two real repos would never share a file-id
    // namespace, and reusing ids here would conflate the two repos' nodes
    // into one instead of genuinely exercising the union-of-disjoint-graphs
    // merge path.
    let make_input = |repo: &str, root: &Path, suffix: &str| {
        let util_path = root.join("util.py");
        let helpers_path = root.join("helpers.py");
        json!({
            "repo_name": repo,
            "elements": [
                file_elem(&format!("util_{suffix}"), &util_path, repo, json!([
                    {"module": "helpers", "names": [], "alias": null, "level": 0}
                ])),
                file_elem(&format!("helpers_{suffix}"), &helpers_path, repo, json!([])),
            ],
            "calls": {},
            "assignments": {},
        })
    };

    let input_a = make_input("repo_a", repo_a_root.path(), "a");
    let input_b = make_input("repo_b", repo_b_root.path(), "b");
    let input_a_path = write_input(work_dir.path(), "a.json", &input_a);
    let input_b_path = write_input(work_dir.path(), "b.json", &input_b);

    // Each repo is built in its own snapshot root, in isolation.
    run_success(&[
        "build",
        input_a_path.to_str().unwrap(),
        "--root",
        repo_a_root.path().to_str().unwrap(),
    ]);
    run_success(&[
        "build",
        input_b_path.to_str().unwrap(),
        "--root",
        repo_b_root.path().to_str().unwrap(),
    ]);

    let peer_snapshot = repo_b_root.path().join(".pygraph").join("graph.bin");
    run_success(&[
        "merge",
        peer_snapshot.to_str().unwrap(),
        "--root",
        repo_a_root.path().to_str().unwrap(),
    ]);

    let stdout = run_success(&[
        "stats",
        "--root",
        repo_a_root.path().to_str().unwrap(),
        "--format",
        "json",
    ]);
    let merged: Value = serde_json::from_str(&stdout).unwrap();
    // Both repos' own util -> helpers edge survives the merge untouched,
    // every element from both repos is present, and no edge crosses from
    // one repo's util to the other's helpers (the merge only unions disjoint
    // per-repo subgraphs, it never resolves new cross-repo imports).
    assert_eq!(merged["files_processed"], 4);
    assert_eq!(merged["dependency_edges"], 2);
}

// ---------------------------------------------------------------------------
// Ambient: validate reports duplicate module paths without aborting the
// build itself.
// ---------------------------------------------------------------------------

#[test]
fn validate_reports_duplicate_module_path() {
    let dir = tempfile::tempdir().unwrap();
    let a_path = dir.path().join("A.py");
    let b_path = dir.path().join("a.py");

    let input = json!({
        "repo_name": "repo",
        "elements": [
            file_elem("fA", &a_path, "repo", json!([])),
            file_elem("fa", &b_path, "repo", json!([])),
        ],
        "calls": {},
        "assignments": {},
    });
    let input_path = write_input(dir.path(), "input.json", &input);

    run_success(&[
        "build",
        input_path.to_str().unwrap(),
        "--root",
        dir.path().to_str().unwrap(),
    ]);

    let (stdout, _stderr) = run_failure(&[
        "validate",
        "--root",
        dir.path().to_str().unwrap(),
        "--format",
        "text",
    ]);
    assert!(stdout.contains("duplicate module path"));
}

// ---------------------------------------------------------------------------
// Ambient: building against a malformed ingestion path fails cleanly.
// ---------------------------------------------------------------------------

#[test]
fn build_fails_on_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.json");
    run_failure(&[
        "build",
        missing.to_str().unwrap(),
        "--root",
        dir.path().to_str().unwrap(),
    ]);
}

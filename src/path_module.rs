//! C1 — Path–Module Converter.
//!
//! Deterministic mapping between filesystem paths and dotted module paths,
//! stable across `/`- and `\`-separated input that denotes the same path.

use std::path::Path;

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Splits a path into its non-empty, non-`.` segments, resolving `..`
/// lexically. Treats both `/` and `\` as separators regardless of host
/// platform, so the result is stable across separator styles.
fn segments(path: &Path) -> Vec<String> {
    let raw = path.to_string_lossy().to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => {
                out.pop();
            }
            seg => out.push(seg.to_string()),
        }
    }
    out
}

/// Converts `(file_path, repo_root)` to a dotted module path, or `None` if
/// the file is not a resolvable module inside the repo.
pub fn file_path_to_module_path(file_path: &Path, repo_root: &Path) -> Option<String> {
    let file_segs = segments(file_path);
    let root_segs = segments(repo_root);

    // Step 2: file_path must be a strict descendant of repo_root.
    if file_segs.len() <= root_segs.len() {
        return None;
    }
    if file_segs[..root_segs.len()] != root_segs[..] {
        return None;
    }
    let relative = &file_segs[root_segs.len()..];

    // Step 3: require a `.py` extension on the final segment.
    let last = relative.last()?;
    let stem = last.strip_suffix(".py")?;

    // Step 4: build the dotted path from the relative segments.
    let mut dotted_segments: Vec<String> = relative[..relative.len() - 1].to_vec();
    dotted_segments.push(stem.to_string());

    // Step 5: collapse a trailing `__init__` segment.
    if dotted_segments.last().map(|s| s.as_str()) == Some("__init__") {
        dotted_segments.pop();
    }
    if dotted_segments.is_empty() {
        return None;
    }

    // Step 6: reject forbidden characters; otherwise permissive.
    if dotted_segments
        .iter()
        .any(|seg| seg.chars().any(|c| FORBIDDEN_CHARS.contains(&c)))
    {
        return None;
    }

    Some(dotted_segments.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn simple_module() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/a/b.py");
        assert_eq!(file_path_to_module_path(&file, &root), Some("a.b".to_string()));
    }

    #[test]
    fn package_init_collapses() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/pkg/__init__.py");
        assert_eq!(file_path_to_module_path(&file, &root), Some("pkg".to_string()));
    }

    #[test]
    fn repo_root_init_is_none() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/__init__.py");
        assert_eq!(file_path_to_module_path(&file, &root), None);
    }

    #[test]
    fn outside_repo_root_is_none() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/elsewhere/a.py");
        assert_eq!(file_path_to_module_path(&file, &root), None);
    }

    #[test]
    fn non_python_extension_is_none() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/a/b.txt");
        assert_eq!(file_path_to_module_path(&file, &root), None);
    }

    #[test]
    fn backslash_and_forward_slash_are_equivalent() {
        let root_fwd = PathBuf::from("/repo");
        let file_fwd = PathBuf::from("/repo/a/b.py");
        let root_back = PathBuf::from("\\repo");
        let file_back = PathBuf::from("\\repo\\a\\b.py");
        assert_eq!(
            file_path_to_module_path(&file_fwd, &root_fwd),
            file_path_to_module_path(&file_back, &root_back),
        );
    }

    #[test]
    fn forbidden_character_rejected() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/a/b<c.py");
        assert_eq!(file_path_to_module_path(&file, &root), None);
    }

    #[test]
    fn leading_digits_and_hyphens_are_permitted() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/3rd-party/mod.py");
        assert_eq!(
            file_path_to_module_path(&file, &root),
            Some("3rd-party.mod".to_string())
        );
    }
}

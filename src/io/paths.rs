//! Path normalisation shared by the loader, the registries and the orchestrator.
//!
//! Every path that takes part in an identity comparison (specialisation source
//! files, registry outputs, ignore roots) goes through [`normalize`] first.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute and lexically remove `.` and `..` components.
///
/// Symlinks are not resolved; two spellings of the same file through
/// different links are treated as different files.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether `path` is `root` or lies below it.
pub fn is_within(path: &Path, root: &Path) -> bool {
    normalize(path).starts_with(normalize(root))
}

/// Relative module specifier from `from_dir` to `target`, always starting
/// with `./` or `../` and using forward slashes.
pub fn module_specifier(from_dir: &Path, target: &Path) -> String {
    let relative = pathdiff::diff_paths(normalize(target), normalize(from_dir))
        .unwrap_or_else(|| target.to_path_buf());
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if joined.starts_with("../") || joined.starts_with("./") {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Path of `target` relative to `base`, for display purposes.
pub fn display_relative(base: &Path, target: &Path) -> String {
    pathdiff::diff_paths(normalize(target), normalize(base))
        .unwrap_or_else(|| target.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

/// Swap a `.ts`/`.mts` extension for the `.js`/`.mjs` a compiled import uses.
pub fn to_runtime_extension(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts") | Some("tsx") => path.with_extension("js"),
        Some("mts") => path.with_extension("mjs"),
        _ => path.to_path_buf(),
    }
}

/// Replace the leading directory `from` of `path` with `to`. Returns the
/// input unchanged when it does not lie under `from`.
pub fn rewrite_prefix(path: &Path, from: &Path, to: &Path) -> PathBuf {
    match normalize(path).strip_prefix(normalize(from)) {
        Ok(rest) => normalize(to).join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_dot_segments() {
        let p = normalize(Path::new("/work/dist/./shapes/../circle.js"));
        assert_eq!(p, PathBuf::from("/work/dist/circle.js"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within(Path::new("/a/b/c.js"), Path::new("/a/b")));
        assert!(is_within(Path::new("/a/b"), Path::new("/a/b")));
        assert!(!is_within(Path::new("/a/bc/d.js"), Path::new("/a/b")));
        assert!(!is_within(Path::new("/a"), Path::new("/a/b")));
    }

    #[test]
    fn test_module_specifier_prefixes_dot() {
        assert_eq!(
            module_specifier(Path::new("/p/src"), Path::new("/p/src/circle.js")),
            "./circle.js"
        );
        assert_eq!(
            module_specifier(Path::new("/p/src/gen"), Path::new("/p/src/shapes/circle.js")),
            "../shapes/circle.js"
        );
    }

    #[test]
    fn test_to_runtime_extension() {
        assert_eq!(
            to_runtime_extension(Path::new("/p/shape.ts")),
            PathBuf::from("/p/shape.js")
        );
        assert_eq!(
            to_runtime_extension(Path::new("/p/shape.js")),
            PathBuf::from("/p/shape.js")
        );
    }

    #[test]
    fn test_rewrite_prefix() {
        let rewritten = rewrite_prefix(
            Path::new("/p/dist/shapes/circle.js"),
            Path::new("/p/dist"),
            Path::new("/p/src"),
        );
        assert_eq!(rewritten, PathBuf::from("/p/src/shapes/circle.js"));

        let untouched = rewrite_prefix(
            Path::new("/p/lib/circle.js"),
            Path::new("/p/dist"),
            Path::new("/p/src"),
        );
        assert_eq!(untouched, PathBuf::from("/p/lib/circle.js"));
    }
}

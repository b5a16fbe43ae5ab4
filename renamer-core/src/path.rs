use std::fs;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// How the target filesystem compares names.
///
/// Passed explicitly into every planning call so the comparison rules never
/// depend on where the code happens to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePolicy {
    CaseSensitive,
    CaseInsensitive,
}

impl CasePolicy {
    /// The conventional policy of the host platform: case-insensitive on
    /// Windows and macOS, case-sensitive everywhere else.
    pub fn host() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            Self::CaseInsensitive
        } else {
            Self::CaseSensitive
        }
    }

    /// Check how the filesystem holding `dir` actually behaves.
    ///
    /// Creates a scratch file inside a temporary directory in `dir` and looks
    /// it up with different case. Falls back to case-sensitive when the probe
    /// cannot run (read-only directory, missing permissions, ...).
    pub fn probe(dir: &Path) -> Self {
        let Ok(temp_dir) = TempDir::new_in(dir) else {
            return Self::CaseSensitive;
        };

        let lower = temp_dir.path().join("case_probe_a");
        let upper = temp_dir.path().join("CASE_PROBE_A");

        if fs::write(&lower, b"probe").is_err() {
            return Self::CaseSensitive;
        }

        if fs::metadata(&upper).is_ok() {
            Self::CaseInsensitive
        } else {
            Self::CaseSensitive
        }
    }

    pub fn is_case_insensitive(self) -> bool {
        self == Self::CaseInsensitive
    }
}

impl Default for CasePolicy {
    fn default() -> Self {
        Self::host()
    }
}

/// Whether `name` is a single plain file name: no separators, no `.` or
/// `..`, not absolute and not empty.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

/// Lexically clean a path: drop `.` components and redundant separators and
/// resolve `..` against the components before it.
///
/// Never touches the filesystem. An empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                },
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {},
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().collect()
}

/// The key used to decide whether two paths name the same file slot.
pub fn normalize_for_comparison(path: &Path, policy: CasePolicy) -> PathBuf {
    let cleaned = clean_path(path);
    if policy.is_case_insensitive() {
        PathBuf::from(cleaned.to_string_lossy().to_lowercase())
    } else {
        cleaned
    }
}

/// Path equality under the given case policy.
pub fn same_path_relaxed(a: &Path, b: &Path, policy: CasePolicy) -> bool {
    let a = clean_path(a);
    let b = clean_path(b);

    if a == b {
        return true;
    }

    policy.is_case_insensitive()
        && a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

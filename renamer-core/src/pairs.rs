use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::conflict::{detect_conflicts, Candidate, CandidateSource, DiskProbe, FileProbe};
use crate::path::CasePolicy;
use crate::plan::{FileEntry, PlanResult};

/// One mapping entry: the existing file and the name its new base comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub target_name: String,
    pub source_name: String,
}

/// Ordered mapping from existing file names to source names.
///
/// Behaves like a map keyed by target name (inserting an existing target
/// replaces its source in place) but iterates in insertion order, which is
/// the order conflicts are resolved in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Pair>", into = "Vec<Pair>")]
pub struct PairMapping {
    pairs: Vec<Pair>,
}

impl PairMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target_name: impl Into<String>, source_name: impl Into<String>) {
        let target_name = target_name.into();
        let source_name = source_name.into();

        if let Some(existing) = self.pairs.iter_mut().find(|p| p.target_name == target_name) {
            existing.source_name = source_name;
        } else {
            self.pairs.push(Pair {
                target_name,
                source_name,
            });
        }
    }

    pub fn get(&self, target_name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.target_name == target_name)
            .map(|p| p.source_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }
}

impl<T, S> FromIterator<(T, S)> for PairMapping
where
    T: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, S)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (target, source) in iter {
            mapping.insert(target, source);
        }
        mapping
    }
}

impl From<Vec<Pair>> for PairMapping {
    fn from(pairs: Vec<Pair>) -> Self {
        pairs
            .into_iter()
            .map(|pair| (pair.target_name, pair.source_name))
            .collect()
    }
}

impl From<PairMapping> for Vec<Pair> {
    fn from(mapping: PairMapping) -> Self {
        mapping.pairs
    }
}

/// The extension of a file name: everything from the last `.` on, or an
/// empty string when the name has no dot.
pub fn extension_of(name: &str) -> &str {
    name.rfind('.').map_or("", |dot| &name[dot..])
}

/// The name without its extension.
pub fn strip_extension(name: &str) -> &str {
    &name[..name.len() - extension_of(name).len()]
}

/// New name for `target_name` whose base is taken from `source_name`: the
/// source's base plus the target's own extension.
pub fn compute_new_name(target_name: &str, source_name: &str) -> String {
    format!("{}{}", strip_extension(source_name), extension_of(target_name))
}

/// Pair two listings by position, up to the length of the shorter one.
pub fn pair_by_position(targets: &[FileEntry], sources: &[FileEntry]) -> PairMapping {
    targets
        .iter()
        .zip(sources)
        .map(|(target, source)| (target.name.clone(), source.name.clone()))
        .collect()
}

/// Build a plan from an explicit mapping, checking names against the disk.
pub fn build_plan_from_pairs(
    target_dir: &Path,
    mapping: &PairMapping,
    policy: CasePolicy,
) -> PlanResult {
    build_plan_from_pairs_with_probe(target_dir, mapping, policy, &DiskProbe)
}

pub fn build_plan_from_pairs_with_probe(
    target_dir: &Path,
    mapping: &PairMapping,
    policy: CasePolicy,
    probe: &dyn FileProbe,
) -> PlanResult {
    if target_dir.as_os_str().is_empty() || mapping.is_empty() {
        return PlanResult::default();
    }

    let candidates: Vec<Candidate> = mapping
        .iter()
        .map(|pair| {
            let new_name = compute_new_name(&pair.target_name, &pair.source_name);
            Candidate::new(
                target_dir,
                &pair.target_name,
                &new_name,
                CandidateSource::Pair(pair.source_name.clone()),
            )
        })
        .collect();

    let plan = detect_conflicts(candidates, policy, probe);
    info!(
        operations = plan.operations.len(),
        conflicts = plan.conflicts.len(),
        "Built plan from pairs"
    );
    plan
}

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::natural::natural_cmp;
use crate::path::{is_plain_file_name, normalize_for_comparison, same_path_relaxed, CasePolicy};
use crate::plan::{Conflict, ConflictKind, PlanResult, RenameOp, BATCH_SOURCE_LABEL};

/// Read-only view of the filesystem used while validating a plan.
pub trait FileProbe {
    /// Whether `path` currently exists as a regular file
    fn is_regular_file(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl FileProbe for DiskProbe {
    fn is_regular_file(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|metadata| metadata.is_file())
    }
}

impl<F> FileProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn is_regular_file(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Where a candidate's new name came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Explicit mapping entry; carries the source name
    Pair(String),
    /// Produced by batch transformation rules
    Batch,
}

impl CandidateSource {
    fn label(&self) -> &str {
        match self {
            Self::Pair(name) => name,
            Self::Batch => BATCH_SOURCE_LABEL,
        }
    }

    fn into_op_source(self) -> Option<String> {
        match self {
            Self::Pair(name) => Some(name),
            Self::Batch => None,
        }
    }
}

/// A prospective rename before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub old_name: String,
    pub new_name: String,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn new(target_dir: &Path, old_name: &str, new_name: &str, source: CandidateSource) -> Self {
        Self {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            old_path: target_dir.join(old_name),
            new_path: target_dir.join(new_name),
            source,
        }
    }

    /// Both names are plain file names, so both paths stay inside the target
    /// directory.
    pub fn stays_in_directory(&self) -> bool {
        is_plain_file_name(&self.old_name) && is_plain_file_name(&self.new_name)
    }

    fn reject(&self, kind: ConflictKind) -> Conflict {
        Conflict::new(&self.old_name, self.source.label(), &self.new_name, kind)
    }

    fn accept(self) -> RenameOp {
        RenameOp {
            old_path: self.old_path,
            new_path: self.new_path,
            old_name: self.old_name,
            new_name: self.new_name,
            source_name: self.source.into_op_source(),
        }
    }
}

/// Partition candidates into operations and conflicts.
///
/// Rules, in order: a name that is not a plain file name, duplicate
/// destination (the earlier candidate wins), identical rename, destination
/// occupied by a file that is not vacated by this same batch. Every candidate ends up in exactly one of the two lists.
/// Operations are returned naturally sorted by old name.
pub fn detect_conflicts(
    candidates: Vec<Candidate>,
    policy: CasePolicy,
    probe: &dyn FileProbe,
) -> PlanResult {
    // Paths that this batch will vacate
    let will_move: HashSet<PathBuf> = candidates
        .iter()
        .filter(|c| c.stays_in_directory())
        .map(|c| normalize_for_comparison(&c.old_path, policy))
        .collect();

    let mut duplicates: HashMap<usize, ConflictKind> = HashMap::new();
    let mut seen_destinations: HashMap<PathBuf, &str> = HashMap::new();

    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.stays_in_directory() {
            continue;
        }

        let destination = normalize_for_comparison(&candidate.new_path, policy);
        let moves_in_place = destination == normalize_for_comparison(&candidate.old_path, policy);

        match seen_destinations.get(&destination) {
            Some(previous) if !moves_in_place => {
                duplicates.insert(
                    index,
                    ConflictKind::DuplicateDestination {
                        previous: (*previous).to_string(),
                    },
                );
            },
            _ => {
                seen_destinations.insert(destination, &candidate.old_name);
            },
        }
    }

    let mut plan = PlanResult::default();

    for (index, candidate) in candidates.into_iter().enumerate() {
        let rejection = if !candidate.stays_in_directory() {
            Some(ConflictKind::InvalidName)
        } else if let Some(kind) = duplicates.remove(&index) {
            Some(kind)
        } else if same_path_relaxed(&candidate.old_path, &candidate.new_path, policy) {
            Some(ConflictKind::IdenticalNames)
        } else if probe.is_regular_file(&candidate.new_path)
            && !will_move.contains(&normalize_for_comparison(&candidate.new_path, policy))
        {
            Some(ConflictKind::DestinationExists)
        } else {
            None
        };

        match rejection {
            Some(kind) => {
                debug!(
                    old = %candidate.old_name,
                    new = %candidate.new_name,
                    reason = %kind,
                    "Rejected rename candidate"
                );
                plan.conflicts.push(candidate.reject(kind));
            },
            None => plan.operations.push(candidate.accept()),
        }
    }

    plan.operations
        .sort_by(|a, b| natural_cmp(&a.old_name, &b.old_name));

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIR: &str = "/photos";

    fn pair(old: &str, new: &str) -> Candidate {
        Candidate::new(Path::new(DIR), old, new, CandidateSource::Pair(format!("src-{new}")))
    }

    fn nothing_exists(_: &Path) -> bool {
        false
    }

    #[test]
    fn test_first_candidate_wins_duplicate_destination() {
        let plan = detect_conflicts(
            vec![pair("a.txt", "x.txt"), pair("b.txt", "x.txt"), pair("c.txt", "x.txt")],
            CasePolicy::CaseSensitive,
            &nothing_exists,
        );

        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].old_name, "a.txt");
        assert_eq!(plan.conflicts.len(), 2);
        assert!(plan
            .conflicts
            .iter()
            .all(|c| c.reason == "name conflict with «a.txt»"));
    }

    #[test]
    fn test_duplicate_detection_respects_case_policy() {
        let candidates = vec![pair("a.txt", "X.txt"), pair("b.txt", "x.txt")];

        let sensitive =
            detect_conflicts(candidates.clone(), CasePolicy::CaseSensitive, &nothing_exists);
        assert_eq!(sensitive.operations.len(), 2);

        let insensitive =
            detect_conflicts(candidates, CasePolicy::CaseInsensitive, &nothing_exists);
        assert_eq!(insensitive.operations.len(), 1);
        assert_eq!(insensitive.conflicts[0].target_name, "b.txt");
    }

    #[test]
    fn test_identical_rename_is_rejected() {
        let plan = detect_conflicts(
            vec![pair("same.txt", "same.txt")],
            CasePolicy::CaseSensitive,
            &nothing_exists,
        );

        assert!(plan.operations.is_empty());
        assert_eq!(plan.conflicts[0].kind, ConflictKind::IdenticalNames);
    }

    #[test]
    fn test_case_only_rename_depends_on_policy() {
        let candidates = vec![pair("Photo.JPG", "photo.jpg")];

        let sensitive =
            detect_conflicts(candidates.clone(), CasePolicy::CaseSensitive, &nothing_exists);
        assert_eq!(sensitive.operations.len(), 1);

        let insensitive =
            detect_conflicts(candidates, CasePolicy::CaseInsensitive, &nothing_exists);
        assert_eq!(insensitive.conflicts[0].kind, ConflictKind::IdenticalNames);
    }

    #[test]
    fn test_occupied_destination_outside_batch_is_rejected() {
        let occupied = |path: &Path| path == Path::new(DIR).join("taken.txt");
        let plan = detect_conflicts(
            vec![pair("a.txt", "taken.txt")],
            CasePolicy::CaseSensitive,
            &occupied,
        );

        assert!(plan.operations.is_empty());
        assert_eq!(plan.conflicts[0].kind, ConflictKind::DestinationExists);
        assert_eq!(plan.conflicts[0].source_name, "src-taken.txt");
    }

    #[test]
    fn test_occupied_destination_vacated_by_batch_is_allowed() {
        let everything_exists = |_: &Path| true;
        let plan = detect_conflicts(
            vec![pair("a.txt", "b.txt"), pair("b.txt", "a.txt")],
            CasePolicy::CaseSensitive,
            &everything_exists,
        );

        assert_eq!(plan.operations.len(), 2);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn test_in_place_candidate_does_not_block_later_claims() {
        // "keep.txt" maps onto itself and is rejected as identical, but a
        // later claim on the same slot is judged on its own merits
        let plan = detect_conflicts(
            vec![pair("keep.txt", "keep.txt"), pair("other.txt", "keep.txt")],
            CasePolicy::CaseSensitive,
            &nothing_exists,
        );

        assert_eq!(plan.conflicts.len(), 2);
        assert_eq!(plan.conflicts[0].kind, ConflictKind::IdenticalNames);
        assert_eq!(
            plan.conflicts[1].kind,
            ConflictKind::DuplicateDestination {
                previous: "keep.txt".to_string()
            }
        );
    }

    #[test]
    fn test_names_leaving_the_directory_are_rejected() {
        let plan = detect_conflicts(
            vec![
                pair("/etc/hosts", "x"),
                pair("b.txt", "/tmp/elsewhere/evil.txt"),
                pair("c.txt", "../c.txt"),
                pair("sub/d.txt", "d2.txt"),
                pair("e.txt", "f.txt"),
            ],
            CasePolicy::CaseSensitive,
            &|path: &Path| path != Path::new(DIR).join("f.txt"),
        );

        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].new_path, Path::new(DIR).join("f.txt"));
        assert_eq!(plan.conflicts.len(), 4);
        assert!(plan
            .conflicts
            .iter()
            .all(|c| c.kind == ConflictKind::InvalidName));
    }

    #[test]
    fn test_rejected_names_claim_no_destination() {
        // The escaping candidate comes first but must not win "x.txt"
        let plan = detect_conflicts(
            vec![pair("../a.txt", "x.txt"), pair("b.txt", "x.txt")],
            CasePolicy::CaseSensitive,
            &nothing_exists,
        );

        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].old_name, "b.txt");
        assert_eq!(plan.conflicts[0].kind, ConflictKind::InvalidName);
    }

    #[test]
    fn test_batch_candidates_use_sentinel_label() {
        let candidates = vec![
            Candidate::new(Path::new(DIR), "a.txt", "z.txt", CandidateSource::Batch),
            Candidate::new(Path::new(DIR), "b.txt", "z.txt", CandidateSource::Batch),
        ];
        let plan = detect_conflicts(candidates, CasePolicy::CaseSensitive, &nothing_exists);

        assert_eq!(plan.operations[0].source_name, None);
        assert_eq!(plan.conflicts[0].source_name, BATCH_SOURCE_LABEL);
    }

    #[test]
    fn test_operations_are_naturally_sorted() {
        let plan = detect_conflicts(
            vec![pair("f10", "g10"), pair("f2", "g2"), pair("f1", "g1")],
            CasePolicy::CaseSensitive,
            &nothing_exists,
        );

        let names: Vec<_> = plan.operations.iter().map(|op| op.old_name.as_str()).collect();
        assert_eq!(names, vec!["f1", "f2", "f10"]);
    }
}

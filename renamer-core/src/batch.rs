use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::conflict::{detect_conflicts, Candidate, CandidateSource, DiskProbe, FileProbe};
use crate::pairs::{extension_of, strip_extension};
use crate::path::CasePolicy;
use crate::plan::PlanResult;

/// Padding used when the number format contains anything but zeros
const FALLBACK_NUMBER_WIDTH: usize = 3;

/// Joiner between the counter and the base name
const NUMBER_JOINER: &str = "_";

/// Where the sequential counter goes relative to the base name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NumberPosition {
    /// `001_base`
    Prefix,
    /// `base_001`
    #[default]
    Suffix,
}

impl From<String> for NumberPosition {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&str> for NumberPosition {
    /// Anything other than `"prefix"` means suffix.
    fn from(value: &str) -> Self {
        if value == "prefix" {
            Self::Prefix
        } else {
            Self::Suffix
        }
    }
}

/// Declarative batch transformation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchParams {
    /// Literal text to replace in the full name (case-sensitive, every occurrence)
    pub find: String,
    pub replace: String,
    /// Text put in front of the final base name
    pub prefix: String,
    /// Text appended to the final base name, before the extension
    pub suffix: String,
    /// Number of characters dropped from the start of the base name
    pub remove_from_start: usize,
    /// Number of characters dropped from the end of the base name
    pub remove_from_end: usize,
    pub numbering: bool,
    pub number_position: NumberPosition,
    /// Zeros giving the padding width, e.g. `"000"`
    pub number_format: String,
    pub number_start: i64,
    /// Accepted for compatibility; the joiner is always `_`
    pub number_separator: String,
}

impl BatchParams {
    /// True when no rule would change any name.
    pub fn is_noop(&self) -> bool {
        self.find.is_empty()
            && self.prefix.is_empty()
            && self.suffix.is_empty()
            && self.remove_from_start == 0
            && self.remove_from_end == 0
            && !self.numbering
    }

    /// Zero-padding width of the counter.
    pub fn number_width(&self) -> usize {
        if !self.numbering || self.number_format.is_empty() {
            return 0;
        }

        if self.number_format.chars().all(|c| c == '0') {
            self.number_format.len()
        } else {
            FALLBACK_NUMBER_WIDTH
        }
    }
}

/// Applies the rules to one name after another, carrying the counter.
///
/// Created fresh for every build call, so repeated calls start from the same
/// counter value.
#[derive(Debug)]
pub struct BatchRenamer<'a> {
    params: &'a BatchParams,
    width: usize,
    /// `None` once the counter has run past `i64::MAX`
    counter: Option<i64>,
}

impl<'a> BatchRenamer<'a> {
    pub fn new(params: &'a BatchParams) -> Self {
        Self {
            params,
            width: params.number_width(),
            counter: Some(params.number_start),
        }
    }

    /// Compute the new name for `file_name`.
    ///
    /// Returns `None` when the name would not change, the resulting base
    /// name is empty or the counter is exhausted.
    pub fn rename(&mut self, file_name: &str) -> Option<String> {
        let params = self.params;

        let replaced = if params.find.is_empty() {
            file_name.to_string()
        } else {
            file_name.replace(&params.find, &params.replace)
        };

        let ext = extension_of(&replaced);
        let mut base = strip_extension(&replaced).to_string();

        if params.remove_from_start > 0 {
            base = base.chars().skip(params.remove_from_start).collect();
        }

        if params.remove_from_end > 0 {
            let keep = base.chars().count().saturating_sub(params.remove_from_end);
            base = base.chars().take(keep).collect();
        }

        if params.numbering {
            let Some(current) = self.counter else {
                warn!(file = %file_name, "Number counter exhausted, skipping file");
                return None;
            };
            let number = format!("{:0width$}", current, width = self.width);
            self.counter = current.checked_add(1);

            base = match params.number_position {
                NumberPosition::Prefix => format!("{number}{NUMBER_JOINER}{base}"),
                NumberPosition::Suffix => format!("{base}{NUMBER_JOINER}{number}"),
            };
        }

        let base = format!("{}{}{}", params.prefix, base, params.suffix);
        let new_name = format!("{base}{ext}");

        if new_name == file_name || base.is_empty() {
            return None;
        }

        Some(new_name)
    }
}

/// Build a plan by applying batch rules to `file_names`, in list order.
pub fn build_plan_from_batch(
    target_dir: &Path,
    file_names: &[String],
    params: &BatchParams,
    policy: CasePolicy,
) -> PlanResult {
    build_plan_from_batch_with_probe(target_dir, file_names, params, policy, &DiskProbe)
}

pub fn build_plan_from_batch_with_probe(
    target_dir: &Path,
    file_names: &[String],
    params: &BatchParams,
    policy: CasePolicy,
    probe: &dyn FileProbe,
) -> PlanResult {
    if target_dir.as_os_str().is_empty() || params.is_noop() {
        return PlanResult::default();
    }

    let mut renamer = BatchRenamer::new(params);
    let mut candidates = Vec::new();

    for file_name in file_names {
        match renamer.rename(file_name) {
            Some(new_name) => candidates.push(Candidate::new(
                target_dir,
                file_name,
                &new_name,
                CandidateSource::Batch,
            )),
            None => debug!(file = %file_name, "Name unchanged by batch rules"),
        }
    }

    let plan = detect_conflicts(candidates, policy, probe);
    info!(
        files = file_names.len(),
        operations = plan.operations.len(),
        conflicts = plan.conflicts.len(),
        "Built plan from batch rules"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn rename_all(params: &BatchParams, list: &[&str]) -> Vec<Option<String>> {
        let mut renamer = BatchRenamer::new(params);
        list.iter().map(|name| renamer.rename(name)).collect()
    }

    #[test]
    fn test_find_replace_applies_to_whole_name() {
        let params = BatchParams {
            find: "jpg".to_string(),
            replace: "jpeg".to_string(),
            ..Default::default()
        };
        assert_eq!(
            rename_all(&params, &["jpg_scan.jpg", "doc.txt"]),
            vec![Some("jpeg_scan.jpeg".to_string()), None]
        );
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let params = BatchParams {
            find: "IMG".to_string(),
            replace: "photo".to_string(),
            ..Default::default()
        };
        assert_eq!(rename_all(&params, &["img_1.png"]), vec![None]);
    }

    #[test]
    fn test_remove_counts_characters_not_bytes() {
        let params = BatchParams {
            remove_from_start: 2,
            remove_from_end: 1,
            ..Default::default()
        };
        assert_eq!(
            rename_all(&params, &["äöabcü.txt"]),
            vec![Some("abc.txt".to_string())]
        );
    }

    #[test]
    fn test_removing_everything_skips_the_file() {
        let params = BatchParams {
            remove_from_start: 10,
            ..Default::default()
        };
        assert_eq!(rename_all(&params, &["short.txt"]), vec![None]);

        // A suffix keeps the base non-empty
        let params = BatchParams {
            remove_from_end: 10,
            suffix: "x".to_string(),
            ..Default::default()
        };
        assert_eq!(rename_all(&params, &["short.txt"]), vec![Some("x.txt".to_string())]);
    }

    #[test]
    fn test_numbering_suffix_with_padding() {
        let params = BatchParams {
            numbering: true,
            number_start: 1,
            number_format: "00".to_string(),
            number_position: NumberPosition::Suffix,
            ..Default::default()
        };
        assert_eq!(
            rename_all(&params, &["x.txt", "y.txt"]),
            vec![Some("x_01.txt".to_string()), Some("y_02.txt".to_string())]
        );
    }

    #[test]
    fn test_numbering_prefix_and_wrapping() {
        let params = BatchParams {
            numbering: true,
            number_start: 7,
            number_format: "000".to_string(),
            number_position: NumberPosition::Prefix,
            prefix: "trip-".to_string(),
            suffix: "-final".to_string(),
            ..Default::default()
        };
        assert_eq!(
            rename_all(&params, &["beach.jpg"]),
            vec![Some("trip-007_beach-final.jpg".to_string())]
        );
    }

    #[test]
    fn test_counter_stops_at_the_largest_number() {
        let params = BatchParams {
            numbering: true,
            number_start: i64::MAX,
            ..Default::default()
        };
        assert_eq!(
            rename_all(&params, &["a.txt", "b.txt", "c.txt"]),
            vec![Some(format!("a_{}.txt", i64::MAX)), None, None]
        );

        let plan = build_plan_from_batch_with_probe(
            Path::new("/d"),
            &names(&["a.txt", "b.txt"]),
            &params,
            CasePolicy::CaseSensitive,
            &|_: &Path| false,
        );
        assert_eq!(plan.operations.len(), 1);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn test_negative_start_counts_up() {
        let params = BatchParams {
            numbering: true,
            number_start: -1,
            number_format: "00".to_string(),
            ..Default::default()
        };
        assert_eq!(
            rename_all(&params, &["a.txt", "b.txt"]),
            vec![Some("a_-1.txt".to_string()), Some("b_00.txt".to_string())]
        );
    }

    #[test]
    fn test_number_width_rules() {
        let mut params = BatchParams {
            numbering: true,
            ..Default::default()
        };
        assert_eq!(params.number_width(), 0);

        params.number_format = "0000".to_string();
        assert_eq!(params.number_width(), 4);

        params.number_format = "0#0".to_string();
        assert_eq!(params.number_width(), FALLBACK_NUMBER_WIDTH);

        params.numbering = false;
        assert_eq!(params.number_width(), 0);
    }

    #[test]
    fn test_separator_is_not_applied() {
        let params = BatchParams {
            numbering: true,
            number_start: 1,
            number_separator: "-".to_string(),
            ..Default::default()
        };
        assert_eq!(rename_all(&params, &["a.txt"]), vec![Some("a_1.txt".to_string())]);
    }

    #[test]
    fn test_dotfile_is_all_extension() {
        let params = BatchParams {
            prefix: "old".to_string(),
            ..Default::default()
        };
        assert_eq!(rename_all(&params, &[".bashrc"]), vec![Some("old.bashrc".to_string())]);
    }

    #[test]
    fn test_number_position_parsing() {
        assert_eq!(NumberPosition::from("prefix"), NumberPosition::Prefix);
        assert_eq!(NumberPosition::from("suffix"), NumberPosition::Suffix);
        assert_eq!(NumberPosition::from(""), NumberPosition::Suffix);
        assert_eq!(NumberPosition::from("Prefix"), NumberPosition::Suffix);

        let params: BatchParams =
            serde_json::from_str(r#"{"numbering":true,"numberPosition":"middle"}"#).unwrap();
        assert_eq!(params.number_position, NumberPosition::Suffix);
        assert!(params.numbering);
    }

    #[test]
    fn test_default_params_give_empty_plan() {
        let params: BatchParams = serde_json::from_str("{}").unwrap();
        assert!(params.is_noop());

        let plan = build_plan_from_batch_with_probe(
            Path::new("/d"),
            &names(&["a.txt", "b.txt"]),
            &params,
            CasePolicy::CaseSensitive,
            &|_: &Path| -> bool { panic!("filesystem must not be touched") },
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn test_counter_restarts_for_every_build() {
        let params = BatchParams {
            numbering: true,
            number_start: 1,
            ..Default::default()
        };
        let files = names(&["a.txt", "b.txt"]);
        let no_files = |_: &Path| false;

        let first = build_plan_from_batch_with_probe(
            Path::new("/d"),
            &files,
            &params,
            CasePolicy::CaseSensitive,
            &no_files,
        );
        let second = build_plan_from_batch_with_probe(
            Path::new("/d"),
            &files,
            &params,
            CasePolicy::CaseSensitive,
            &no_files,
        );
        assert_eq!(first, second);
        assert_eq!(first.operations[0].new_name, "a_1.txt");
    }

    #[test]
    fn test_colliding_batch_results_keep_first() {
        let params = BatchParams {
            find: "-v2".to_string(),
            ..Default::default()
        };
        let plan = build_plan_from_batch_with_probe(
            Path::new("/d"),
            &names(&["report-v2.pdf", "report-v2-v2.pdf", "notes-v2.pdf"]),
            &params,
            CasePolicy::CaseSensitive,
            &|_: &Path| false,
        );

        // "report-v2.pdf" and "report-v2-v2.pdf" both become "report.pdf"
        let accepted: Vec<_> = plan.operations.iter().map(|op| op.old_name.as_str()).collect();
        assert_eq!(accepted, vec!["notes-v2.pdf", "report-v2.pdf"]);
        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].target_name, "report-v2-v2.pdf");
        assert_eq!(plan.conflicts[0].reason, "name conflict with «report-v2.pdf»");
    }
}

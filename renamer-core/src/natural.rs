//! Natural ("human") ordering of file names.
//!
//! Embedded digit runs compare by numeric value, everything else compares
//! ASCII case-insensitively, so `file2` sorts before `file10`.

use std::cmp::Ordering;

/// Compare two names in natural order.
///
/// Equal numeric values with different zero padding order the less padded
/// run first (`a1` < `a01`). When one name is a prefix of the other the
/// shorter one sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut ai, mut bi) = (0, 0);

    while ai < a.len() && bi < b.len() {
        let (ca, cb) = (a[ai], b[bi]);

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let start_a = ai;
            let start_b = bi;
            while ai < a.len() && a[ai].is_ascii_digit() {
                ai += 1;
            }
            while bi < b.len() && b[bi].is_ascii_digit() {
                bi += 1;
            }

            let run_a = &a[start_a..ai];
            let run_b = &b[start_b..bi];
            let num_a = trim_leading_zeros(run_a);
            let num_b = trim_leading_zeros(run_b);

            let ordering = num_a
                .len()
                .cmp(&num_b.len())
                .then_with(|| num_a.cmp(num_b))
                .then_with(|| run_a.len().cmp(&run_b.len()));
            if ordering != Ordering::Equal {
                return ordering;
            }
            continue;
        }

        let ordering = ca.to_ascii_lowercase().cmp(&cb.to_ascii_lowercase());
        if ordering != Ordering::Equal {
            return ordering;
        }
        ai += 1;
        bi += 1;
    }

    a.len().cmp(&b.len())
}

/// `true` when `a` sorts strictly before `b`.
pub fn natural_less(a: &str, b: &str) -> bool {
    natural_cmp(a, b) == Ordering::Less
}

/// Stable in-place natural sort keyed by a name accessor.
pub fn natural_sort_by_key<T, F>(items: &mut [T], mut key: F)
where
    F: FnMut(&T) -> &str,
{
    items.sort_by(|x, y| natural_cmp(key(x), key(y)));
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let first_non_zero = digits
        .iter()
        .position(|&d| d != b'0')
        .unwrap_or(digits.len());
    &digits[first_non_zero..]
}

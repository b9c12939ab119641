//! Filename ordering for batch enumeration.
//!
//! Two strategies: plain ordinal comparison, and a natural order that compares
//! the first run of digits in each name numerically, so `img2` sorts before
//! `img10`.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::SortStrategy;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit-run pattern is valid"));

/// Ordinal byte-wise comparison.
pub fn lexical_cmp(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Numeric-aware comparison on the first digit run.
///
/// A name whose first digit run parses as a number sorts before one without
/// any; when neither side has one the comparison falls back to ordinal order.
/// Digit runs that overflow an `i64` count as "no number", matching the
/// original tool's integer parse.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (extract_first_number(a), extract_first_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Comparator for the given strategy, usable with `sort_by`.
pub fn comparator(strategy: SortStrategy) -> fn(&str, &str) -> Ordering {
    match strategy {
        SortStrategy::Lexical => lexical_cmp,
        SortStrategy::Natural => natural_cmp,
    }
}

fn extract_first_number(name: &str) -> Option<i64> {
    FIRST_NUMBER
        .find(name)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(strategy: SortStrategy, names: &[&str]) -> Vec<String> {
        let cmp = comparator(strategy);
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        names.sort_by(|a, b| cmp(a, b));
        names
    }

    #[test]
    fn natural_orders_digit_runs_numerically() {
        assert_eq!(
            sorted(SortStrategy::Natural, &["img2.png", "img10.png", "img1.png"]),
            vec!["img1.png", "img2.png", "img10.png"]
        );
    }

    #[test]
    fn lexical_orders_ordinally() {
        assert_eq!(
            sorted(SortStrategy::Lexical, &["img2.png", "img10.png", "img1.png"]),
            vec!["img1.png", "img10.png", "img2.png"]
        );
    }

    #[test]
    fn numbered_names_sort_before_unnumbered() {
        assert_eq!(
            sorted(SortStrategy::Natural, &["cover.png", "7.png", "intro.png"]),
            vec!["7.png", "cover.png", "intro.png"]
        );
    }

    #[test]
    fn unnumbered_names_fall_back_to_ordinal() {
        assert_eq!(natural_cmp("alpha.png", "beta.png"), Ordering::Less);
        assert_eq!(natural_cmp("beta.png", "alpha.png"), Ordering::Greater);
    }

    #[test]
    fn overflowing_digit_run_counts_as_no_number() {
        // 20 digits cannot parse as i64; the name is treated like any other
        // unnumbered one.
        let huge = "99999999999999999999.png";
        assert_eq!(extract_first_number(huge), None);
        assert_eq!(natural_cmp("5.png", huge), Ordering::Less);
    }

    #[test]
    fn equal_numbers_compare_equal_for_stable_sort() {
        assert_eq!(natural_cmp("part2a.png", "part2b.png"), Ordering::Equal);
    }
}

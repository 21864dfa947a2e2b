//! @ai:module:intent Check that an expression uses exactly the puzzle's numbers
//! @ai:module:layer application
//! @ai:module:public_api scan_literals, numbers_used_correctly, check_number_usage, LiteralScan
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// @ai:intent Multiset of integer literals found in raw expression text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralScan {
    /// value -> number of occurrences
    pub counts: BTreeMap<i128, usize>,
    /// numeric tokens that are not plain integers (e.g. "2.5", "1e3")
    pub extraneous: Vec<String>,
}

impl LiteralScan {
    /// @ai:intent Flatten the multiset into a sorted list
    /// @ai:effects pure
    pub fn sorted_values(&self) -> Vec<i128> {
        self.counts
            .iter()
            .flat_map(|(value, count)| std::iter::repeat(*value).take(*count))
            .collect()
    }
}

fn numeric_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("numeric token regex")
    })
}

/// @ai:intent Scan the raw text for numeric tokens, independently of the parser
/// @ai:post a '-' directly before digits is folded into the literal only in unary position
/// @ai:effects pure
/// @ai:example ("(10-4)*(9-2)") -> {10, 4, 9, 2}
/// @ai:example ("-4+9") -> {-4, 9}
pub fn scan_literals(expression: &str) -> LiteralScan {
    let mut scan = LiteralScan::default();

    for m in numeric_token_regex().find_iter(expression) {
        let text = m.as_str();

        let is_integer = text.bytes().all(|b| b.is_ascii_digit());
        if !is_integer {
            scan.extraneous.push(text.to_string());
            continue;
        }

        let negative = has_unary_minus(expression, m.start());
        let parsed = if negative {
            format!("-{}", text).parse::<i128>()
        } else {
            text.parse::<i128>()
        };

        match parsed {
            Ok(value) => *scan.counts.entry(value).or_insert(0) += 1,
            Err(_) => scan.extraneous.push(text.to_string()),
        }
    }

    scan
}

/// @ai:intent Decide whether the digits at `start` carry a unary minus
/// @ai:effects pure
fn has_unary_minus(expression: &str, start: usize) -> bool {
    let before = &expression[..start];
    if !before.ends_with('-') {
        return false;
    }

    let prior = before[..before.len() - 1]
        .chars()
        .rev()
        .find(|c| !c.is_whitespace());

    matches!(prior, None | Some('(' | '+' | '-' | '*' | '/' | '%'))
}

/// @ai:intent Compare literal multiset with the puzzle numbers
/// @ai:effects pure
/// @ai:example ("4+9+10+2", [4, 9, 10, 2]) -> true
/// @ai:example ("4+9+10", [4, 9, 10, 2]) -> false
pub fn numbers_used_correctly(expression: &str, nums: &[i128]) -> bool {
    check_number_usage(expression, nums).is_ok()
}

/// @ai:intent Validate number usage, reporting the mismatch on failure
/// @ai:effects pure
pub fn check_number_usage(expression: &str, nums: &[i128]) -> Result<()> {
    let scan = scan_literals(expression);

    let mut expected_counts: BTreeMap<i128, usize> = BTreeMap::new();
    for n in nums {
        *expected_counts.entry(*n).or_insert(0) += 1;
    }

    if scan.extraneous.is_empty() && scan.counts == expected_counts {
        return Ok(());
    }

    let mut expected = nums.to_vec();
    expected.sort_unstable();

    Err(Error::NumberUsage {
        expected,
        found: scan.sorted_values(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_usage_in_any_order() {
        assert!(numbers_used_correctly("(10-4)*(9-2)", &[4, 9, 10, 2]));
        assert!(numbers_used_correctly("2 * 10 + 9 - 4", &[4, 9, 10, 2]));
    }

    #[test]
    fn test_missing_number_fails() {
        assert!(!numbers_used_correctly("4+9+10", &[4, 9, 10, 2]));
    }

    #[test]
    fn test_repeated_number_fails() {
        assert!(!numbers_used_correctly("4+9+10+2+2", &[4, 9, 10, 2]));
    }

    #[test]
    fn test_duplicates_in_puzzle_must_all_be_used() {
        assert!(numbers_used_correctly("5*5+1-1", &[5, 5, 1, 1]));
        assert!(!numbers_used_correctly("5*5+1", &[5, 5, 1, 1]));
    }

    #[test]
    fn test_extraneous_constant_fails() {
        assert!(!numbers_used_correctly("4+9+10+2+1", &[4, 9, 10, 2]));
        assert!(!numbers_used_correctly("4*9/10*2.5", &[4, 9, 10, 2]));
    }

    #[test]
    fn test_unary_minus_is_folded_into_literal() {
        let scan = scan_literals("-4+9*(-10)-2");
        assert_eq!(scan.sorted_values(), vec![-10, -4, 2, 9]);
        assert!(!numbers_used_correctly("-4+9*(-10)-2", &[4, 9, 10, 2]));
    }

    #[test]
    fn test_binary_minus_is_not_folded() {
        let scan = scan_literals("10 -4");
        assert_eq!(scan.sorted_values(), vec![4, 10]);
    }

    #[test]
    fn test_mismatch_reports_both_sides() {
        match check_number_usage("9+4", &[4, 9, 10]) {
            Err(Error::NumberUsage { expected, found }) => {
                assert_eq!(expected, vec![4, 9, 10]);
                assert_eq!(found, vec![4, 9]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

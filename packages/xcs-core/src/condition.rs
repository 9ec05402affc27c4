//! Interval conditions.

use std::fmt::{self, Display};

/// An interval condition: one closed interval `[lo, hi]` per input line.
///
/// A condition over `L` lines stores `2·L` bounds. It matches an input
/// vector when every line falls inside its interval. The don't-care of the
/// classical ternary alphabet is the degenerate interval covering the whole
/// observed range (`[0, 1]` for binary inputs).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// `[lo_0, hi_0, lo_1, hi_1, ...]`
    bounds: Vec<f64>,
}

impl Condition {
    /// The most specific condition covering `input`: a singleton interval
    /// per line.
    #[must_use]
    pub fn point(input: &[f64]) -> Self {
        let mut bounds = Vec::with_capacity(input.len() * 2);
        for &line in input {
            bounds.push(line);
            bounds.push(line);
        }
        Self { bounds }
    }

    /// Number of input lines this condition covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bounds.len() / 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    fn lo(&self, line: usize) -> f64 {
        self.bounds[2 * line]
    }

    fn hi(&self, line: usize) -> f64 {
        self.bounds[2 * line + 1]
    }

    /// Does every input line fall inside its interval?
    ///
    /// A condition over a different number of lines matches nothing.
    #[must_use]
    pub fn matches(&self, input: &[f64]) -> bool {
        self.bounds.len() == input.len() * 2
            && input
                .iter()
                .enumerate()
                .all(|(line, &value)| self.lo(line) <= value && value <= self.hi(line))
    }

    /// Can the two conditions match at least one common point?
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.bounds.len() == other.bounds.len()
            && (0..self.len())
                .all(|line| self.lo(line) <= other.hi(line) && other.lo(line) <= self.hi(line))
    }

    /// Does `self` cover everything `other` covers? Interval-wise
    /// containment, so every input matching `other` also matches `self`.
    #[must_use]
    pub fn is_more_general(&self, other: &Self) -> bool {
        self.bounds.len() == other.bounds.len()
            && (0..self.len())
                .all(|line| self.lo(line) <= other.lo(line) && self.hi(line) >= other.hi(line))
    }

    /// The line-wise interval union of two conditions.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        debug_assert_eq!(self.bounds.len(), other.bounds.len());
        let bounds = (0..self.len())
            .flat_map(|line| {
                [
                    self.lo(line).min(other.lo(line)),
                    self.hi(line).max(other.hi(line)),
                ]
            })
            .collect();
        Self { bounds }
    }

    /// Are all bounds 0 or 1, so the condition prints in the ternary
    /// `0`/`1`/`#` alphabet?
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.bounds.iter().all(|&bound| bound == 0.0 || bound == 1.0)
    }

    /// Numeric key of the printable form, used as the final tie-break when
    /// sorting a population for combining: reading right to left, position
    /// `n` contributes nothing for `'0'`, `2^n` for `'1'`, and `2^n + 1`
    /// for `'#'`.
    pub(crate) fn encoding(&self) -> f64 {
        self.to_string()
            .chars()
            .rev()
            .enumerate()
            .fold(0.0, |key, (position, symbol)| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let weight = 2_f64.powi(position as i32);
                match symbol {
                    '1' => key + weight,
                    '#' => key + weight + 1.0,
                    _ => key,
                }
            })
    }

    /// Build a condition from the ternary alphabet, for tests: `'0'` and
    /// `'1'` are singleton intervals, anything else is a don't-care.
    #[cfg(test)]
    pub(crate) fn from_pattern(pattern: &str) -> Self {
        let bounds = pattern
            .chars()
            .flat_map(|symbol| match symbol {
                '0' => [0.0, 0.0],
                '1' => [1.0, 1.0],
                _ => [0.0, 1.0],
            })
            .collect();
        Self { bounds }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binary = self.is_binary();
        for line in 0..self.len() {
            let (lo, hi) = (self.lo(line), self.hi(line));
            if binary {
                if lo < hi {
                    write!(f, "#")?;
                } else if lo == 1.0 {
                    write!(f, "1")?;
                } else {
                    write!(f, "0")?;
                }
            } else {
                let lo = truncated(lo);
                let hi = truncated(hi);
                if lo == hi {
                    write!(f, "[{lo}]")?;
                } else {
                    write!(f, "[{lo}..{hi}]")?;
                }
            }
        }
        Ok(())
    }
}

/// First five characters of the fixed six-decimal rendering, e.g. `0.125`
/// for 0.125 and `-0.50` for -0.5.
fn truncated(value: f64) -> String {
    let mut text = format!("{value:.6}");
    text.truncate(5);
    text
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use test_case::test_case;
    use test_strategy::proptest;

    use super::Condition;

    #[test_case("1011"; "all lines fixed")]
    #[test_case("1000"; "matches itself only")]
    fn pattern_matches_exact_input(pattern: &str) {
        let condition = Condition::from_pattern(pattern);
        let input: Vec<f64> = pattern
            .bytes()
            .map(|bit| f64::from(bit - b'0'))
            .collect();
        assert!(condition.matches(&input));
    }

    #[test]
    fn dont_care_lines_match_either_bit() {
        let condition = Condition::from_pattern("10##");
        for tail in [[1.0, 1.0], [0.0, 0.0], [0.0, 1.0], [1.0, 0.0]] {
            assert!(condition.matches(&[1.0, 0.0, tail[0], tail[1]]));
        }
        assert!(!condition.matches(&[1.0, 1.0, 1.0, 1.0]));
        assert!(!condition.matches(&[0.0, 1.0, 0.0, 0.0]));
    }

    #[test]
    fn length_mismatch_never_matches() {
        let condition = Condition::from_pattern("10");
        assert!(!condition.matches(&[1.0, 0.0, 1.0]));
        assert!(!condition.matches(&[1.0]));
    }

    #[test_case("10##", "1011", true; "shared corner")]
    #[test_case("10##", "0###", false; "first line disjoint")]
    #[test_case("####", "0000", true; "don't cares overlap everything")]
    fn overlap(left: &str, right: &str, expected: bool) {
        let left = Condition::from_pattern(left);
        let right = Condition::from_pattern(right);
        assert_eq!(left.overlaps(&right), expected);
        assert_eq!(right.overlaps(&left), expected);
    }

    #[test]
    fn union_covers_both_parents() {
        let left = Condition::from_pattern("100");
        let right = Condition::from_pattern("110");
        let union = left.union(&right);
        assert!(union.is_more_general(&left));
        assert!(union.is_more_general(&right));
        assert_eq!(union, Condition::from_pattern("1#0"));
    }

    #[test]
    fn more_general_is_reflexive_and_respects_containment() {
        let general = Condition::from_pattern("1#0#");
        let specific = Condition::from_pattern("110#");
        assert!(general.is_more_general(&general));
        assert!(general.is_more_general(&specific));
        assert!(!specific.is_more_general(&general));
    }

    #[test]
    fn binary_display_uses_the_ternary_alphabet() {
        assert_eq!(Condition::from_pattern("10#1").to_string(), "10#1");
        assert_eq!(Condition::point(&[1.0, 0.0, 1.0, 1.0]).to_string(), "1011");
    }

    #[test]
    fn real_display_prints_truncated_intervals() {
        let point = Condition::point(&[0.125, 1.5]);
        assert_eq!(point.to_string(), "[0.125][1.500]");
        let wide = point.union(&Condition::point(&[0.5, 1.5]));
        assert_eq!(wide.to_string(), "[0.125..0.500][1.500]");
    }

    #[test]
    fn encoding_orders_the_printable_form() {
        // '0' < '1' < '#' per line, weighted right to left.
        let zero = Condition::from_pattern("00");
        let one = Condition::from_pattern("01");
        let hash = Condition::from_pattern("0#");
        let high = Condition::from_pattern("1#");
        assert!(zero.encoding() < one.encoding());
        assert!(one.encoding() < hash.encoding());
        assert!(hash.encoding() < high.encoding());
    }

    #[proptest]
    fn point_condition_matches_its_input(
        #[strategy(vec(-1.0e6..1.0e6, 1..16))] input: Vec<f64>,
    ) {
        assert!(Condition::point(&input).matches(&input));
    }

    #[proptest]
    fn union_of_points_matches_both_inputs(
        #[strategy(vec(-1.0e6..1.0e6, 1..16))] first: Vec<f64>,
        #[strategy(vec(-1.0e6..1.0e6, 1..16))] second: Vec<f64>,
    ) {
        // Trim to a shared length so the union is defined.
        let lines = first.len().min(second.len());
        let first = &first[..lines];
        let second = &second[..lines];
        let union = Condition::point(first).union(&Condition::point(second));
        assert!(union.matches(first));
        assert!(union.matches(second));
        assert!(union.is_more_general(&Condition::point(first)));
    }
}

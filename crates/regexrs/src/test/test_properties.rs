// Property tests for iteration, split and compilation
use proptest::prelude::*;

use crate::*;

const PATTERNS: &[&str] = &[
    "a",
    "a*",
    "b+",
    "[ab]*?",
    "\\d+",
    "\\s*[,;]\\s*",
    "(?:ab|a)",
    "\\b",
    "$",
    "x?",
    "a|b|",
    "[^ ]+",
];

fn pattern() -> impl Strategy<Value = &'static str> {
    prop::sample::select(PATTERNS)
}

fn subject() -> impl Strategy<Value = String> {
    "[ab ,;0-9é]{0,24}"
}

proptest! {
    #[test]
    fn matches_are_ordered_and_disjoint(p in pattern(), s in subject()) {
        let r = Regex::with_options(p, RegexOptions::empty()).unwrap();
        let spans: Vec<GroupRange> = r.find_all(&s).map(|m| m.range_of_match()).collect();
        for pair in spans.windows(2) {
            prop_assert!(pair[0].start < pair[1].start);
            prop_assert!(pair[0].end <= pair[1].start);
        }
        let len = s.chars().count();
        for span in &spans {
            prop_assert!(span.start <= span.end && span.end <= len);
        }
    }

    #[test]
    fn split_round_trips(p in pattern(), s in subject()) {
        let r = Regex::with_options(p, RegexOptions::empty()).unwrap();
        prop_assert_eq!(r.captures_len(), 0);
        let segments = r.split(&s);
        let delimiters: Vec<&str> = r.find_all(&s).map(|m| m.matched()).collect();
        prop_assert_eq!(segments.len(), delimiters.len() + 1);
        let mut rebuilt = String::new();
        for (i, segment) in segments.iter().enumerate() {
            rebuilt.push_str(segment);
            if let Some(d) = delimiters.get(i) {
                rebuilt.push_str(d);
            }
        }
        prop_assert_eq!(rebuilt, s);
    }

    #[test]
    fn recompiling_is_idempotent(p in pattern(), s in subject()) {
        let a = Regex::with_options(p, RegexOptions::CASE_INSENSITIVE).unwrap();
        let b = Regex::with_options(p, RegexOptions::CASE_INSENSITIVE).unwrap();
        let left: Vec<_> = a.find_all(&s).map(|m| m.ranges().to_vec()).collect();
        let right: Vec<_> = b.find_all(&s).map(|m| m.ranges().to_vec()).collect();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn whole_match_template_is_identity(p in pattern(), s in subject()) {
        let r = Regex::with_options(p, RegexOptions::empty()).unwrap();
        prop_assert_eq!(r.replace_all(&s, "$0"), s.clone());
        prop_assert_eq!(r.replace_all_with(&s, |_| None), s);
    }

    #[test]
    fn literal_mode_finds_substrings(needle in "[ab.*]{1,4}", s in "[ab.*]{0,16}") {
        let r = Regex::with_options(&needle, RegexOptions::IGNORE_METACHARACTERS).unwrap();
        prop_assert_eq!(r.matches(&s), s.contains(needle.as_str()));
    }
}

#[test]
fn star_on_empty_subject_yields_one_match() {
    for p in ["a*", "(a*)*", "(?:a|)*", "x?"] {
        let r = Regex::with_options(p, RegexOptions::empty()).unwrap();
        let spans: Vec<_> = r.find_all("").map(|m| m.range_of_match()).collect();
        assert_eq!(spans, vec![GroupRange::new(0, 0)], "pattern {}", p);
    }
}

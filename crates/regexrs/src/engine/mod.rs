// Match engine
// Finds the leftmost match at or after a start offset.

pub mod backtrack;
pub mod input;
pub mod look;

pub use backtrack::Slots;
pub use input::Subject;

use crate::compiler::Program;
use crate::error::MatchError;
use backtrack::Vm;

/// Search `subject` for the leftmost match starting at or after `start` (a code-point offset).
///
/// The step budget covers the whole call, across every start position tried.
pub fn search(
    prog: &Program,
    subject: &Subject<'_>,
    start: usize,
    budget: Option<u64>,
) -> Result<Option<Slots>, MatchError> {
    let chars = subject.chars();
    if start > chars.len() {
        return Ok(None);
    }
    log::trace!("search from {} of {}", start, chars.len());

    if let Some(literal) = &prog.literal {
        return Ok(find_literal(chars, literal, start).map(|at| vec![Some(at), Some(at + literal.len())]));
    }

    let mut vm = Vm::new(prog, chars, budget);
    let last = if prog.anchored_start {
        if start > 0 {
            return Ok(None);
        }
        0
    } else {
        chars.len()
    };

    for at in start..=last {
        if let Some(first) = prog.first_char {
            if chars.get(at) != Some(&first) {
                continue;
            }
        }
        if let Some(slots) = vm.exec_at(at) {
            return Ok(Some(slots));
        }
        if vm.exhausted() {
            let steps = budget.unwrap_or(vm.steps());
            log::warn!("step budget of {} exhausted at offset {}", steps, at);
            return Err(MatchError::BudgetExceeded { steps });
        }
    }
    Ok(None)
}

/// Plain substring search over code points.
fn find_literal(haystack: &[char], needle: &[char], start: usize) -> Option<usize> {
    let first = *needle.first()?;
    let mut at = start;
    while at + needle.len() <= haystack.len() {
        let offset = haystack[at..].iter().position(|&c| c == first)?;
        at += offset;
        if haystack.get(at..at + needle.len())? == needle {
            return Some(at);
        }
        at += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::options::{MatchLimits, RegexOptions};

    fn find(pattern: &str, text: &str, start: usize) -> Option<(usize, usize)> {
        let prog = compile(pattern, RegexOptions::empty(), &MatchLimits::default()).unwrap();
        let subject = Subject::new(text);
        let slots = search(&prog, &subject, start, None).unwrap()?;
        Some((slots[0]?, slots[1]?))
    }

    #[test]
    fn test_leftmost() {
        assert_eq!(find("b+", "abbcbbb", 0), Some((1, 3)));
        assert_eq!(find("b+", "abbcbbb", 3), Some((4, 7)));
        assert_eq!(find("x", "abc", 0), None);
    }

    #[test]
    fn test_literal_fast_path() {
        assert_eq!(find("cab", "abcacab", 0), Some((4, 7)));
        assert_eq!(find("ñb", "aññb", 0), Some((2, 4)));
        assert_eq!(find("ab", "ab", 1), None);
    }

    #[test]
    fn test_anchored_start_only_at_zero() {
        assert_eq!(find("^a", "aa", 0), Some((0, 1)));
        assert_eq!(find("^a", "aa", 1), None);
    }

    #[test]
    fn test_empty_match_at_end() {
        assert_eq!(find("a*", "bb", 2), Some((2, 2)));
        assert_eq!(find("a*", "bb", 3), None);
    }

    #[test]
    fn test_budget_error() {
        let prog = compile("(a+)+$", RegexOptions::empty(), &MatchLimits::default()).unwrap();
        let text = format!("{}!", "a".repeat(40));
        let subject = Subject::new(&text);
        let err = search(&prog, &subject, 0, Some(10_000)).unwrap_err();
        assert_eq!(err, MatchError::BudgetExceeded { steps: 10_000 });
    }
}

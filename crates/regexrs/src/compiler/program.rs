// Compiled program
// A flat instruction list executed by the backtracking VM in `engine`.
//
// Register layout: slots `2*g` / `2*g + 1` hold the start / end of group `g`
// (group 0 is the whole match); loop marks follow the slots.

use super::ast::Look;
use super::class::CharSet;

pub type InstPtr = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// Exact code point.
    Char(char),
    /// Code point compared after case folding. Holds the folded form.
    CharFold(char),
    /// `.` without dot-all: anything except a line terminator.
    Any,
    /// `.` with dot-all.
    AnyAll,
    /// Index into `Program::classes`.
    Class { set: usize, fold: bool },
    Look(Look),
    /// Record the position in a register.
    Save(usize),
    /// Try `first`; on failure resume at `second`.
    Split { first: InstPtr, second: InstPtr },
    Jump(InstPtr),
    /// Remember the loop-entry position in a mark register.
    Mark(usize),
    /// Leave the loop at `exit` when the position has not moved since the
    /// matching `Mark`; the empty iteration's captures are kept.
    Progress { mark: usize, exit: InstPtr },
    BackRef { group: usize, fold: bool },
    /// Run `body` to its `SubMatch` without keeping any alternatives, then continue at `next`.
    Atomic { body: InstPtr, next: InstPtr },
    /// Test `body` at the current position without consuming input.
    /// A lookbehind body is tried from every start within `max_len` of the position.
    LookAround {
        body: InstPtr,
        next: InstPtr,
        behind: bool,
        negate: bool,
        max_len: Option<usize>,
    },
    /// End of an atomic or lookaround body.
    SubMatch,
    Match,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub insts: Vec<Inst>,
    pub classes: Vec<CharSet>,
    /// Number of capturing groups, excluding group 0.
    pub groups: usize,
    /// Total registers: capture slots followed by loop marks.
    pub registers: usize,
    /// `.` and `$` treat only `\n` as a line terminator.
    pub unix_lines: bool,
    /// The pattern can only match at the start of the subject.
    pub anchored_start: bool,
    /// Every match starts with this code point.
    pub first_char: Option<char>,
    /// The whole pattern is this case-sensitive literal.
    pub literal: Option<Vec<char>>,
}

impl Program {
    #[inline]
    pub fn slots(&self) -> usize {
        (self.groups + 1) * 2
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            writeln!(f, "{:04} {:?}", pc, inst)?;
        }
        Ok(())
    }
}

// Error types
// Compilation failures carry a kind and the code-point offset in the pattern.
// A failed match is not an error; only an exhausted step budget is.

use smol_str::SmolStr;

/// What went wrong while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// `(` without a matching `)`.
    UnmatchedOpenParen,
    /// `)` without a matching `(`.
    UnmatchedCloseParen,
    /// `[` without a matching `]`.
    UnclosedClass,
    /// A class range whose start is after its end, e.g. `[z-a]`.
    InvalidClassRange { start: char, end: char },
    /// A quantifier with nothing in front of it, e.g. `*a` or `(|+)`.
    NothingToRepeat,
    /// A malformed or inverted counted repetition, e.g. `a{3,1}`.
    InvalidRepetition,
    /// A counted repetition bound above the configured maximum.
    RepetitionTooLarge,
    /// The pattern ends in a lone `\`.
    TrailingBackslash,
    /// An escaped letter with no meaning, e.g. `\y`.
    InvalidEscape(char),
    /// A malformed `\x`, `\u` or `\c` escape.
    InvalidHexEscape,
    /// A backreference to a group the pattern does not declare.
    InvalidBackReference(usize),
    /// Malformed `(?...)` syntax.
    InvalidGroupSyntax,
    /// Unknown inline flag letter.
    InvalidFlag(char),
    /// Unknown `\p{...}` property name.
    UnknownProperty(SmolStr),
    /// Unknown `[:name:]` class.
    UnknownPosixClass(SmolStr),
    /// Groups or classes nested deeper than the configured limit.
    NestingTooDeep,
    /// The compiled program exceeds the instruction limit.
    PatternTooLarge,
}

impl ErrorKind {
    /// Stable short diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnmatchedOpenParen => "unmatched-open-paren",
            ErrorKind::UnmatchedCloseParen => "unmatched-close-paren",
            ErrorKind::UnclosedClass => "unclosed-class",
            ErrorKind::InvalidClassRange { .. } => "invalid-class-range",
            ErrorKind::NothingToRepeat => "nothing-to-repeat",
            ErrorKind::InvalidRepetition => "invalid-repetition",
            ErrorKind::RepetitionTooLarge => "repetition-too-large",
            ErrorKind::TrailingBackslash => "trailing-backslash",
            ErrorKind::InvalidEscape(_) => "invalid-escape",
            ErrorKind::InvalidHexEscape => "invalid-hex-escape",
            ErrorKind::InvalidBackReference(_) => "invalid-back-reference",
            ErrorKind::InvalidGroupSyntax => "invalid-group-syntax",
            ErrorKind::InvalidFlag(_) => "invalid-flag",
            ErrorKind::UnknownProperty(_) => "unknown-property",
            ErrorKind::UnknownPosixClass(_) => "unknown-posix-class",
            ErrorKind::NestingTooDeep => "nesting-too-deep",
            ErrorKind::PatternTooLarge => "pattern-too-large",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnmatchedOpenParen => write!(f, "missing ')'"),
            ErrorKind::UnmatchedCloseParen => write!(f, "unmatched ')'"),
            ErrorKind::UnclosedClass => write!(f, "missing ']'"),
            ErrorKind::InvalidClassRange { start, end } => {
                write!(f, "invalid range {:?}-{:?} in class", start, end)
            }
            ErrorKind::NothingToRepeat => write!(f, "quantifier does not follow a repeatable item"),
            ErrorKind::InvalidRepetition => write!(f, "invalid repetition bounds"),
            ErrorKind::RepetitionTooLarge => write!(f, "repetition bound too large"),
            ErrorKind::TrailingBackslash => write!(f, "pattern ends with '\\'"),
            ErrorKind::InvalidEscape(c) => write!(f, "invalid escape '\\{}'", c),
            ErrorKind::InvalidHexEscape => write!(f, "malformed character escape"),
            ErrorKind::InvalidBackReference(n) => write!(f, "invalid back reference \\{}", n),
            ErrorKind::InvalidGroupSyntax => write!(f, "invalid group syntax"),
            ErrorKind::InvalidFlag(c) => write!(f, "invalid inline flag '{}'", c),
            ErrorKind::UnknownProperty(name) => write!(f, "unknown property '{}'", name),
            ErrorKind::UnknownPosixClass(name) => write!(f, "unknown class '[:{}:]'", name),
            ErrorKind::NestingTooDeep => write!(f, "pattern nested too deeply"),
            ErrorKind::PatternTooLarge => write!(f, "pattern too large"),
        }
    }
}

/// A pattern failed to compile. No usable regex exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    kind: ErrorKind,
    offset: usize,
}

impl CompileError {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Code-point offset in the pattern where the problem was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for CompileError {}

/// A search could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    /// The configured step budget ran out before the search finished.
    BudgetExceeded { steps: u64 },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::BudgetExceeded { steps } => {
                write!(f, "pattern too complex (step budget of {} exhausted)", steps)
            }
        }
    }
}

impl std::error::Error for MatchError {}

pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_offset() {
        let err = CompileError::new(ErrorKind::UnmatchedOpenParen, 4);
        assert_eq!(err.to_string(), "missing ')' at offset 4");
        assert_eq!(err.code(), "unmatched-open-paren");
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn test_budget_display() {
        let err = MatchError::BudgetExceeded { steps: 10 };
        assert!(err.to_string().contains("10"));
    }
}

// Regex construction options
// Bit-set flags that change how a pattern is compiled and matched,
// plus the runtime limits applied while matching.

use bitflags::bitflags;

use crate::limits::{DEFAULT_STEP_BUDGET, MAX_NESTING};

bitflags! {
    /// Options that modify the default regex behaviour.
    ///
    /// The bit values are stable and can be stored or exchanged as integers
    /// through [`RegexOptions::bits`] / [`RegexOptions::from_bits_truncate`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RegexOptions: u32 {
        /// Match letters in the pattern independent of case.
        const CASE_INSENSITIVE = 1;
        /// Ignore whitespace and `#`-prefixed comments in the pattern.
        const ALLOW_COMMENTS_AND_WHITESPACE = 1 << 1;
        /// Treat the entire pattern as a literal string.
        const IGNORE_METACHARACTERS = 1 << 2;
        /// Allow `.` to match any character, including line separators.
        const DOT_MATCHES_LINE_SEPARATORS = 1 << 3;
        /// Allow `^` and `$` to match the start and end of lines.
        const ANCHORS_MATCH_LINES = 1 << 4;
        /// Treat only `\n` as a line separator.
        const USE_UNIX_LINE_SEPARATORS = 1 << 5;
        /// Use Unicode-style word boundaries instead of the traditional `\w`/`\W` transition.
        const USE_UNICODE_WORD_BOUNDARIES = 1 << 6;
    }
}

impl Default for RegexOptions {
    fn default() -> Self {
        RegexOptions::CASE_INSENSITIVE
    }
}

/// Flags that can change in the middle of a pattern through `(?imsxw-imsxw)`.
/// The parser carries one of these per group scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_all: bool,
    pub extended: bool,
    pub unicode_word: bool,
}

impl Flags {
    pub fn from_options(options: RegexOptions) -> Self {
        Self {
            case_insensitive: options.contains(RegexOptions::CASE_INSENSITIVE),
            multi_line: options.contains(RegexOptions::ANCHORS_MATCH_LINES),
            dot_all: options.contains(RegexOptions::DOT_MATCHES_LINE_SEPARATORS),
            extended: options.contains(RegexOptions::ALLOW_COMMENTS_AND_WHITESPACE),
            unicode_word: options.contains(RegexOptions::USE_UNICODE_WORD_BOUNDARIES),
        }
    }

    /// Apply an inline flag letter. Returns `false` for an unknown letter.
    pub fn set(&mut self, letter: char, on: bool) -> bool {
        match letter {
            'i' => self.case_insensitive = on,
            'm' => self.multi_line = on,
            's' => self.dot_all = on,
            'x' => self.extended = on,
            'w' => self.unicode_word = on,
            _ => return false,
        }
        true
    }
}

/// Resource limits: parser nesting at compile time, the step budget while matching.
#[derive(Debug, Clone)]
pub struct MatchLimits {
    /// Maximum number of VM steps per search call. `None` means unbounded.
    pub step_budget: Option<u64>,
    /// Maximum group / class nesting depth accepted at compile time.
    pub max_nesting: usize,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            step_budget: DEFAULT_STEP_BUDGET,
            max_nesting: MAX_NESTING,
        }
    }
}

impl MatchLimits {
    pub fn with_step_budget(mut self, steps: u64) -> Self {
        self.step_budget = Some(steps);
        self
    }
}

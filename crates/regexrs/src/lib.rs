// Regular expression engine
// Pattern compiler, backtracking match engine, match iterator and replace/split.

#[cfg(test)]
mod test;

pub mod compiler;
pub mod engine;
pub mod error;
pub mod limits;
pub mod matches;
pub mod options;
pub mod regex;
pub mod transform;

pub use error::{CompileError, CompileResult, ErrorKind, MatchError};
pub use matches::{GroupRange, Groups, Match, Matches};
pub use options::{MatchLimits, RegexOptions};
pub use regex::{Regex, RegexBuilder};
pub use transform::{Replacement, Template};

//! Centralized engine limits.
//!
//! Every magic number that bounds compilation or matching lives here
//! so the limits can be tuned in one place.

// ===== Compiler =====

/// Maximum group / class nesting depth accepted by the parser.
/// Bounds the recursion of the parser and of the code generator.
pub const MAX_NESTING: usize = 250;

/// Largest bound accepted in a counted repetition `{m,n}`.
pub const MAX_REPETITION: u32 = 1000;

/// Maximum number of instructions in a compiled program.
/// Counted repetitions are expanded, so this also caps `(...){1000}{1000}`-style blowups.
pub const MAX_PROGRAM_LEN: usize = 1 << 20;

// ===== Matcher =====

/// Default step budget: unbounded.
pub const DEFAULT_STEP_BUDGET: Option<u64> = None;


// Pattern compiler
// pattern text -> parser -> Node tree -> codegen -> Program

pub mod ast;
pub mod class;
pub mod codegen;
pub mod parser;
pub mod program;

pub use program::{Inst, Program};

use crate::error::CompileResult;
use crate::options::{MatchLimits, RegexOptions};

/// Compile a pattern into an executable program.
pub fn compile(
    pattern: &str,
    options: RegexOptions,
    limits: &MatchLimits,
) -> CompileResult<Program> {
    let parsed = parser::parse_pattern(pattern, options, limits.max_nesting)?;
    let program = codegen::generate(&parsed, options)?;
    log::debug!(
        "compiled {:?} ({:?}): {} groups, {} instructions, literal={}",
        pattern,
        options,
        program.groups,
        program.insts.len(),
        program.literal.is_some()
    );
    log::trace!("program for {:?}:\n{}", pattern, program);
    Ok(program)
}

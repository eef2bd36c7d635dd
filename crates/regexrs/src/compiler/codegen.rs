// Code generation
// Lowers a `Node` tree into a flat `Program`.
//
// Counted repetitions are expanded into copies of their body. Unbounded loops
// whose body can match empty get a Mark/Progress register pair: an iteration
// which consumed nothing leaves the loop instead of repeating.

use super::ast::{Look, Node, RepeatKind};
use super::class::fold;
use super::parser::Parsed;
use super::program::{Inst, InstPtr, Program};
use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::limits::MAX_PROGRAM_LEN;
use crate::options::RegexOptions;

pub fn generate(parsed: &Parsed, options: RegexOptions) -> CompileResult<Program> {
    let mut cg = Codegen {
        insts: Vec::new(),
        classes: Vec::new(),
        slots: (parsed.groups + 1) * 2,
        marks: 0,
    };
    cg.push(Inst::Save(0))?;
    cg.emit(&parsed.node)?;
    cg.push(Inst::Save(1))?;
    cg.push(Inst::Match)?;

    Ok(Program {
        insts: cg.insts,
        classes: cg.classes,
        groups: parsed.groups,
        registers: cg.slots + cg.marks,
        unix_lines: options.contains(RegexOptions::USE_UNIX_LINE_SEPARATORS),
        anchored_start: starts_with_text_anchor(&parsed.node),
        first_char: first_char(&parsed.node),
        literal: parsed.node.as_literal(),
    })
}

struct Codegen {
    insts: Vec<Inst>,
    classes: Vec<super::class::CharSet>,
    slots: usize,
    marks: usize,
}

impl Codegen {
    #[inline]
    fn pc(&self) -> InstPtr {
        self.insts.len()
    }

    fn push(&mut self, inst: Inst) -> CompileResult<InstPtr> {
        if self.insts.len() >= MAX_PROGRAM_LEN {
            return Err(CompileError::new(ErrorKind::PatternTooLarge, 0));
        }
        self.insts.push(inst);
        Ok(self.insts.len() - 1)
    }

    fn alloc_mark(&mut self) -> usize {
        self.marks += 1;
        self.slots + self.marks - 1
    }

    fn emit(&mut self, node: &Node) -> CompileResult<()> {
        match node {
            Node::Empty => {}
            Node::Literal { c, fold: true } => {
                self.push(Inst::CharFold(fold(*c)))?;
            }
            Node::Literal { c, fold: false } => {
                self.push(Inst::Char(*c))?;
            }
            Node::Any { dot_all } => {
                self.push(if *dot_all { Inst::AnyAll } else { Inst::Any })?;
            }
            Node::Class { set, fold } => {
                self.classes.push(set.clone());
                let set = self.classes.len() - 1;
                self.push(Inst::Class { set, fold: *fold })?;
            }
            Node::Look(look) => {
                self.push(Inst::Look(*look))?;
            }
            Node::Group {
                index: Some(index),
                node,
            } => {
                self.push(Inst::Save(index * 2))?;
                self.emit(node)?;
                self.push(Inst::Save(index * 2 + 1))?;
            }
            Node::Group { index: None, node } => self.emit(node)?,
            Node::Concat(nodes) => {
                for node in nodes {
                    self.emit(node)?;
                }
            }
            Node::Alternate(alternatives) => self.emit_alternation(alternatives)?,
            Node::Repeat {
                node,
                min,
                max,
                kind,
            } => self.emit_repeat(node, *min, *max, *kind)?,
            Node::Atomic(node) => self.emit_atomic(node)?,
            Node::LookAround {
                node,
                behind,
                negate,
            } => {
                let max_len = if *behind { node.max_width() } else { None };
                let at = self.push(Inst::LookAround {
                    body: 0,
                    next: 0,
                    behind: *behind,
                    negate: *negate,
                    max_len,
                })?;
                self.emit(node)?;
                self.push(Inst::SubMatch)?;
                let next = self.pc();
                self.insts[at] = Inst::LookAround {
                    body: at + 1,
                    next,
                    behind: *behind,
                    negate: *negate,
                    max_len,
                };
            }
            Node::BackRef { group, fold } => {
                self.push(Inst::BackRef {
                    group: *group,
                    fold: *fold,
                })?;
            }
            Node::UnresolvedBackRef { offset, .. } => {
                // resolve_backrefs runs before code generation
                return Err(CompileError::new(ErrorKind::InvalidBackReference(0), *offset));
            }
        }
        Ok(())
    }

    fn emit_alternation(&mut self, alternatives: &[Node]) -> CompileResult<()> {
        let Some((last, rest)) = alternatives.split_last() else {
            return Ok(());
        };
        let mut jumps = Vec::with_capacity(rest.len());
        for alternative in rest {
            let split = self.push(Inst::Split { first: 0, second: 0 })?;
            self.emit(alternative)?;
            jumps.push(self.push(Inst::Jump(0))?);
            let second = self.pc();
            self.insts[split] = Inst::Split {
                first: split + 1,
                second,
            };
        }
        self.emit(last)?;
        let end = self.pc();
        for jump in jumps {
            self.insts[jump] = Inst::Jump(end);
        }
        Ok(())
    }

    fn emit_atomic(&mut self, node: &Node) -> CompileResult<()> {
        let at = self.push(Inst::Atomic { body: 0, next: 0 })?;
        self.emit(node)?;
        self.push(Inst::SubMatch)?;
        let next = self.pc();
        self.insts[at] = Inst::Atomic { body: at + 1, next };
        Ok(())
    }

    fn emit_repeat(
        &mut self,
        node: &Node,
        min: u32,
        max: Option<u32>,
        kind: RepeatKind,
    ) -> CompileResult<()> {
        if kind == RepeatKind::Possessive {
            let greedy = Node::Repeat {
                node: Box::new(node.clone()),
                min,
                max,
                kind: RepeatKind::Greedy,
            };
            return self.emit_atomic(&greedy);
        }
        let greedy = kind == RepeatKind::Greedy;
        let split = |body: InstPtr, exit: InstPtr| {
            if greedy {
                Inst::Split {
                    first: body,
                    second: exit,
                }
            } else {
                Inst::Split {
                    first: exit,
                    second: body,
                }
            }
        };

        for _ in 0..min {
            self.emit(node)?;
        }

        match max {
            None => {
                let mark = if node.can_match_empty() {
                    Some(self.alloc_mark())
                } else {
                    None
                };
                let head = self.push(Inst::Split { first: 0, second: 0 })?;
                if let Some(mark) = mark {
                    self.push(Inst::Mark(mark))?;
                }
                self.emit(node)?;
                let progress = match mark {
                    Some(mark) => Some((self.push(Inst::Progress { mark, exit: 0 })?, mark)),
                    None => None,
                };
                self.push(Inst::Jump(head))?;
                let exit = self.pc();
                self.insts[head] = split(head + 1, exit);
                if let Some((at, mark)) = progress {
                    self.insts[at] = Inst::Progress { mark, exit };
                }
            }
            Some(max) => {
                let mut heads = Vec::with_capacity(max.saturating_sub(min) as usize);
                for _ in min..max {
                    heads.push(self.push(Inst::Split { first: 0, second: 0 })?);
                    self.emit(node)?;
                }
                let exit = self.pc();
                for head in heads {
                    self.insts[head] = split(head + 1, exit);
                }
            }
        }
        Ok(())
    }
}

/// Whether every match must begin at offset 0.
fn starts_with_text_anchor(node: &Node) -> bool {
    match node {
        Node::Look(Look::StartText) => true,
        Node::Concat(nodes) => nodes.first().is_some_and(starts_with_text_anchor),
        Node::Group { node, .. } | Node::Atomic(node) => starts_with_text_anchor(node),
        Node::Alternate(alternatives) => alternatives.iter().all(starts_with_text_anchor),
        _ => false,
    }
}

/// The code point every match starts with, when there is exactly one.
fn first_char(node: &Node) -> Option<char> {
    match node {
        Node::Literal { c, fold: false } => Some(*c),
        Node::Concat(nodes) => {
            for node in nodes {
                match node {
                    Node::Look(_) => continue,
                    node => return first_char(node),
                }
            }
            None
        }
        Node::Group { node, .. } | Node::Atomic(node) => first_char(node),
        Node::Repeat { node, min, .. } if *min > 0 => first_char(node),
        Node::Alternate(alternatives) => {
            let (first, rest) = alternatives.split_first()?;
            let c = first_char(first)?;
            rest.iter().all(|alt| first_char(alt) == Some(c)).then_some(c)
        }
        _ => None,
    }
}

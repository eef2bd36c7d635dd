// Backtracking VM
//
// Executes a `Program` against a decoded subject:
// - one explicit backtrack stack holds pending alternatives and register undo records
// - register writes push their old value, so unwinding the stack restores captures
// - atomic groups and lookaround run as nested `run` calls; their alternatives are
//   dropped on success while their undo records stay on the outer stack
// - every executed instruction counts against the optional step budget

use super::look::{self, is_line_terminator};
use crate::compiler::class::fold;
use crate::compiler::program::{Inst, InstPtr, Program};

/// Capture slots of one match: `slots[2g]..slots[2g+1]` is group `g`.
pub type Slots = Vec<Option<usize>>;

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Resume at `pc` with the subject position `pos`.
    Alt { pc: InstPtr, pos: usize },
    /// Put `old` back into register `reg`.
    Restore { reg: usize, old: Option<usize> },
}

pub struct Vm<'p, 's> {
    prog: &'p Program,
    chars: &'s [char],
    regs: Vec<Option<usize>>,
    stack: Vec<Frame>,
    steps: u64,
    budget: Option<u64>,
    exhausted: bool,
}

impl<'p, 's> Vm<'p, 's> {
    pub fn new(prog: &'p Program, chars: &'s [char], budget: Option<u64>) -> Self {
        Self {
            prog,
            chars,
            regs: vec![None; prog.registers],
            stack: Vec::new(),
            steps: 0,
            budget,
            exhausted: false,
        }
    }

    /// Steps executed so far across every attempt made with this VM.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether the step budget ran out. Once set, every attempt fails.
    #[inline]
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// Try to match with the match starting exactly at `start`.
    pub fn exec_at(&mut self, start: usize) -> Option<Slots> {
        if self.exhausted {
            return None;
        }
        self.regs.fill(None);
        self.stack.clear();
        self.run(0, start, None)?;
        Some(self.regs[..self.prog.slots()].to_vec())
    }

    #[inline]
    fn tick(&mut self) -> bool {
        self.steps += 1;
        if let Some(budget) = self.budget {
            if self.steps > budget {
                self.exhausted = true;
                return false;
            }
        }
        true
    }

    #[inline]
    fn set_reg(&mut self, reg: usize, pos: usize) {
        self.stack.push(Frame::Restore {
            reg,
            old: self.regs[reg],
        });
        self.regs[reg] = Some(pos);
    }

    /// Pop frames down to `base`, restoring registers, until an alternative is found.
    fn backtrack(&mut self, base: usize) -> Option<(InstPtr, usize)> {
        while self.stack.len() > base {
            match self.stack.pop()? {
                Frame::Alt { pc, pos } => return Some((pc, pos)),
                Frame::Restore { reg, old } => self.regs[reg] = old,
            }
        }
        None
    }

    /// Pop every frame above `base`, restoring registers.
    fn unwind(&mut self, base: usize) {
        while self.stack.len() > base {
            if let Some(Frame::Restore { reg, old }) = self.stack.pop() {
                self.regs[reg] = old;
            }
        }
    }

    /// Drop pending alternatives above `base`; keep the undo records.
    fn commit(&mut self, base: usize) {
        let mut keep = base;
        for i in base..self.stack.len() {
            if let Frame::Restore { .. } = self.stack[i] {
                self.stack[keep] = self.stack[i];
                keep += 1;
            }
        }
        self.stack.truncate(keep);
    }

    /// Run from `pc` at `pos` until `Match`/`SubMatch`. With `end_at`, the run only
    /// succeeds when it finishes exactly there (lookbehind).
    fn run(&mut self, mut pc: InstPtr, mut pos: usize, end_at: Option<usize>) -> Option<usize> {
        let base = self.stack.len();
        let prog = self.prog;
        let chars = self.chars;
        loop {
            if !self.tick() {
                self.unwind(base);
                return None;
            }
            let ok = match prog.insts[pc] {
                Inst::Char(c) => {
                    let ok = chars.get(pos) == Some(&c);
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::CharFold(folded) => {
                    let ok = chars.get(pos).is_some_and(|&c| fold(c) == folded);
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::Any => {
                    let ok = chars
                        .get(pos)
                        .is_some_and(|&c| !is_line_terminator(c, prog.unix_lines));
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::AnyAll => {
                    let ok = pos < chars.len();
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::Class { set, fold } => {
                    let ok = chars
                        .get(pos)
                        .is_some_and(|&c| prog.classes[set].matches(c, fold));
                    if ok {
                        pos += 1;
                        pc += 1;
                    }
                    ok
                }
                Inst::Look(kind) => {
                    let ok = look::check(kind, chars, pos, prog.unix_lines);
                    if ok {
                        pc += 1;
                    }
                    ok
                }
                Inst::Save(reg) | Inst::Mark(reg) => {
                    self.set_reg(reg, pos);
                    pc += 1;
                    true
                }
                Inst::Progress { mark, exit } => {
                    pc = if self.regs[mark] == Some(pos) { exit } else { pc + 1 };
                    true
                }
                Inst::Split { first, second } => {
                    self.stack.push(Frame::Alt { pc: second, pos });
                    pc = first;
                    true
                }
                Inst::Jump(target) => {
                    pc = target;
                    true
                }
                Inst::BackRef { group, fold } => match self.backref(group, fold, pos) {
                    Some(end) => {
                        pos = end;
                        pc += 1;
                        true
                    }
                    None => false,
                },
                Inst::Atomic { body, next } => match self.run(body, pos, None) {
                    Some(end) => {
                        pos = end;
                        pc = next;
                        true
                    }
                    None => false,
                },
                Inst::LookAround {
                    body,
                    next,
                    behind,
                    negate,
                    max_len,
                } => {
                    let mark = self.stack.len();
                    let found = if behind {
                        self.look_behind(body, pos, max_len)
                    } else {
                        self.run(body, pos, None).is_some()
                    };
                    if negate && found {
                        self.unwind(mark);
                    }
                    let ok = found != negate;
                    if ok {
                        pc = next;
                    }
                    ok
                }
                Inst::SubMatch | Inst::Match => {
                    let ok = end_at.is_none_or(|end| end == pos);
                    if ok {
                        self.commit(base);
                        return Some(pos);
                    }
                    ok
                }
            };

            if self.exhausted {
                self.unwind(base);
                return None;
            }
            if !ok {
                match self.backtrack(base) {
                    Some((next_pc, next_pos)) => {
                        pc = next_pc;
                        pos = next_pos;
                    }
                    None => return None,
                }
            }
        }
    }

    fn look_behind(&mut self, body: InstPtr, pos: usize, max_len: Option<usize>) -> bool {
        let lowest = max_len.map_or(0, |len| pos.saturating_sub(len));
        for start in (lowest..=pos).rev() {
            if self.run(body, start, Some(pos)).is_some() {
                return true;
            }
            if self.exhausted {
                return false;
            }
        }
        false
    }

    /// Compare the text of `group` at `pos`. A group that did not participate fails.
    fn backref(&self, group: usize, fold_case: bool, pos: usize) -> Option<usize> {
        let start = (*self.regs.get(group * 2)?)?;
        let end = (*self.regs.get(group * 2 + 1)?)?;
        if end < start {
            return None;
        }
        let len = end - start;
        let captured = self.chars.get(start..end)?;
        let here = self.chars.get(pos..pos + len)?;
        let same = if fold_case {
            captured.iter().zip(here).all(|(&a, &b)| fold(a) == fold(b))
        } else {
            captured == here
        };
        same.then_some(pos + len)
    }
}

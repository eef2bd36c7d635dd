// Pattern parser
// Parses pattern text into a `Node` tree.
//
// The pattern is walked as `&[char]` with index arithmetic. Every error offset
// is a code-point index into the pattern. Capturing groups are numbered by the
// position of their opening parenthesis, left to right.

use smol_str::SmolStr;

use super::ast::{Look, Node, RepeatKind};
use super::class::{CharSet, ClassItem, PerlClass, PosixClass, Property, has_case};
use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::limits::MAX_REPETITION;
use crate::options::{Flags, RegexOptions};

/// Result of parsing: the tree plus the number of capturing groups.
#[derive(Debug)]
pub struct Parsed {
    pub node: Node,
    pub groups: usize,
}

/// Parse a pattern string.
pub fn parse_pattern(
    pattern: &str,
    options: RegexOptions,
    max_nesting: usize,
) -> CompileResult<Parsed> {
    let chars: Vec<char> = pattern.chars().collect();
    let flags = Flags::from_options(options);

    if options.contains(RegexOptions::IGNORE_METACHARACTERS) {
        let node = Node::Concat(
            chars
                .iter()
                .map(|&c| Node::Literal {
                    c,
                    fold: flags.case_insensitive && has_case(c),
                })
                .collect(),
        );
        return Ok(Parsed { node, groups: 0 });
    }

    let mut parser = Parser {
        chars: &chars,
        pos: 0,
        flags,
        groups: 0,
        depth: 0,
        max_nesting,
    };
    let node = parser.parse_alternation()?;
    if parser.pos < chars.len() {
        // parse_alternation only stops early on ')'
        return Err(CompileError::new(ErrorKind::UnmatchedCloseParen, parser.pos));
    }
    let node = parser.resolve_backrefs(node)?;
    Ok(Parsed {
        node,
        groups: parser.groups,
    })
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    flags: Flags,
    groups: usize,
    depth: usize,
    max_nesting: usize,
}

/// What a single escape sequence stands for.
enum Escape {
    Char(char),
    Item(ClassItem),
    Look(Look),
    BackRef(SmolStr),
    /// `\Q`: the following text up to `\E` is literal.
    Quote,
    /// A stray `\E`.
    Nothing,
}

/// What one step of `parse_atom` produced.
enum Atom {
    Node(Node),
    /// `\Q...\E` text; a following quantifier binds to the last code point only.
    Quoted(Vec<char>),
    /// Flag setters, comments and stray `\E` produce no node.
    Nothing,
}

enum ClassAtom {
    Char(char),
    Item(ClassItem),
}

impl<'a> Parser<'a> {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    #[inline]
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error<T>(&self, kind: ErrorKind, offset: usize) -> CompileResult<T> {
        Err(CompileError::new(kind, offset))
    }

    fn enter(&mut self, offset: usize) -> CompileResult<()> {
        self.depth += 1;
        if self.depth > self.max_nesting {
            return self.error(ErrorKind::NestingTooDeep, offset);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn literal(&self, c: char) -> Node {
        Node::Literal {
            c,
            fold: self.flags.case_insensitive && has_case(c),
        }
    }

    /// In extended mode, skip whitespace and `#` comments.
    fn skip_extended(&mut self) {
        if !self.flags.extended {
            return;
        }
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    // ======================== Structure ========================

    fn parse_alternation(&mut self) -> CompileResult<Node> {
        let mut alternatives = vec![self.parse_concat()?];
        while self.eat('|') {
            alternatives.push(self.parse_concat()?);
        }
        if alternatives.len() == 1 {
            Ok(alternatives.swap_remove(0))
        } else {
            Ok(Node::Alternate(alternatives))
        }
    }

    fn parse_concat(&mut self) -> CompileResult<Node> {
        let mut seq = Vec::new();
        loop {
            self.skip_extended();
            match self.peek() {
                None | Some('|') | Some(')') => break,
                _ => {}
            }
            match self.parse_atom()? {
                Atom::Node(node) => {
                    let node = self.parse_quantifier(node)?;
                    seq.push(node);
                }
                Atom::Quoted(mut chars) => {
                    let Some(last) = chars.pop() else { continue };
                    for c in chars {
                        seq.push(self.literal(c));
                    }
                    let node = self.literal(last);
                    let node = self.parse_quantifier(node)?;
                    seq.push(node);
                }
                Atom::Nothing => {}
            }
        }
        Ok(match seq.len() {
            0 => Node::Empty,
            1 => seq.swap_remove(0),
            _ => Node::Concat(seq),
        })
    }

    fn parse_atom(&mut self) -> CompileResult<Atom> {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Atom::Nothing);
        };
        let node = match c {
            '(' => return self.parse_group(),
            '[' => {
                let set = self.parse_class()?;
                Node::Class {
                    set,
                    fold: self.flags.case_insensitive,
                }
            }
            '.' => {
                self.pos += 1;
                Node::Any {
                    dot_all: self.flags.dot_all,
                }
            }
            '^' => {
                self.pos += 1;
                Node::Look(if self.flags.multi_line {
                    Look::StartLine
                } else {
                    Look::StartText
                })
            }
            '$' => {
                self.pos += 1;
                Node::Look(if self.flags.multi_line {
                    Look::EndLine
                } else {
                    Look::EndTextOptionalTerminator
                })
            }
            '\\' => return self.parse_escape_atom(),
            '*' | '+' | '?' => return self.error(ErrorKind::NothingToRepeat, start),
            '{' if self.scan_bounds().is_some() => {
                return self.error(ErrorKind::NothingToRepeat, start);
            }
            c => {
                self.pos += 1;
                self.literal(c)
            }
        };
        Ok(Atom::Node(node))
    }

    fn parse_escape_atom(&mut self) -> CompileResult<Atom> {
        let start = self.pos;
        let node = match self.parse_escape(false)? {
            Escape::Char(c) => self.literal(c),
            Escape::Item(item) => Node::Class {
                set: CharSet::single(item),
                fold: self.flags.case_insensitive,
            },
            Escape::Look(look) => Node::Look(look),
            Escape::BackRef(digits) => Node::UnresolvedBackRef {
                digits,
                fold: self.flags.case_insensitive,
                offset: start,
            },
            Escape::Quote => return Ok(Atom::Quoted(self.read_quoted())),
            Escape::Nothing => return Ok(Atom::Nothing),
        };
        Ok(Atom::Node(node))
    }

    /// Read literal text up to `\E` or the end of the pattern.
    fn read_quoted(&mut self) -> Vec<char> {
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            if c == '\\' && self.peek_at(1) == Some('E') {
                self.pos += 2;
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn parse_group(&mut self) -> CompileResult<Atom> {
        let open = self.pos;
        self.pos += 1;
        self.enter(open)?;
        let saved_flags = self.flags;

        let node = if self.eat('?') {
            let kind_at = self.pos;
            match self.peek() {
                Some(':') => {
                    self.pos += 1;
                    let inner = self.parse_alternation()?;
                    Node::Group {
                        index: None,
                        node: Box::new(inner),
                    }
                }
                Some('>') => {
                    self.pos += 1;
                    Node::Atomic(Box::new(self.parse_alternation()?))
                }
                Some('=') | Some('!') => {
                    let negate = self.peek() == Some('!');
                    self.pos += 1;
                    Node::LookAround {
                        node: Box::new(self.parse_alternation()?),
                        behind: false,
                        negate,
                    }
                }
                Some('<') if matches!(self.peek_at(1), Some('=') | Some('!')) => {
                    let negate = self.peek_at(1) == Some('!');
                    self.pos += 2;
                    Node::LookAround {
                        node: Box::new(self.parse_alternation()?),
                        behind: true,
                        negate,
                    }
                }
                Some('<') => {
                    self.pos += 1;
                    self.skip_group_name(kind_at)?;
                    self.parse_capture()?
                }
                Some('P') if self.peek_at(1) == Some('<') => {
                    self.pos += 2;
                    self.skip_group_name(kind_at)?;
                    self.parse_capture()?
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == ')' {
                            break;
                        }
                        self.pos += 1;
                    }
                    if !self.eat(')') {
                        return self.error(ErrorKind::UnmatchedOpenParen, open);
                    }
                    self.flags = saved_flags;
                    self.leave();
                    return Ok(Atom::Nothing);
                }
                Some(_) => {
                    // (?flags) or (?flags:...)
                    let mut on = true;
                    loop {
                        match self.peek() {
                            Some('-') if on => {
                                on = false;
                                self.pos += 1;
                            }
                            Some(')') => {
                                // Flags stay in effect until the end of the enclosing group.
                                self.pos += 1;
                                self.leave();
                                return Ok(Atom::Nothing);
                            }
                            Some(':') => {
                                self.pos += 1;
                                break;
                            }
                            Some(c) => {
                                if !self.flags.set(c, on) {
                                    return self.error(ErrorKind::InvalidFlag(c), self.pos);
                                }
                                self.pos += 1;
                            }
                            None => return self.error(ErrorKind::UnmatchedOpenParen, open),
                        }
                    }
                    let inner = self.parse_alternation()?;
                    Node::Group {
                        index: None,
                        node: Box::new(inner),
                    }
                }
                None => return self.error(ErrorKind::UnmatchedOpenParen, open),
            }
        } else {
            self.parse_capture()?
        };

        if !self.eat(')') {
            return self.error(ErrorKind::UnmatchedOpenParen, open);
        }
        self.flags = saved_flags;
        self.leave();
        Ok(Atom::Node(node))
    }

    fn parse_capture(&mut self) -> CompileResult<Node> {
        self.groups += 1;
        let index = self.groups;
        let inner = self.parse_alternation()?;
        Ok(Node::Group {
            index: Some(index),
            node: Box::new(inner),
        })
    }

    /// Skip an inline `name>`. Inline names are accepted but never registered;
    /// group names are supplied out-of-band.
    fn skip_group_name(&mut self, kind_at: usize) -> CompileResult<()> {
        let name_start = self.pos;
        while let Some(c) = self.peek() {
            if c == '>' {
                break;
            }
            let first = self.pos == name_start;
            if !(c.is_alphanumeric() || c == '_') || (first && c.is_ascii_digit()) {
                return self.error(ErrorKind::InvalidGroupSyntax, kind_at);
            }
            self.pos += 1;
        }
        if self.pos == name_start || !self.eat('>') {
            return self.error(ErrorKind::InvalidGroupSyntax, kind_at);
        }
        Ok(())
    }

    // ======================== Quantifiers ========================

    /// Scan `{n}`, `{n,}` or `{n,m}` at the current position without consuming it.
    /// Returns `(min, max, end)` with `end` the index past `}`.
    fn scan_bounds(&self) -> Option<(u64, Option<u64>, usize)> {
        let mut i = self.pos;
        if self.chars.get(i) != Some(&'{') {
            return None;
        }
        i += 1;
        let read_number = |i: &mut usize| -> Option<u64> {
            let start = *i;
            let mut value: u64 = 0;
            while let Some(d) = self.chars.get(*i).and_then(|c| c.to_digit(10)) {
                value = value.saturating_mul(10).saturating_add(d as u64);
                *i += 1;
            }
            if *i == start { None } else { Some(value) }
        };
        let min = read_number(&mut i)?;
        let max = if self.chars.get(i) == Some(&',') {
            i += 1;
            read_number(&mut i)
        } else {
            Some(min)
        };
        if self.chars.get(i) != Some(&'}') {
            return None;
        }
        Some((min, max, i + 1))
    }

    fn parse_quantifier(&mut self, atom: Node) -> CompileResult<Node> {
        self.skip_extended();
        let at = self.pos;
        let (min, max) = match self.peek() {
            Some('*') => {
                self.pos += 1;
                (0, None)
            }
            Some('+') => {
                self.pos += 1;
                (1, None)
            }
            Some('?') => {
                self.pos += 1;
                (0, Some(1))
            }
            Some('{') => {
                let Some((min, max, end)) = self.scan_bounds() else {
                    return Ok(atom);
                };
                if min > MAX_REPETITION as u64 || max.is_some_and(|m| m > MAX_REPETITION as u64) {
                    return self.error(ErrorKind::RepetitionTooLarge, at);
                }
                if max.is_some_and(|m| m < min) {
                    return self.error(ErrorKind::InvalidRepetition, at);
                }
                self.pos = end;
                (min as u32, max.map(|m| m as u32))
            }
            _ => return Ok(atom),
        };
        let kind = if self.eat('?') {
            RepeatKind::Lazy
        } else if self.eat('+') {
            RepeatKind::Possessive
        } else {
            RepeatKind::Greedy
        };

        self.skip_extended();
        match self.peek() {
            Some('*') | Some('+') | Some('?') => {
                return self.error(ErrorKind::NothingToRepeat, self.pos);
            }
            Some('{') if self.scan_bounds().is_some() => {
                return self.error(ErrorKind::NothingToRepeat, self.pos);
            }
            _ => {}
        }

        Ok(Node::Repeat {
            node: Box::new(atom),
            min,
            max,
            kind,
        })
    }

    // ======================== Escapes ========================

    /// Parse an escape sequence starting at `\`.
    fn parse_escape(&mut self, in_class: bool) -> CompileResult<Escape> {
        let start = self.pos;
        self.pos += 1;
        let Some(c) = self.peek() else {
            return self.error(ErrorKind::TrailingBackslash, start);
        };
        self.pos += 1;

        let perl = |class: PerlClass, negated: bool| Escape::Item(ClassItem::Perl { class, negated });
        let escape = match c {
            'd' => perl(PerlClass::Digit, false),
            'D' => perl(PerlClass::Digit, true),
            'w' => perl(PerlClass::Word, false),
            'W' => perl(PerlClass::Word, true),
            's' => perl(PerlClass::Space, false),
            'S' => perl(PerlClass::Space, true),
            'h' => perl(PerlClass::HorizontalSpace, false),
            'H' => perl(PerlClass::HorizontalSpace, true),
            'v' => perl(PerlClass::VerticalSpace, false),
            'V' => perl(PerlClass::VerticalSpace, true),
            'p' | 'P' => self.parse_property(c == 'P', start)?,
            't' => Escape::Char('\t'),
            'n' => Escape::Char('\n'),
            'r' => Escape::Char('\r'),
            'f' => Escape::Char('\u{0C}'),
            'a' => Escape::Char('\u{07}'),
            'e' => Escape::Char('\u{1B}'),
            '0' => {
                let mut value = 0u32;
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.pos += 1;
                        }
                        None => break,
                    }
                }
                Escape::Char(char::from_u32(value).unwrap_or('\0'))
            }
            'x' => Escape::Char(self.parse_hex_escape(start)?),
            'u' => Escape::Char(self.parse_fixed_hex(4, start)?),
            'U' => Escape::Char(self.parse_fixed_hex(8, start)?),
            'c' => {
                let Some(ctl) = self.peek().filter(char::is_ascii) else {
                    return self.error(ErrorKind::InvalidHexEscape, start);
                };
                self.pos += 1;
                Escape::Char(((ctl.to_ascii_uppercase() as u8) ^ 0x40) as char)
            }
            'Q' => Escape::Quote,
            'E' => Escape::Nothing,
            'b' if in_class => Escape::Char('\u{08}'),
            'A' if !in_class => Escape::Look(Look::StartText),
            'z' if !in_class => Escape::Look(Look::EndText),
            'Z' if !in_class => Escape::Look(Look::EndTextOptionalTerminator),
            'b' if !in_class => Escape::Look(Look::WordBoundary {
                unicode: self.flags.unicode_word,
            }),
            'B' if !in_class => Escape::Look(Look::NotWordBoundary {
                unicode: self.flags.unicode_word,
            }),
            '1'..='9' if !in_class => {
                let mut digits = String::from(c);
                while let Some(d) = self.peek().filter(char::is_ascii_digit) {
                    digits.push(d);
                    self.pos += 1;
                }
                Escape::BackRef(SmolStr::new(digits))
            }
            c if c.is_ascii_alphanumeric() => {
                return self.error(ErrorKind::InvalidEscape(c), start);
            }
            c => Escape::Char(c),
        };
        Ok(escape)
    }

    fn parse_property(&mut self, negated: bool, start: usize) -> CompileResult<Escape> {
        let name: String = if self.eat('{') {
            let name_start = self.pos;
            while let Some(c) = self.peek() {
                if c == '}' {
                    break;
                }
                self.pos += 1;
            }
            if !self.eat('}') {
                return self.error(ErrorKind::InvalidEscape('p'), start);
            }
            self.chars[name_start..self.pos - 1].iter().collect()
        } else {
            match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.pos += 1;
                    c.to_string()
                }
                _ => return self.error(ErrorKind::InvalidEscape('p'), start),
            }
        };
        let (name, negated) = match name.strip_prefix('^') {
            Some(rest) => (rest.to_string(), !negated),
            None => (name, negated),
        };
        let prop = Property::from_name(&name).map_err(|kind| CompileError::new(kind, start))?;
        Ok(Escape::Item(ClassItem::Property { prop, negated }))
    }

    /// `\xhh` (one or two digits) or `\x{h...}`.
    fn parse_hex_escape(&mut self, start: usize) -> CompileResult<char> {
        let mut value: u32 = 0;
        if self.eat('{') {
            let digits_start = self.pos;
            while let Some(d) = self.peek().and_then(|c| c.to_digit(16)) {
                value = value.saturating_mul(16).saturating_add(d);
                self.pos += 1;
            }
            if self.pos == digits_start || self.pos - digits_start > 6 || !self.eat('}') {
                return self.error(ErrorKind::InvalidHexEscape, start);
            }
        } else {
            let digits_start = self.pos;
            while self.pos - digits_start < 2 {
                let Some(d) = self.peek().and_then(|c| c.to_digit(16)) else {
                    break;
                };
                value = value * 16 + d;
                self.pos += 1;
            }
            if self.pos == digits_start {
                return self.error(ErrorKind::InvalidHexEscape, start);
            }
        }
        char::from_u32(value).ok_or(CompileError::new(ErrorKind::InvalidHexEscape, start))
    }

    fn parse_fixed_hex(&mut self, count: usize, start: usize) -> CompileResult<char> {
        let mut value: u32 = 0;
        for _ in 0..count {
            let Some(d) = self.peek().and_then(|c| c.to_digit(16)) else {
                return self.error(ErrorKind::InvalidHexEscape, start);
            };
            value = value.saturating_mul(16).saturating_add(d);
            self.pos += 1;
        }
        char::from_u32(value).ok_or(CompileError::new(ErrorKind::InvalidHexEscape, start))
    }

    // ======================== Classes ========================

    /// Parse `[...]` starting at `[`.
    fn parse_class(&mut self) -> CompileResult<CharSet> {
        let open = self.pos;
        self.pos += 1;
        self.enter(open)?;
        let negated = self.eat('^');

        // operands[0] is the union; each later operand follows a `&&`.
        let mut operands: Vec<Vec<ClassItem>> = vec![Vec::new()];
        let mut first = true;
        loop {
            let Some(c) = self.peek() else {
                return self.error(ErrorKind::UnclosedClass, open);
            };
            if c == ']' && !first {
                self.pos += 1;
                break;
            }
            first = false;
            let item_start = self.pos;

            if c == '[' {
                if self.peek_at(1) == Some(':') {
                    if let Some(item) = self.parse_posix_class()? {
                        push_item(&mut operands, item);
                        continue;
                    }
                }
                let nested = self.parse_class()?;
                push_item(&mut operands, ClassItem::Set(Box::new(nested)));
                continue;
            }
            if c == '&' && self.peek_at(1) == Some('&') {
                self.pos += 2;
                operands.push(Vec::new());
                continue;
            }

            let lo = match self.parse_class_atom()? {
                ClassAtom::Char(lo) => lo,
                ClassAtom::Item(item) => {
                    push_item(&mut operands, item);
                    continue;
                }
            };

            let is_range = self.peek() == Some('-') && self.peek_at(1).is_some_and(|n| n != ']');
            if !is_range {
                push_item(&mut operands, ClassItem::Char(lo));
                continue;
            }
            self.pos += 1;
            match self.parse_class_atom()? {
                ClassAtom::Char(hi) => {
                    if hi < lo {
                        return self.error(ErrorKind::InvalidClassRange { start: lo, end: hi }, item_start);
                    }
                    push_item(&mut operands, ClassItem::Range(lo, hi));
                }
                ClassAtom::Item(item) => {
                    // `[a-\d]`: the dash is literal.
                    push_item(&mut operands, ClassItem::Char(lo));
                    push_item(&mut operands, ClassItem::Char('-'));
                    push_item(&mut operands, item);
                }
            }
        }
        self.leave();

        let mut operands = operands.into_iter();
        let items = operands.next().unwrap_or_default();
        let and = operands
            .map(|items| CharSet {
                items,
                and: Vec::new(),
                negated: false,
            })
            .collect();
        Ok(CharSet {
            items,
            and,
            negated,
        })
    }

    fn parse_class_atom(&mut self) -> CompileResult<ClassAtom> {
        let Some(c) = self.peek() else {
            return self.error(ErrorKind::UnclosedClass, self.pos);
        };
        if c != '\\' {
            self.pos += 1;
            return Ok(ClassAtom::Char(c));
        }
        let start = self.pos;
        match self.parse_escape(true)? {
            Escape::Char(c) => Ok(ClassAtom::Char(c)),
            Escape::Item(item) => Ok(ClassAtom::Item(item)),
            Escape::Quote => {
                let quoted = self.read_quoted();
                Ok(ClassAtom::Item(ClassItem::Set(Box::new(CharSet {
                    items: quoted.into_iter().map(ClassItem::Char).collect(),
                    and: Vec::new(),
                    negated: false,
                }))))
            }
            Escape::Nothing => Ok(ClassAtom::Item(ClassItem::Set(Box::default()))),
            Escape::Look(_) | Escape::BackRef(_) => {
                let c = self.chars.get(start + 1).copied().unwrap_or('\\');
                self.error(ErrorKind::InvalidEscape(c), start)
            }
        }
    }

    /// `[:name:]` or `[:^name:]`. Returns `None` (consuming nothing) when the
    /// text is not terminated by `:]`, in which case `[` opens a nested set.
    fn parse_posix_class(&mut self) -> CompileResult<Option<ClassItem>> {
        let start = self.pos;
        let mut end = start + 2;
        while end + 1 < self.chars.len() && !(self.chars[end] == ':' && self.chars[end + 1] == ']') {
            if self.chars[end] == ']' {
                return Ok(None);
            }
            end += 1;
        }
        if end + 1 >= self.chars.len() {
            return Ok(None);
        }
        let raw: String = self.chars[start + 2..end].iter().collect();
        let (name, negated) = match raw.strip_prefix('^') {
            Some(rest) => (rest, true),
            None => (raw.as_str(), false),
        };
        let Some(class) = PosixClass::from_name(name) else {
            return self.error(ErrorKind::UnknownPosixClass(SmolStr::new(name)), start);
        };
        self.pos = end + 2;
        Ok(Some(ClassItem::Posix { class, negated }))
    }

    // ======================== Back references ========================

    /// Replace every `UnresolvedBackRef` now that the group count is known.
    ///
    /// The first digit always belongs to the group number; further digits are
    /// taken only while the number stays within the group count. Leftover
    /// digits are literals.
    fn resolve_backrefs(&self, node: Node) -> CompileResult<Node> {
        let resolved = match node {
            Node::UnresolvedBackRef { .. } => {
                let mut parts = self.split_backref(node)?;
                if parts.len() == 1 {
                    parts.swap_remove(0)
                } else {
                    Node::Concat(parts)
                }
            }
            Node::Group { index, node } => Node::Group {
                index,
                node: Box::new(self.resolve_backrefs(*node)?),
            },
            Node::Concat(nodes) => Node::Concat(self.resolve_all(nodes)?),
            Node::Alternate(nodes) => Node::Alternate(self.resolve_all(nodes)?),
            Node::Repeat {
                node,
                min,
                max,
                kind,
            } => {
                if matches!(*node, Node::UnresolvedBackRef { .. }) {
                    // `\12*` with one group repeats only the trailing `2`.
                    let mut parts = self.split_backref(*node)?;
                    let last = parts.pop().unwrap_or(Node::Empty);
                    parts.push(Node::Repeat {
                        node: Box::new(last),
                        min,
                        max,
                        kind,
                    });
                    if parts.len() == 1 {
                        parts.swap_remove(0)
                    } else {
                        Node::Concat(parts)
                    }
                } else {
                    Node::Repeat {
                        node: Box::new(self.resolve_backrefs(*node)?),
                        min,
                        max,
                        kind,
                    }
                }
            }
            Node::Atomic(node) => Node::Atomic(Box::new(self.resolve_backrefs(*node)?)),
            Node::LookAround {
                node,
                behind,
                negate,
            } => Node::LookAround {
                node: Box::new(self.resolve_backrefs(*node)?),
                behind,
                negate,
            },
            other => other,
        };
        Ok(resolved)
    }

    fn resolve_all(&self, nodes: Vec<Node>) -> CompileResult<Vec<Node>> {
        nodes.into_iter().map(|n| self.resolve_backrefs(n)).collect()
    }

    fn split_backref(&self, node: Node) -> CompileResult<Vec<Node>> {
        let Node::UnresolvedBackRef {
            digits,
            fold,
            offset,
        } = node
        else {
            return Ok(vec![node]);
        };
        let digits: Vec<usize> = digits
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as usize)
            .collect();
        let mut group = digits.first().copied().unwrap_or(0);
        let mut used = 1;
        while used < digits.len() {
            let next = group * 10 + digits[used];
            if next > self.groups {
                break;
            }
            group = next;
            used += 1;
        }
        if group == 0 || group > self.groups {
            return self.error(ErrorKind::InvalidBackReference(group), offset);
        }
        let mut parts = vec![Node::BackRef { group, fold }];
        for &d in &digits[used..] {
            parts.push(Node::Literal {
                c: char::from_digit(d as u32, 10).unwrap_or('0'),
                fold: false,
            });
        }
        Ok(parts)
    }
}

fn push_item(operands: &mut [Vec<ClassItem>], item: ClassItem) {
    if let Some(current) = operands.last_mut() {
        current.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str) -> CompileResult<Parsed> {
        parse_pattern(pattern, RegexOptions::empty(), crate::limits::MAX_NESTING)
    }

    fn kind(pattern: &str) -> ErrorKind {
        parse(pattern).unwrap_err().kind().clone()
    }

    #[test]
    fn test_group_count() {
        assert_eq!(parse("(.+?)([1,2,3]*)(.*)").unwrap().groups, 3);
        assert_eq!(parse("(?:a)(b)(?=c)(?>d)").unwrap().groups, 1);
        assert_eq!(parse("(?<year>\\d+)-(?P<m>\\d+)").unwrap().groups, 2);
        assert_eq!(parse("((a)(b))").unwrap().groups, 3);
    }

    #[test]
    fn test_literal_mode() {
        let parsed =
            parse_pattern("a.(b", RegexOptions::IGNORE_METACHARACTERS, 10).unwrap();
        assert_eq!(parsed.groups, 0);
        assert_eq!(parsed.node.as_literal(), Some(vec!['a', '.', '(', 'b']));
    }

    #[test]
    fn test_unbalanced_groups() {
        assert_eq!(kind("(ab"), ErrorKind::UnmatchedOpenParen);
        assert_eq!(kind("ab)"), ErrorKind::UnmatchedCloseParen);
        let err = parse("ab)").unwrap_err();
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn test_dangling_quantifiers() {
        assert_eq!(kind("*a"), ErrorKind::NothingToRepeat);
        assert_eq!(kind("a|+"), ErrorKind::NothingToRepeat);
        assert_eq!(kind("a**"), ErrorKind::NothingToRepeat);
        assert_eq!(kind("{2}"), ErrorKind::NothingToRepeat);
        assert!(parse("a*?").is_ok());
        assert!(parse("a*+").is_ok());
    }

    #[test]
    fn test_braces_literal_when_not_bounds() {
        let parsed = parse("a{x}").unwrap();
        assert_eq!(parsed.node.as_literal(), Some(vec!['a', '{', 'x', '}']));
        assert!(parse("a{,3}").is_ok());
    }

    #[test]
    fn test_repetition_bounds() {
        assert_eq!(kind("a{3,1}"), ErrorKind::InvalidRepetition);
        assert_eq!(kind("a{1001}"), ErrorKind::RepetitionTooLarge);
        match parse("a{2,5}?").unwrap().node {
            Node::Repeat { min, max, kind, .. } => {
                assert_eq!((min, max, kind), (2, Some(5), RepeatKind::Lazy));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_invalid_escapes() {
        assert_eq!(kind("\\y"), ErrorKind::InvalidEscape('y'));
        assert_eq!(kind("ab\\"), ErrorKind::TrailingBackslash);
        assert_eq!(kind("\\xZZ"), ErrorKind::InvalidHexEscape);
        assert_eq!(kind("\\u12"), ErrorKind::InvalidHexEscape);
        assert!(parse("\\/\\:\\-").is_ok());
    }

    #[test]
    fn test_class_errors() {
        assert_eq!(kind("[abc"), ErrorKind::UnclosedClass);
        assert_eq!(
            kind("[z-a]"),
            ErrorKind::InvalidClassRange {
                start: 'z',
                end: 'a'
            }
        );
        assert_eq!(kind("[[:bogus:]]"), ErrorKind::UnknownPosixClass(SmolStr::new("bogus")));
        assert!(parse("[]a]").is_ok());
        assert!(parse("[a-]").is_ok());
    }

    #[test]
    fn test_class_contents() {
        let Node::Class { set, .. } = parse("[^a-c\\d[:space:]]").unwrap().node else {
            panic!("expected class");
        };
        assert!(set.negated);
        assert!(!set.contains('b'));
        assert!(!set.contains('4'));
        assert!(!set.contains(' '));
        assert!(set.contains('z'));
    }

    #[test]
    fn test_class_intersection() {
        let Node::Class { set, .. } = parse("[a-z&&[^aeiou]]").unwrap().node else {
            panic!("expected class");
        };
        assert!(set.contains('b'));
        assert!(!set.contains('a'));
    }

    #[test]
    fn test_backref_resolution() {
        assert_eq!(kind("(a)\\2"), ErrorKind::InvalidBackReference(2));
        // one group: \12 is \1 followed by a literal 2
        let node = parse("(a)\\12").unwrap().node;
        let Node::Concat(parts) = node else {
            panic!("expected concat");
        };
        assert_eq!(
            parts[1],
            Node::Concat(vec![
                Node::BackRef {
                    group: 1,
                    fold: false
                },
                Node::Literal { c: '2', fold: false }
            ])
        );
    }

    #[test]
    fn test_inline_flags() {
        let node = parse("(?i)a").unwrap().node;
        assert_eq!(node, Node::Literal { c: 'a', fold: true });
        let node = parse("(?i:a)b").unwrap().node;
        let Node::Concat(parts) = node else {
            panic!("expected concat");
        };
        assert_eq!(parts[1], Node::Literal { c: 'b', fold: false });
        assert_eq!(kind("(?q)"), ErrorKind::InvalidFlag('q'));
        assert_eq!(kind("(?<1a>x)"), ErrorKind::InvalidGroupSyntax);
    }

    #[test]
    fn test_extended_mode() {
        let parsed = parse_pattern(
            "a b # comment\n c",
            RegexOptions::ALLOW_COMMENTS_AND_WHITESPACE,
            10,
        )
        .unwrap();
        assert_eq!(parsed.node.as_literal(), Some(vec!['a', 'b', 'c']));
    }

    #[test]
    fn test_quote() {
        let parsed = parse("\\Qa.b\\E+").unwrap();
        let Node::Concat(parts) = parsed.node else {
            panic!("expected concat");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[2], Node::Repeat { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "(".repeat(20) + &")".repeat(20);
        let err = parse_pattern(&deep, RegexOptions::empty(), 10).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NestingTooDeep);
    }
}

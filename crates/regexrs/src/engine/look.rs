// Zero-width assertions
// Anchors, line terminators and word boundaries over a code-point slice.

use crate::compiler::ast::Look;
use crate::compiler::class::{is_mark, is_word_char};

#[inline]
pub fn is_line_terminator(c: char, unix_lines: bool) -> bool {
    if unix_lines {
        c == '\n'
    } else {
        matches!(
            c,
            '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    }
}

/// Whether `pos` sits between the `\r` and `\n` of a CRLF pair.
#[inline]
fn inside_crlf(chars: &[char], pos: usize, unix_lines: bool) -> bool {
    !unix_lines && pos > 0 && chars.get(pos - 1) == Some(&'\r') && chars.get(pos) == Some(&'\n')
}

pub fn check(look: Look, chars: &[char], pos: usize, unix_lines: bool) -> bool {
    let len = chars.len();
    match look {
        Look::StartText => pos == 0,
        Look::EndText => pos == len,
        Look::EndTextOptionalTerminator => {
            if pos == len {
                return true;
            }
            if pos + 1 == len && is_line_terminator(chars[pos], unix_lines) {
                return !inside_crlf(chars, pos, unix_lines);
            }
            !unix_lines && pos + 2 == len && chars[pos] == '\r' && chars[pos + 1] == '\n'
        }
        Look::StartLine => {
            pos == 0
                || (pos < len
                    && is_line_terminator(chars[pos - 1], unix_lines)
                    && !inside_crlf(chars, pos, unix_lines))
        }
        Look::EndLine => {
            pos == len
                || (is_line_terminator(chars[pos], unix_lines) && !inside_crlf(chars, pos, unix_lines))
        }
        Look::WordBoundary { unicode } => is_word_boundary(chars, pos, unicode),
        Look::NotWordBoundary { unicode } => !is_word_boundary(chars, pos, unicode),
    }
}

fn is_word_boundary(chars: &[char], pos: usize, unicode: bool) -> bool {
    let before = pos > 0 && is_word_char(chars[pos - 1]);
    let after = pos < chars.len() && is_word_char(chars[pos]);
    if before == after {
        return false;
    }
    !(unicode && joined(chars, pos))
}

/// Positions the relaxed rules treat as inside a word even though `\w` changes there.
fn joined(chars: &[char], pos: usize) -> bool {
    let at = |i: isize| -> Option<char> {
        if i < 0 {
            None
        } else {
            chars.get(i as usize).copied()
        }
    };
    let p = pos as isize;
    let letter = |c: Option<char>| c.is_some_and(char::is_alphabetic);
    let digit = |c: Option<char>| c.is_some_and(|c| c.is_numeric());
    let mid_letter = |c: Option<char>| matches!(c, Some('\'' | '\u{2019}' | '.' | ':' | '\u{B7}'));
    let mid_num = |c: Option<char>| matches!(c, Some('.' | ','));
    let extend = |c: Option<char>| c.is_some_and(|c| is_mark(c) || c == '\u{200D}');

    // Extend characters and ZWJ attach to what precedes them.
    if extend(at(p)) || at(p - 1) == Some('\u{200D}') {
        return true;
    }
    // letter | ' letter  and  letter ' | letter
    if letter(at(p - 1)) && mid_letter(at(p)) && letter(at(p + 1)) {
        return true;
    }
    if letter(at(p - 2)) && mid_letter(at(p - 1)) && letter(at(p)) {
        return true;
    }
    // digit | . digit  and  digit . | digit
    if digit(at(p - 1)) && mid_num(at(p)) && digit(at(p + 1)) {
        return true;
    }
    digit(at(p - 2)) && mid_num(at(p - 1)) && digit(at(p))
}

// Replacement templates
//
// `$N`     group N; digits after the first are taken while the number stays
//          within the group count, the rest is literal text
// `${x}`   group by name, or by number when `x` is all digits
// `\c`     literal `c`
// A `$` not followed by a digit or `{` is literal. Absent or unknown groups expand to "".

use smol_str::SmolStr;

use crate::matches::Match;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Group(usize),
    Named(SmolStr),
}

/// A parsed replacement template, reusable across matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse `text` for a pattern with `groups` capturing groups.
    pub fn parse(text: &str, groups: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut pieces = Vec::new();
        let mut lit = String::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    match chars.get(i + 1) {
                        Some(&c) => lit.push(c),
                        None => lit.push('\\'),
                    }
                    i += 2;
                }
                '$' => match chars.get(i + 1) {
                    Some(&d) if d.is_ascii_digit() => {
                        let mut group = d as usize - '0' as usize;
                        i += 2;
                        while let Some(next) = chars.get(i).and_then(|c| c.to_digit(10)) {
                            let candidate = group * 10 + next as usize;
                            if candidate > groups {
                                break;
                            }
                            group = candidate;
                            i += 1;
                        }
                        flush(&mut pieces, &mut lit);
                        pieces.push(Piece::Group(group));
                    }
                    Some('{') => {
                        let close = chars[i + 2..].iter().position(|&c| c == '}');
                        match close {
                            Some(len) if len > 0 => {
                                let name: String = chars[i + 2..i + 2 + len].iter().collect();
                                flush(&mut pieces, &mut lit);
                                pieces.push(match name.parse::<usize>() {
                                    Ok(n) if name.chars().all(|c| c.is_ascii_digit()) => {
                                        Piece::Group(n)
                                    }
                                    _ => Piece::Named(SmolStr::new(name)),
                                });
                                i += len + 3;
                            }
                            _ => {
                                lit.push('$');
                                i += 1;
                            }
                        }
                    }
                    _ => {
                        lit.push('$');
                        i += 1;
                    }
                },
                c => {
                    lit.push(c);
                    i += 1;
                }
            }
        }
        flush(&mut pieces, &mut lit);
        Self { pieces }
    }

    /// Whether the template is plain text with no group references.
    pub fn is_literal(&self) -> bool {
        self.pieces.iter().all(|p| matches!(p, Piece::Literal(_)))
    }

    /// The literal text of the template, ignoring any group references.
    pub(crate) fn expand_literal(&self) -> String {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Literal(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn expand(&self, m: &Match<'_>) -> String {
        let mut out = String::new();
        self.expand_into(m, &mut out);
        out
    }

    pub fn expand_into(&self, m: &Match<'_>, out: &mut String) {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Group(index) => out.push_str(m.group(*index).unwrap_or_default()),
                Piece::Named(name) => out.push_str(m.group_named(name).unwrap_or_default()),
            }
        }
    }
}

fn flush(pieces: &mut Vec<Piece>, lit: &mut String) {
    if !lit.is_empty() {
        pieces.push(Piece::Literal(std::mem::take(lit)));
    }
}

/// Something usable as a replacement template: raw template text or a parsed [`Template`].
pub trait Replacement {
    fn with_template<R>(&self, groups: usize, f: impl FnOnce(&Template) -> R) -> R;
}

impl Replacement for str {
    fn with_template<R>(&self, groups: usize, f: impl FnOnce(&Template) -> R) -> R {
        f(&Template::parse(self, groups))
    }
}

impl Replacement for String {
    fn with_template<R>(&self, groups: usize, f: impl FnOnce(&Template) -> R) -> R {
        self.as_str().with_template(groups, f)
    }
}

impl Replacement for Template {
    fn with_template<R>(&self, _groups: usize, f: impl FnOnce(&Template) -> R) -> R {
        f(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_rule() {
        let t = Template::parse("$12", 1);
        assert_eq!(
            t.pieces,
            vec![Piece::Group(1), Piece::Literal("2".to_string())]
        );
        let t = Template::parse("$12", 12);
        assert_eq!(t.pieces, vec![Piece::Group(12)]);
    }

    #[test]
    fn test_braced_and_escaped() {
        let t = Template::parse("${year}-${2}\\$1$", 2);
        assert_eq!(
            t.pieces,
            vec![
                Piece::Named(SmolStr::new("year")),
                Piece::Literal("-".to_string()),
                Piece::Group(2),
                Piece::Literal("$1$".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_brace_is_literal() {
        let t = Template::parse("${abc", 0);
        assert!(t.is_literal());
        assert_eq!(t.pieces, vec![Piece::Literal("${abc".to_string())]);
    }

    #[test]
    fn test_trailing_backslash() {
        let t = Template::parse("a\\", 0);
        assert_eq!(t.pieces, vec![Piece::Literal("a\\".to_string())]);
    }
}

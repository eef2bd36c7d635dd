// Parsed pattern tree
// Produced by the parser, consumed once by the code generator.

use smol_str::SmolStr;

use super::class::CharSet;

/// Zero-width assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Look {
    /// `\A`, or `^` without multiline anchors.
    StartText,
    /// `\z`.
    EndText,
    /// `\Z`, or `$` without multiline anchors: end of text or before a final line terminator.
    EndTextOptionalTerminator,
    /// `^` with multiline anchors.
    StartLine,
    /// `$` with multiline anchors.
    EndLine,
    /// `\b`. `unicode` selects the relaxed boundary rules.
    WordBoundary { unicode: bool },
    /// `\B`.
    NotWordBoundary { unicode: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    Greedy,
    Lazy,
    Possessive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Matches the empty string.
    Empty,
    /// A single code point. `fold` requests case-insensitive comparison.
    Literal { c: char, fold: bool },
    /// `.`
    Any { dot_all: bool },
    Class { set: CharSet, fold: bool },
    Look(Look),
    /// `(...)` with its 1-based group index, or a plain `(?:...)` when `index` is `None`.
    Group { index: Option<usize>, node: Box<Node> },
    Concat(Vec<Node>),
    Alternate(Vec<Node>),
    Repeat {
        node: Box<Node>,
        min: u32,
        max: Option<u32>,
        kind: RepeatKind,
    },
    /// `(?>...)`
    Atomic(Box<Node>),
    /// `(?=...)`, `(?!...)`, `(?<=...)`, `(?<!...)`
    LookAround {
        node: Box<Node>,
        behind: bool,
        negate: bool,
    },
    BackRef { group: usize, fold: bool },
    /// `\N...` as written. Only exists between parsing and back-reference
    /// resolution, which needs the pattern's final group count.
    UnresolvedBackRef {
        digits: SmolStr,
        fold: bool,
        offset: usize,
    },
}

impl Node {
    /// Whether this node can succeed without consuming input.
    pub fn can_match_empty(&self) -> bool {
        match self {
            Node::Empty | Node::Look(_) | Node::LookAround { .. } => true,
            Node::Literal { .. } | Node::Any { .. } | Node::Class { .. } => false,
            Node::Group { node, .. } | Node::Atomic(node) => node.can_match_empty(),
            Node::Concat(nodes) => nodes.iter().all(Node::can_match_empty),
            Node::Alternate(nodes) => nodes.iter().any(Node::can_match_empty),
            Node::Repeat { node, min, .. } => *min == 0 || node.can_match_empty(),
            // The referenced group may have captured the empty string.
            Node::BackRef { .. } | Node::UnresolvedBackRef { .. } => true,
        }
    }

    /// Upper bound on the number of code points this node can consume.
    /// `None` when unbounded.
    pub fn max_width(&self) -> Option<usize> {
        match self {
            Node::Empty | Node::Look(_) | Node::LookAround { .. } => Some(0),
            Node::Literal { .. } | Node::Any { .. } | Node::Class { .. } => Some(1),
            Node::Group { node, .. } | Node::Atomic(node) => node.max_width(),
            Node::Concat(nodes) => nodes
                .iter()
                .try_fold(0usize, |acc, n| acc.checked_add(n.max_width()?)),
            Node::Alternate(nodes) => nodes
                .iter()
                .try_fold(0usize, |acc, n| Some(acc.max(n.max_width()?))),
            Node::Repeat { node, max, .. } => {
                let width = node.max_width()?;
                match max {
                    _ if width == 0 => Some(0),
                    Some(max) => width.checked_mul(*max as usize),
                    None => None,
                }
            }
            Node::BackRef { .. } | Node::UnresolvedBackRef { .. } => None,
        }
    }

    /// The pattern as a plain case-sensitive literal, if it is one.
    pub fn as_literal(&self) -> Option<Vec<char>> {
        match self {
            Node::Literal { c, fold: false } => Some(vec![*c]),
            Node::Literal { c, fold: true } if !super::class::has_case(*c) => Some(vec![*c]),
            Node::Concat(nodes) if !nodes.is_empty() => {
                let mut out = Vec::with_capacity(nodes.len());
                for node in nodes {
                    out.extend(node.as_literal()?);
                }
                Some(out)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Node {
        Node::Literal { c, fold: false }
    }

    #[test]
    fn test_can_match_empty() {
        assert!(!lit('a').can_match_empty());
        assert!(Node::Concat(vec![]).can_match_empty());
        assert!(Node::Alternate(vec![lit('a'), Node::Empty]).can_match_empty());
        let star = Node::Repeat {
            node: Box::new(lit('a')),
            min: 0,
            max: None,
            kind: RepeatKind::Greedy,
        };
        assert!(star.can_match_empty());
        let plus = Node::Repeat {
            node: Box::new(lit('a')),
            min: 1,
            max: None,
            kind: RepeatKind::Greedy,
        };
        assert!(!plus.can_match_empty());
    }

    #[test]
    fn test_max_width() {
        let bounded = Node::Repeat {
            node: Box::new(Node::Concat(vec![lit('a'), lit('b')])),
            min: 1,
            max: Some(3),
            kind: RepeatKind::Greedy,
        };
        assert_eq!(bounded.max_width(), Some(6));
        let alt = Node::Alternate(vec![lit('a'), Node::Concat(vec![lit('b'), lit('c')])]);
        assert_eq!(alt.max_width(), Some(2));
        let star = Node::Repeat {
            node: Box::new(lit('a')),
            min: 0,
            max: None,
            kind: RepeatKind::Lazy,
        };
        assert_eq!(star.max_width(), None);
        assert_eq!(Node::BackRef { group: 1, fold: false }.max_width(), None);
    }

    #[test]
    fn test_as_literal() {
        let node = Node::Concat(vec![lit('a'), lit('b')]);
        assert_eq!(node.as_literal(), Some(vec!['a', 'b']));
        let folded = Node::Concat(vec![Node::Literal { c: 'a', fold: true }]);
        assert_eq!(folded.as_literal(), None);
        let digits = Node::Literal { c: '1', fold: true };
        assert_eq!(digits.as_literal(), Some(vec!['1']));
        assert_eq!(Node::Any { dot_all: false }.as_literal(), None);
    }
}

// Character class matching
// Handles \d \w \s \h \v and their inverses, [:posix:] names, \p{..} properties,
// [set] contents (ranges, nesting, && intersection) and simple case folding.

use smol_str::SmolStr;

use crate::error::ErrorKind;

/// Perl-style shorthand classes: `\d \w \s \h \v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerlClass {
    Digit,
    Word,
    Space,
    HorizontalSpace,
    VerticalSpace,
}

impl PerlClass {
    pub fn matches(self, c: char) -> bool {
        match self {
            PerlClass::Digit => is_digit(c),
            PerlClass::Word => is_word_char(c),
            PerlClass::Space => c.is_whitespace(),
            PerlClass::HorizontalSpace => is_horizontal_space(c),
            PerlClass::VerticalSpace => is_vertical_space(c),
        }
    }
}

/// Named classes for `[:alpha:]`, `[:digit:]`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosixClass {
    Alnum,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    XDigit,
    Word,
    Ascii,
}

impl PosixClass {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "alnum" => Some(PosixClass::Alnum),
            "alpha" => Some(PosixClass::Alpha),
            "blank" => Some(PosixClass::Blank),
            "cntrl" => Some(PosixClass::Cntrl),
            "digit" => Some(PosixClass::Digit),
            "graph" => Some(PosixClass::Graph),
            "lower" => Some(PosixClass::Lower),
            "print" => Some(PosixClass::Print),
            "punct" => Some(PosixClass::Punct),
            "space" => Some(PosixClass::Space),
            "upper" => Some(PosixClass::Upper),
            "xdigit" => Some(PosixClass::XDigit),
            "word" => Some(PosixClass::Word),
            "ascii" => Some(PosixClass::Ascii),
            _ => None,
        }
    }

    pub fn matches(self, c: char) -> bool {
        match self {
            PosixClass::Alnum => c.is_alphanumeric(),
            PosixClass::Alpha => c.is_alphabetic(),
            PosixClass::Blank => is_horizontal_space(c),
            PosixClass::Cntrl => c.is_control(),
            PosixClass::Digit => is_digit(c),
            PosixClass::Graph => !c.is_control() && !c.is_whitespace(),
            PosixClass::Lower => c.is_lowercase(),
            PosixClass::Print => !c.is_control(),
            PosixClass::Punct => is_punctuation(c),
            PosixClass::Space => c.is_whitespace(),
            PosixClass::Upper => c.is_uppercase(),
            PosixClass::XDigit => c.is_ascii_hexdigit(),
            PosixClass::Word => is_word_char(c),
            PosixClass::Ascii => c.is_ascii(),
        }
    }
}

/// Approximate Unicode general-category / binary properties for `\p{..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Letter,
    Uppercase,
    Lowercase,
    Number,
    DecimalNumber,
    Punctuation,
    Separator,
    Control,
    Any,
    Ascii,
}

impl Property {
    /// Resolve a property name, ignoring case, spaces, `-` and `_` the way ICU does.
    pub fn from_name(name: &str) -> Result<Self, ErrorKind> {
        let loose: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        let prop = match loose.as_str() {
            "l" | "letter" | "alphabetic" | "alpha" => Property::Letter,
            "lu" | "uppercase" | "uppercaseletter" | "upper" => Property::Uppercase,
            "ll" | "lowercase" | "lowercaseletter" | "lower" => Property::Lowercase,
            "n" | "number" => Property::Number,
            "nd" | "digit" | "decimalnumber" => Property::DecimalNumber,
            "p" | "punctuation" | "punct" => Property::Punctuation,
            "z" | "zs" | "separator" | "spaceseparator" | "whitespace" | "space" => {
                Property::Separator
            }
            "cc" | "control" | "cntrl" => Property::Control,
            "any" => Property::Any,
            "ascii" => Property::Ascii,
            _ => return Err(ErrorKind::UnknownProperty(SmolStr::new(name))),
        };
        Ok(prop)
    }

    pub fn matches(self, c: char) -> bool {
        match self {
            Property::Letter => c.is_alphabetic(),
            Property::Uppercase => c.is_uppercase(),
            Property::Lowercase => c.is_lowercase(),
            Property::Number => c.is_numeric(),
            Property::DecimalNumber => is_digit(c),
            Property::Punctuation => is_punctuation(c),
            Property::Separator => c.is_whitespace(),
            Property::Control => c.is_control(),
            Property::Any => true,
            Property::Ascii => c.is_ascii(),
        }
    }
}

/// An item inside a character set `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Perl { class: PerlClass, negated: bool },
    Posix { class: PosixClass, negated: bool },
    Property { prop: Property, negated: bool },
    /// A nested set `[a[bc]]`, unioned with its siblings.
    Set(Box<CharSet>),
}

impl ClassItem {
    pub fn matches(&self, c: char) -> bool {
        match self {
            ClassItem::Char(ch) => c == *ch,
            ClassItem::Range(start, end) => c >= *start && c <= *end,
            ClassItem::Perl { class, negated } => class.matches(c) != *negated,
            ClassItem::Posix { class, negated } => class.matches(c) != *negated,
            ClassItem::Property { prop, negated } => prop.matches(c) != *negated,
            ClassItem::Set(set) => set.contains(c),
        }
    }
}

/// A character set: the union of `items`, intersected with every set in `and`,
/// then optionally negated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharSet {
    pub items: Vec<ClassItem>,
    pub and: Vec<CharSet>,
    pub negated: bool,
}

impl CharSet {
    pub fn single(item: ClassItem) -> Self {
        Self {
            items: vec![item],
            and: Vec::new(),
            negated: false,
        }
    }

    #[inline]
    fn contains_positive(&self, c: char) -> bool {
        self.items.iter().any(|item| item.matches(c)) && self.and.iter().all(|set| set.contains(c))
    }

    /// Exact membership, negation applied.
    pub fn contains(&self, c: char) -> bool {
        self.contains_positive(c) != self.negated
    }

    /// Membership under case-insensitive matching: `c` is in the set when
    /// any of its simple case variants is. Negation is applied after folding,
    /// so `[^a]` rejects both `a` and `A`.
    pub fn matches(&self, c: char, fold: bool) -> bool {
        if !fold {
            return self.contains(c);
        }
        let hit = self.contains_positive(c)
            || self.contains_positive(simple_lower(c))
            || self.contains_positive(simple_upper(c));
        hit != self.negated
    }
}

// ======================== Character predicates ========================

#[inline]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || (!c.is_ascii() && is_decimal_block(c))
}

/// Code points that start a run of ten decimal digits in common scripts
/// (Arabic-Indic, Devanagari, Thai, fullwidth, ...). An approximation of `Nd`.
fn is_decimal_block(c: char) -> bool {
    const ZEROS: &[u32] = &[
        0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66, 0x0CE6,
        0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x17E0, 0x1810, 0xFF10,
    ];
    let cp = c as u32;
    ZEROS.iter().any(|&zero| cp >= zero && cp < zero + 10)
}

/// `\w`: alphanumerics, combining marks and connector punctuation.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_mark(c) || is_connector_punctuation(c)
}

pub fn is_mark(c: char) -> bool {
    matches!(
        c as u32,
        0x0300..=0x036F
            | 0x0483..=0x0489
            | 0x0591..=0x05BD
            | 0x0610..=0x061A
            | 0x064B..=0x065F
            | 0x0900..=0x0903
            | 0x093A..=0x094F
            | 0x0E31
            | 0x0E34..=0x0E3A
            | 0x0E47..=0x0E4E
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x20D0..=0x20FF
            | 0xFE00..=0xFE0F
            | 0xFE20..=0xFE2F
    )
}

fn is_connector_punctuation(c: char) -> bool {
    matches!(c, '\u{203F}' | '\u{2040}' | '\u{2054}' | '\u{FE33}' | '\u{FE34}' | '\u{FE4D}'..='\u{FE4F}' | '\u{FF3F}')
}

pub fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_punctuation();
    }
    matches!(
        c as u32,
        0x00A1 | 0x00A7 | 0x00AB | 0x00B6 | 0x00B7 | 0x00BB | 0x00BF
            | 0x2010..=0x2027
            | 0x2030..=0x205E
            | 0x3001..=0x3003
            | 0x3008..=0x3011
            | 0xFF01..=0xFF0F
    )
}

#[inline]
pub fn is_horizontal_space(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\u{A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

#[inline]
pub fn is_vertical_space(c: char) -> bool {
    matches!(c, '\n' | '\u{B}' | '\u{C}' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

// ======================== Case folding ========================

/// Lowercase mapping when it is a single code point, else `c` itself.
#[inline]
pub fn simple_lower(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Uppercase mapping when it is a single code point, else `c` itself.
#[inline]
pub fn simple_upper(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_uppercase();
    }
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Canonical case-folded form used for case-insensitive comparison.
/// Going through uppercase first merges variants like `ſ`/`s` and `K` (Kelvin)/`k`.
#[inline]
pub fn fold(c: char) -> char {
    simple_lower(simple_upper(c))
}

/// Whether `c` has any case variant at all.
#[inline]
pub fn has_case(c: char) -> bool {
    simple_lower(c) != c || simple_upper(c) != c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perl_classes() {
        assert!(PerlClass::Digit.matches('5'));
        assert!(PerlClass::Digit.matches('٣'));
        assert!(!PerlClass::Digit.matches('x'));
        assert!(PerlClass::Word.matches('_'));
        assert!(PerlClass::Word.matches('é'));
        assert!(!PerlClass::Word.matches('-'));
        assert!(PerlClass::Space.matches('\t'));
        assert!(PerlClass::HorizontalSpace.matches(' '));
        assert!(!PerlClass::HorizontalSpace.matches('\n'));
        assert!(PerlClass::VerticalSpace.matches('\n'));
    }

    #[test]
    fn test_posix_names() {
        assert_eq!(PosixClass::from_name("alpha"), Some(PosixClass::Alpha));
        assert_eq!(PosixClass::from_name("bogus"), None);
        assert!(PosixClass::XDigit.matches('F'));
        assert!(!PosixClass::XDigit.matches('g'));
    }

    #[test]
    fn test_property_names_are_loose() {
        assert_eq!(Property::from_name("Lu"), Ok(Property::Uppercase));
        assert_eq!(Property::from_name("White_Space"), Ok(Property::Separator));
        assert_eq!(Property::from_name("decimal number"), Ok(Property::DecimalNumber));
        assert!(Property::from_name("Klingon").is_err());
    }

    #[test]
    fn test_set_with_range_and_class() {
        let set = CharSet {
            items: vec![
                ClassItem::Range('a', 'f'),
                ClassItem::Perl {
                    class: PerlClass::Digit,
                    negated: false,
                },
            ],
            and: Vec::new(),
            negated: false,
        };
        assert!(set.contains('c'));
        assert!(set.contains('7'));
        assert!(!set.contains('g'));
        assert!(!set.contains('C'));
        assert!(set.matches('C', true));
    }

    #[test]
    fn test_negated_set_folds_before_negation() {
        let set = CharSet {
            items: vec![ClassItem::Char('a')],
            and: Vec::new(),
            negated: true,
        };
        assert!(!set.matches('a', true));
        assert!(!set.matches('A', true));
        assert!(set.matches('A', false));
        assert!(set.matches('b', true));
    }

    #[test]
    fn test_intersection() {
        let vowels = CharSet {
            items: "aeiou".chars().map(ClassItem::Char).collect(),
            and: Vec::new(),
            negated: true,
        };
        let consonants = CharSet {
            items: vec![ClassItem::Range('a', 'z')],
            and: vec![vowels],
            negated: false,
        };
        assert!(consonants.contains('b'));
        assert!(!consonants.contains('e'));
        assert!(!consonants.contains('B'));
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold('A'), 'a');
        assert_eq!(fold('ſ'), 's');
        assert_eq!(fold('\u{212A}'), 'k');
        assert_eq!(fold('ß'), 'ß');
        assert!(has_case('x'));
        assert!(!has_case('1'));
    }
}

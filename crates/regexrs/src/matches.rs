// Match results
// `Match` is an immutable view over one successful match; `Matches` is the
// lazy find-all cursor that produces them.

use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::Arc;

use ahash::AHashMap;
use smol_str::SmolStr;

use crate::engine::{self, Slots, Subject};
use crate::error::MatchError;
use crate::regex::Regex;
use crate::transform::Template;

/// Half-open span `[start, end)` in code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupRange {
    pub start: usize,
    pub end: usize,
}

impl GroupRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<GroupRange> for Range<usize> {
    fn from(r: GroupRange) -> Self {
        r.as_range()
    }
}

pub(crate) type NameMap = Arc<AHashMap<SmolStr, usize>>;

/// One successful match. Borrows the subject; substrings are sliced on request.
#[derive(Debug, Clone)]
pub struct Match<'t> {
    subject: &'t str,
    /// Per group, code points. Index 0 is the whole match.
    ranges: Vec<Option<GroupRange>>,
    /// Per group, bytes.
    spans: Vec<Option<(usize, usize)>>,
    names: NameMap,
}

impl<'t> Match<'t> {
    pub(crate) fn new(subject: &Subject<'t>, slots: &Slots, names: NameMap) -> Self {
        let mut ranges = Vec::with_capacity(slots.len() / 2);
        let mut spans = Vec::with_capacity(slots.len() / 2);
        for pair in slots.chunks_exact(2) {
            match (pair[0], pair[1]) {
                (Some(start), Some(end)) if start <= end => {
                    ranges.push(Some(GroupRange::new(start, end)));
                    spans.push(Some((subject.byte_offset(start), subject.byte_offset(end))));
                }
                _ => {
                    ranges.push(None);
                    spans.push(None);
                }
            }
        }
        Self {
            subject: subject.text(),
            ranges,
            spans,
            names,
        }
    }

    /// The whole matched text.
    pub fn matched(&self) -> &'t str {
        self.group(0).unwrap_or_default()
    }

    pub fn range_of_match(&self) -> GroupRange {
        self.range(0).unwrap_or(GroupRange::new(0, 0))
    }

    /// Start of the match in code points.
    pub fn start(&self) -> usize {
        self.range_of_match().start
    }

    /// End of the match in code points.
    pub fn end(&self) -> usize {
        self.range_of_match().end
    }

    /// Length of the match in code points.
    pub fn len(&self) -> usize {
        self.range_of_match().len()
    }

    pub fn is_empty(&self) -> bool {
        self.range_of_match().is_empty()
    }

    /// Range of group `index`. `None` when the group did not participate or does not exist.
    pub fn range(&self, index: usize) -> Option<GroupRange> {
        self.ranges.get(index).copied().flatten()
    }

    pub fn range_named(&self, name: &str) -> Option<GroupRange> {
        self.range(self.index_of(name)?)
    }

    /// Byte range of group `index` in the subject.
    pub fn byte_range(&self, index: usize) -> Option<Range<usize>> {
        let (start, end) = self.spans.get(index).copied().flatten()?;
        Some(start..end)
    }

    pub fn group(&self, index: usize) -> Option<&'t str> {
        let subject = self.subject;
        self.byte_range(index).map(|r| &subject[r])
    }

    pub fn group_named(&self, name: &str) -> Option<&'t str> {
        self.group(self.index_of(name)?)
    }

    /// Groups `1..`, in declaration order.
    pub fn subgroups(&self) -> Vec<Option<&'t str>> {
        (1..self.ranges.len()).map(|i| self.group(i)).collect()
    }

    /// Ranges of every group, group 0 included.
    pub fn ranges(&self) -> &[Option<GroupRange>] {
        &self.ranges
    }

    /// The text this match was found in.
    pub fn subject(&self) -> &'t str {
        self.subject
    }

    /// Number of groups, group 0 included.
    pub fn groups_len(&self) -> usize {
        self.ranges.len()
    }

    pub fn groups(&self) -> Groups<'_, 't> {
        Groups { m: self }
    }

    /// Expand a replacement template against this match.
    pub fn expand(&self, template: &str) -> String {
        Template::parse(template, self.ranges.len().saturating_sub(1)).expand(self)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }
}

/// Indexed access to the groups of a [`Match`].
#[derive(Debug, Clone, Copy)]
pub struct Groups<'m, 't> {
    m: &'m Match<'t>,
}

impl<'m, 't> Groups<'m, 't> {
    pub fn get(&self, index: usize) -> Option<&'t str> {
        self.m.group(index)
    }

    pub fn get_named(&self, name: &str) -> Option<&'t str> {
        self.m.group_named(name)
    }

    pub fn len(&self) -> usize {
        self.m.groups_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every group in order, group 0 first.
    pub fn iter(&self) -> impl Iterator<Item = Option<&'t str>> + 'm {
        let m = self.m;
        (0..m.groups_len()).map(move |i| m.group(i))
    }
}

/// Lazy, single-pass iterator over the non-overlapping matches of a regex in a subject.
///
/// After an empty match at `p`, the next search starts at `p + 1`; otherwise it
/// starts where the previous match ended.
pub struct Matches<'r, 't> {
    regex: &'r Regex,
    subject: Subject<'t>,
    pos: usize,
    done: bool,
    error: Option<MatchError>,
}

impl<'r, 't> Matches<'r, 't> {
    pub(crate) fn new(regex: &'r Regex, subject: &'t str, start: usize) -> Self {
        Self {
            regex,
            subject: Subject::new(subject),
            pos: start,
            done: false,
            error: None,
        }
    }

    /// Why iteration stopped early, if the step budget ran out.
    pub fn error(&self) -> Option<MatchError> {
        self.error
    }

    /// The text being searched.
    pub fn subject(&self) -> &'t str {
        self.subject.text()
    }
}

impl<'r, 't> Iterator for Matches<'r, 't> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        if self.done || self.pos > self.subject.len() {
            self.done = true;
            return None;
        }
        let found = engine::search(
            self.regex.program(),
            &self.subject,
            self.pos,
            self.regex.limits().step_budget,
        );
        match found {
            Ok(Some(slots)) => {
                let m = Match::new(&self.subject, &slots, self.regex.name_map());
                let range = m.range_of_match();
                self.pos = if range.is_empty() { range.end + 1 } else { range.end };
                Some(m)
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                log::debug!("iteration over {:?} stopped: {}", self.regex.as_str(), err);
                self.error = Some(err);
                self.done = true;
                None
            }
        }
    }
}

impl FusedIterator for Matches<'_, '_> {}

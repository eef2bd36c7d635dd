// Compiled regular expression
// The public entry point: construction, queries, replace and split.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ahash::AHashMap;
use smol_str::SmolStr;

use crate::compiler::{self, Program};
use crate::engine::{self, Subject};
use crate::error::{CompileError, MatchError};
use crate::matches::{Match, Matches, NameMap};
use crate::options::{MatchLimits, RegexOptions};
use crate::transform::{self, Replacement};

/// An immutable compiled pattern. Cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct Regex {
    inner: Arc<RegexInner>,
}

struct RegexInner {
    pattern: String,
    options: RegexOptions,
    group_names: Vec<SmolStr>,
    names: NameMap,
    program: Program,
    limits: MatchLimits,
}

impl Regex {
    /// Compile `pattern`. The k-th entry of `group_names` names the k-th capturing
    /// group, counted by opening parenthesis from the left.
    pub fn new<S: AsRef<str>>(
        pattern: &str,
        options: RegexOptions,
        group_names: &[S],
    ) -> Result<Regex, CompileError> {
        RegexBuilder::new(pattern)
            .options(options)
            .group_names(group_names)
            .build()
    }

    /// Compile with the given options and no group names.
    pub fn with_options(pattern: &str, options: RegexOptions) -> Result<Regex, CompileError> {
        RegexBuilder::new(pattern).options(options).build()
    }

    pub fn builder(pattern: &str) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.inner.pattern
    }

    pub fn options(&self) -> RegexOptions {
        self.inner.options
    }

    pub fn group_names(&self) -> &[SmolStr] {
        &self.inner.group_names
    }

    /// Number of capturing groups, excluding the whole match.
    pub fn captures_len(&self) -> usize {
        self.inner.program.groups
    }

    pub fn limits(&self) -> &MatchLimits {
        &self.inner.limits
    }

    pub(crate) fn program(&self) -> &Program {
        &self.inner.program
    }

    pub(crate) fn name_map(&self) -> NameMap {
        Arc::clone(&self.inner.names)
    }

    // ======================== Queries ========================

    /// Whether the pattern matches anywhere in `subject`.
    pub fn matches(&self, subject: &str) -> bool {
        self.find_first(subject).is_some()
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.matches(subject)
    }

    /// The leftmost match in `subject`.
    pub fn find_first<'t>(&self, subject: &'t str) -> Option<Match<'t>> {
        self.find_at(subject, 0)
    }

    /// The leftmost match starting at or after the code-point offset `offset`.
    ///
    /// An exhausted step budget is reported as no match; use [`Regex::try_find_at`]
    /// to tell the two apart.
    pub fn find_at<'t>(&self, subject: &'t str, offset: usize) -> Option<Match<'t>> {
        match self.try_find_at(subject, offset) {
            Ok(found) => found,
            Err(err) => {
                log::debug!("search for {:?} abandoned: {}", self.as_str(), err);
                None
            }
        }
    }

    pub fn try_find_at<'t>(
        &self,
        subject: &'t str,
        offset: usize,
    ) -> Result<Option<Match<'t>>, MatchError> {
        let input = Subject::new(subject);
        let slots = engine::search(
            &self.inner.program,
            &input,
            offset,
            self.inner.limits.step_budget,
        )?;
        Ok(slots.map(|slots| Match::new(&input, &slots, self.name_map())))
    }

    /// Every non-overlapping match, left to right.
    pub fn find_all<'r, 't>(&'r self, subject: &'t str) -> Matches<'r, 't> {
        Matches::new(self, subject, 0)
    }

    pub fn find_iter_at<'r, 't>(&'r self, subject: &'t str, offset: usize) -> Matches<'r, 't> {
        Matches::new(self, subject, offset)
    }

    // ======================== Replace ========================

    /// Replace every match with the expansion of `template`.
    pub fn replace_all<T: Replacement + ?Sized>(&self, subject: &str, template: &T) -> String {
        self.replace_n(subject, 0, template)
    }

    /// Replace every match with the callback's result; `None` keeps the matched text.
    pub fn replace_all_with<F>(&self, subject: &str, replacer: F) -> String
    where
        F: FnMut(&Match<'_>) -> Option<String>,
    {
        self.replace_n_with(subject, 0, replacer)
    }

    pub fn replace_first<T: Replacement + ?Sized>(&self, subject: &str, template: &T) -> String {
        self.replace_n(subject, 1, template)
    }

    pub fn replace_first_with<F>(&self, subject: &str, replacer: F) -> String
    where
        F: FnMut(&Match<'_>) -> Option<String>,
    {
        self.replace_n_with(subject, 1, replacer)
    }

    /// Replace the first `limit` matches (`0` = all) with the expansion of `template`.
    pub fn replace_n<T: Replacement + ?Sized>(
        &self,
        subject: &str,
        limit: usize,
        template: &T,
    ) -> String {
        template.with_template(self.captures_len(), |template| {
            if template.is_literal() {
                let text = template.expand_literal();
                transform::replace_n(subject, self.find_all(subject), limit, |_, out| {
                    out.push_str(&text)
                })
            } else {
                transform::replace_n(subject, self.find_all(subject), limit, |m, out| {
                    template.expand_into(m, out)
                })
            }
        })
    }

    pub fn replace_n_with<F>(&self, subject: &str, limit: usize, mut replacer: F) -> String
    where
        F: FnMut(&Match<'_>) -> Option<String>,
    {
        transform::replace_n(subject, self.find_all(subject), limit, |m, out| {
            match replacer(m) {
                Some(text) => out.push_str(&text),
                None => out.push_str(m.matched()),
            }
        })
    }

    // ======================== Split ========================

    /// Split `subject` around every match, interleaving participating captures.
    pub fn split<'t>(&self, subject: &'t str) -> Vec<&'t str> {
        transform::split_n(subject, self.find_all(subject), 0)
    }

    /// Like [`Regex::split`], producing at most `limit` segments (`0` = no limit).
    pub fn splitn<'t>(&self, subject: &'t str, limit: usize) -> Vec<&'t str> {
        transform::split_n(subject, self.find_all(subject), limit)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.pattern)
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Regex")
            .field("pattern", &self.inner.pattern)
            .field("options", &self.inner.options)
            .field("group_names", &self.inner.group_names)
            .finish()
    }
}

impl FromStr for Regex {
    type Err = CompileError;

    /// Compile with default options and no group names.
    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        RegexBuilder::new(pattern).build()
    }
}

/// Step-by-step construction of a [`Regex`].
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: String,
    options: RegexOptions,
    group_names: Vec<SmolStr>,
    limits: MatchLimits,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            options: RegexOptions::default(),
            group_names: Vec::new(),
            limits: MatchLimits::default(),
        }
    }

    pub fn options(mut self, options: RegexOptions) -> Self {
        self.options = options;
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.options.set(RegexOptions::CASE_INSENSITIVE, yes);
        self
    }

    pub fn group_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.group_names = names.iter().map(|n| SmolStr::new(n.as_ref())).collect();
        self
    }

    pub fn limits(mut self, limits: MatchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn step_budget(mut self, steps: u64) -> Self {
        self.limits.step_budget = Some(steps);
        self
    }

    pub fn max_nesting(mut self, depth: usize) -> Self {
        self.limits.max_nesting = depth;
        self
    }

    pub fn build(self) -> Result<Regex, CompileError> {
        let program = compiler::compile(&self.pattern, self.options, &self.limits)?;
        // Later duplicates win.
        let mut names = AHashMap::with_capacity(self.group_names.len());
        for (k, name) in self.group_names.iter().enumerate() {
            names.insert(name.clone(), k + 1);
        }
        if self.group_names.len() > program.groups {
            log::debug!(
                "{} group names supplied for {} groups in {:?}",
                self.group_names.len(),
                program.groups,
                self.pattern
            );
        }
        Ok(Regex {
            inner: Arc::new(RegexInner {
                pattern: self.pattern,
                options: self.options,
                group_names: self.group_names,
                names: Arc::new(names),
                program,
                limits: self.limits,
            }),
        })
    }
}

// Replacement driver shared by the template and callback forms.

use crate::matches::Match;

/// Copy `subject`, letting `substitute` write the replacement for each of the
/// first `limit` matches (`0` = every match). Text between matches is copied verbatim.
pub(crate) fn replace_n<'t, I, F>(subject: &'t str, matches: I, limit: usize, mut substitute: F) -> String
where
    I: Iterator<Item = Match<'t>>,
    F: FnMut(&Match<'t>, &mut String),
{
    let mut out = String::with_capacity(subject.len());
    let mut last = 0;
    let mut count = 0;
    for m in matches {
        if limit != 0 && count >= limit {
            break;
        }
        let Some(span) = m.byte_range(0) else {
            continue;
        };
        out.push_str(&subject[last..span.start]);
        substitute(&m, &mut out);
        last = span.end;
        count += 1;
    }
    if count == 0 {
        return subject.to_string();
    }
    out.push_str(&subject[last..]);
    log::trace!("replaced {} matches", count);
    out
}

// Split driver.

use crate::matches::Match;

/// Split `subject` around matches. Captured subgroups that participated are
/// inserted after the segment preceding their match. With `limit > 0`, at most
/// `limit` segments (not counting captures) are produced and the last one is
/// the rest of the subject.
pub(crate) fn split_n<'t, I>(subject: &'t str, matches: I, limit: usize) -> Vec<&'t str>
where
    I: Iterator<Item = Match<'t>>,
{
    let mut out = Vec::new();
    let mut last = 0;
    let mut segments = 1;
    for m in matches {
        if limit != 0 && segments >= limit {
            break;
        }
        let Some(span) = m.byte_range(0) else {
            continue;
        };
        out.push(&subject[last..span.start]);
        out.extend(m.subgroups().into_iter().flatten());
        last = span.end;
        segments += 1;
    }
    out.push(&subject[last..]);
    out
}

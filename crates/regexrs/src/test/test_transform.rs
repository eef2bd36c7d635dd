// Tests for replace and split
use crate::*;

const NAMES: &str = "Harry Trump ;Fred Barney; Helen Rigby ; Bill Abel ;Chris Hand";

fn digits_regex() -> Regex {
    "(.+?)([1,2,3]+)(.+?)".parse().unwrap()
}

#[test]
fn test_replace_all_template() {
    let r = Regex::new(
        "(.+?)([1,2,3]*)(.*)",
        RegexOptions::default(),
        &["letter", "digits", "rest"],
    )
    .unwrap();
    assert_eq!(r.replace_all("l321321alala", "$1-$2-$3"), "l-321321-alala");
    assert_eq!(
        r.replace_all("l321321alala", "${rest}/${letter}"),
        "alala/l"
    );
}

#[test]
fn test_replace_all_with_callback() {
    let replaced = digits_regex().replace_all_with("l321321la321a", |m| {
        if m.group(1) == Some("l") {
            None
        } else {
            Some(m.matched().to_uppercase())
        }
    });
    assert_eq!(replaced, "l321321lA321A");
}

#[test]
fn test_replace_first_template() {
    let replaced = digits_regex().replace_first("l321321la321a", "$1-$2-$3-");
    assert_eq!(replaced, "l-321321-l-a321a");
}

#[test]
fn test_replace_first_with_callback() {
    let r = digits_regex();
    let upper = r.replace_first_with("l321321la321a", |m| Some(m.matched().to_uppercase()));
    assert_eq!(upper, "L321321La321a");
    let unchanged = r.replace_first_with("l321321la321a", |_| None);
    assert_eq!(unchanged, "l321321la321a");
}

#[test]
fn test_replace_n() {
    let r = Regex::with_options("o", RegexOptions::empty()).unwrap();
    assert_eq!(r.replace_n("foo boo", 3, "0"), "f00 b0o");
    assert_eq!(r.replace_n("foo boo", 0, "0"), "f00 b00");
    let mut seen = 0;
    let out = r.replace_n_with("foo", 1, |_| {
        seen += 1;
        Some("O".to_string())
    });
    assert_eq!(out, "fOo");
    assert_eq!(seen, 1);
}

#[test]
fn test_replace_absent_group_is_empty() {
    let r = Regex::with_options("(a)|(b)", RegexOptions::empty()).unwrap();
    assert_eq!(r.replace_all("ab", "[$1|$2]"), "[a|][|b]");
    assert_eq!(r.replace_all("ab", "<$9>"), "<><>");
}

#[test]
fn test_replace_with_parsed_template() {
    let r = Regex::with_options("(\\w+)@(\\w+)", RegexOptions::empty()).unwrap();
    let template = Template::parse("$2 at \\$$1", r.captures_len());
    assert_eq!(r.replace_all("bob@home", &template), "home at $bob");
    let m = r.find_first("bob@home").unwrap();
    assert_eq!(m.expand("$2/$1"), "home/bob");
}

#[test]
fn test_replace_empty_matches() {
    let r = Regex::with_options("x*", RegexOptions::empty()).unwrap();
    assert_eq!(r.replace_all("abc", "-"), "-a-b-c-");
}

#[test]
fn test_replace_without_match_is_identity() {
    let r = Regex::with_options("z", RegexOptions::empty()).unwrap();
    assert_eq!(r.replace_all("abc", "Z"), "abc");
}

#[test]
fn test_split() {
    let r: Regex = "\\s*;\\s*".parse().unwrap();
    assert_eq!(
        r.split(NAMES),
        vec!["Harry Trump", "Fred Barney", "Helen Rigby", "Bill Abel", "Chris Hand"]
    );
}

#[test]
fn test_split_with_subgroups() {
    let r: Regex = "(\\d)".parse().unwrap();
    assert_eq!(
        r.split("Hello 1 word. Sentence number 2."),
        vec!["Hello ", "1", " word. Sentence number ", "2", "."]
    );
}

#[test]
fn test_split_skips_absent_groups() {
    let r = Regex::with_options("(,)|(;)", RegexOptions::empty()).unwrap();
    assert_eq!(r.split("a,b;c"), vec!["a", ",", "b", ";", "c"]);
}

#[test]
fn test_split_no_match() {
    let r = Regex::with_options(",", RegexOptions::empty()).unwrap();
    assert_eq!(r.split("abc"), vec!["abc"]);
    assert_eq!(r.split(""), vec![""]);
    assert_eq!(r.split(",a,"), vec!["", "a", ""]);
}

#[test]
fn test_splitn() {
    let r = Regex::with_options(",", RegexOptions::empty()).unwrap();
    assert_eq!(r.splitn("a,b,c,d", 2), vec!["a", "b,c,d"]);
    assert_eq!(r.splitn("a,b,c,d", 1), vec!["a,b,c,d"]);
    assert_eq!(r.splitn("a,b,c,d", 0), vec!["a", "b", "c", "d"]);
}

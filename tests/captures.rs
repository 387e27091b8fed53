use regex_backtrack::Ast;

use crate::util::find;

#[test]
fn backreference_matches_captured_text() {
    // ([ab]+)\1 on "abab": the group settles on "ab" so that the
    // backreference can consume the rest.
    let pattern = Ast::concat(vec![
        Ast::capture(Ast::plus(Ast::class("ab")), 1),
        Ast::backreference(1),
    ]);
    assert_eq!(Some((0, 4)), find(pattern, b"abab"));
}

#[test]
fn backreference_repeats_fixed_group_text() {
    // (ab)\1 requires "abab" exactly.
    let pattern = Ast::concat(vec![
        Ast::capture(Ast::literal("ab"), 1),
        Ast::backreference(1),
    ]);
    assert_eq!(Some((0, 4)), find(pattern, b"abab"));

    let pattern = Ast::concat(vec![
        Ast::capture(Ast::literal("ab"), 1),
        Ast::backreference(1),
    ]);
    assert_eq!(None, find(pattern, b"abba"));
}

#[test]
fn backreference_to_unset_group_matches_empty() {
    // ((a)|b)\2 on "b": group 2 never captures, so \2 consumes nothing.
    let pattern = Ast::concat(vec![
        Ast::capture(
            Ast::alternative(vec![
                Ast::capture(Ast::class("a"), 2),
                Ast::class("b"),
            ]),
            1,
        ),
        Ast::backreference(2),
    ]);
    assert_eq!(Some((0, 1)), find(pattern, b"b"));
}

#[test]
fn capture_survives_abandoned_branch() {
    // (?:(a)x|a)\1 on "aa". The first branch captures "a" and then fails
    // on the x; the capture is not undone when the branch is abandoned,
    // so the backreference still sees "a" after the second branch
    // matches. Scoping captures to the committed path would yield (0, 1)
    // here instead.
    let pattern = Ast::concat(vec![
        Ast::alternative(vec![
            Ast::concat(vec![
                Ast::capture(Ast::class("a"), 1),
                Ast::class("x"),
            ]),
            Ast::class("a"),
        ]),
        Ast::backreference(1),
    ]);
    assert_eq!(Some((0, 2)), find(pattern, b"aa"));
}

#[test]
fn later_capture_overwrites_earlier_one() {
    // ([ab])*\1: the group captures each repetition in turn and the
    // backreference sees whichever write was last, not the one from the
    // repetition count the star finally settles on.
    let pattern = Ast::concat(vec![
        Ast::star(Ast::capture(Ast::class("ab"), 1)),
        Ast::backreference(1),
    ]);
    assert_eq!(Some((0, 2)), find(pattern, b"ab"));
}

#[test]
fn groups_capture_independently() {
    // (a+)(b+)\2\1 on "aabbbbaa": group 1 = "aa", group 2 = "bb".
    let pattern = Ast::concat(vec![
        Ast::capture(Ast::plus(Ast::class("a")), 1),
        Ast::capture(Ast::plus(Ast::class("b")), 2),
        Ast::backreference(2),
        Ast::backreference(1),
    ]);
    assert_eq!(Some((0, 8)), find(pattern, b"aabbbbaa"));
}

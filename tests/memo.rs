use regex_backtrack::{Ast, Config, Encoding, ErrorKind, Matcher, Policy};

use crate::util::{find, find_with};

const ENCODINGS: &[Encoding] =
    &[Encoding::Dense, Encoding::Sparse, Encoding::RunLength];

const POLICIES: &[Policy] = &[
    Policy::None,
    Policy::All,
    Policy::HighInDegree,
    Policy::AncestorNodes,
];

/// (a|aa)+b: the classic exponential blowup shape for a plain
/// backtracking engine when the trailing b is missing.
fn blowup_pattern() -> Ast {
    Ast::concat(vec![
        Ast::plus(Ast::alternative(vec![
            Ast::literal("a"),
            Ast::literal("aa"),
        ])),
        Ast::class("b"),
    ])
}

#[test]
fn encodings_are_interchangeable() {
    let cases: &[(&[u8], Option<(usize, usize)>)] = &[
        (b"aaab", Some((0, 4))),
        (b"xxaab", Some((2, 5))),
        (b"", None),
        (b"b", None),
        (b"aaaaaaaaaaaaaaaaaaaaaa", None),
    ];
    for policy in POLICIES {
        for encoding in ENCODINGS {
            let config = Config::new().policy(*policy).encoding(*encoding);
            for (haystack, expected) in cases {
                assert_eq!(
                    *expected,
                    find_with(config, blowup_pattern(), haystack),
                    "policy {:?}, encoding {:?}, haystack {:?}",
                    policy,
                    encoding,
                    haystack,
                );
            }
        }
    }
}

// Memoisation makes the non-matching blowup case tractable: without it,
// giving up on a run of N a's requires exponentially many ways to carve
// the run into "a"s and "aa"s; with it, every (node, offset) pair is
// attempted once. A run of 300 a's finishes instantly when memoised and
// would not finish in any reasonable time unmemoised.
#[test]
fn memoisation_bounds_catastrophic_backtracking() {
    let haystack = vec![b'a'; 300];
    for encoding in ENCODINGS {
        let config = Config::new().policy(Policy::All).encoding(*encoding);
        assert_eq!(None, find_with(config, blowup_pattern(), &haystack));
    }
    let config = Config::new().policy(Policy::AncestorNodes);
    assert_eq!(None, find_with(config, blowup_pattern(), &haystack));
}

#[test]
fn policy_selects_which_nodes_prune() {
    // a{1,1}b searched in "aab" lands on the memoisation approximation:
    // at start offset 0 the repetition body fails its continuation at
    // offset 1 (as a second repetition, past the maximum), and the mark
    // left behind also covers offset 1's own attempt, where the same body
    // as a first repetition would have succeeded. Policies that track the
    // body therefore miss the match; policies that leave it untracked
    // find it. The mark surviving into the retried start offset is the
    // table's intended lifetime: one table serves the whole search.
    let pattern = || {
        Ast::concat(vec![
            Ast::repeat(Ast::class("a"), 1, Some(1)),
            Ast::class("b"),
        ])
    };
    assert_eq!(
        Some((1, 3)),
        find_with(Config::new().policy(Policy::None), pattern(), b"aab")
    );
    // No alternations, so nothing has in-degree > 1 and nothing is
    // tracked.
    assert_eq!(
        Some((1, 3)),
        find_with(Config::new().policy(Policy::HighInDegree), pattern(), b"aab")
    );
    // The repetition body is an ancestor node, so it is tracked.
    assert_eq!(
        None,
        find_with(Config::new().policy(Policy::AncestorNodes), pattern(), b"aab")
    );
    assert_eq!(
        None,
        find_with(Config::new().policy(Policy::All), pattern(), b"aab")
    );
}

#[test]
fn empty_matching_repeat_body_terminates_under_memoisation() {
    // (a*)* at the end of input would retry its inner star forever; the
    // pessimistic pre-attempt mark cuts the self-recursion off.
    let pattern = Ast::star(Ast::star(Ast::class("a")));
    assert_eq!(Some((0, 3)), find(pattern, b"aaa"));

    let pattern = Ast::star(Ast::star(Ast::class("a")));
    assert_eq!(Some((0, 0)), find(pattern, b"bbb"));
}

#[test]
fn unmemoised_empty_repeat_hits_the_recursion_limit() {
    // The same pattern with memoisation off is genuinely non-terminating
    // and must be reported as an abandoned search, not as "no match".
    let pattern = Ast::star(Ast::star(Ast::class("a")));
    let matcher = Matcher::builder()
        .configure(Config::new().policy(Policy::None).recursion_limit(200))
        .build(pattern)
        .unwrap();
    let err = matcher.find(b"aaa").unwrap_err();
    match *err.kind() {
        ErrorKind::RecursionLimit { limit } => assert_eq!(200, limit),
        ref kind => panic!("unexpected error kind: {:?}", kind),
    }
}

#[test]
fn star_patterns_agree_across_policies() {
    // For repetitions with min <= 1 and no bounded maximum, a body's
    // success at an offset does not depend on the repetition count, so
    // every policy reports the same result.
    let pattern = || {
        Ast::concat(vec![
            Ast::star(Ast::alternative(vec![
                Ast::class("a"),
                Ast::class("b"),
            ])),
            Ast::literal("abb"),
        ])
    };
    let haystacks: &[&[u8]] =
        &[b"abb", b"aababb", b"babababb", b"ab", b"", b"cabbc"];
    for haystack in haystacks {
        let expected =
            find_with(Config::new().policy(Policy::None), pattern(), haystack);
        for policy in POLICIES {
            assert_eq!(
                expected,
                find_with(Config::new().policy(*policy), pattern(), haystack),
                "policy {:?}, haystack {:?}",
                policy,
                haystack,
            );
        }
    }
}

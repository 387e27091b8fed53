use bstr::ByteSlice;

use regex_backtrack::{Ast, Config, Matcher};

/// Search with the default configuration and return the match span.
pub fn find(pattern: Ast, haystack: &[u8]) -> Option<(usize, usize)> {
    find_with(Config::new(), pattern, haystack)
}

/// Search with the given configuration and return the match span.
pub fn find_with(
    config: Config,
    pattern: Ast,
    haystack: &[u8],
) -> Option<(usize, usize)> {
    let matcher = Matcher::builder()
        .configure(config)
        .build(pattern)
        .expect("a valid pattern");
    match matcher.find(haystack) {
        Ok(result) => result.map(|m| (m.start(), m.end())),
        Err(err) => {
            panic!("search of {:?} failed: {}", haystack.as_bstr(), err)
        }
    }
}

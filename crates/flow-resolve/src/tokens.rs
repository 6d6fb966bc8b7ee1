//! Call-token scanning over method text.

use flow_core::source::blank_non_code;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Every identifier immediately followed by `.` in `text`, first occurrence
/// order, without repeats. Comments and string or char literals are ignored.
///
/// `repo.save(u.getId())` yields `repo`, `u`; `a.b.c()` yields `a`, `b`.
pub fn call_tokens(text: &str) -> Vec<String> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let token_re = TOKEN_RE.get_or_init(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*\.").unwrap());

    let code = blank_non_code(text);
    let bytes = code.as_bytes();
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for caps in token_re.captures_iter(&code) {
        let Some(ident) = caps.get(1) else {
            continue;
        };
        // Skip the tail of a numeric literal such as `1e3.`.
        if ident.start() > 0 && bytes[ident.start() - 1].is_ascii_digit() {
            continue;
        }
        // `...` varargs is not member access.
        if code[ident.end()..].trim_start().starts_with("..") {
            continue;
        }
        if seen.insert(ident.as_str()) {
            tokens.push(ident.as_str().to_string());
        }
    }
    tokens
}

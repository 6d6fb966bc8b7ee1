//! Offset-preserving helpers over raw Java source text.

/// Replace the contents of comments and string/char literals with spaces.
///
/// The result has the same byte length and the same line breaks as `text`,
/// so offsets and line numbers computed on it apply to the original.
/// Literal delimiters are kept; comment delimiters are blanked too.
pub fn blank_non_code(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str,
        TextBlock,
        Char,
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut state = State::Code;
    let mut i = 0;
    let blank = |b: u8| if b == b'\n' { b'\n' } else { b' ' };

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    out.extend_from_slice(b"  ");
                    i += 2;
                    state = State::LineComment;
                    continue;
                }
                (b'/', Some(b'*')) => {
                    out.extend_from_slice(b"  ");
                    i += 2;
                    state = State::BlockComment;
                    continue;
                }
                (b'"', _) if bytes[i..].starts_with(b"\"\"\"") => {
                    out.extend_from_slice(b"\"\"\"");
                    i += 3;
                    state = State::TextBlock;
                    continue;
                }
                (b'"', _) => {
                    out.push(b);
                    state = State::Str;
                }
                (b'\'', _) => {
                    out.push(b);
                    state = State::Char;
                }
                _ => out.push(b),
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                }
                out.push(blank(b));
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    out.extend_from_slice(b"  ");
                    i += 2;
                    state = State::Code;
                    continue;
                }
                out.push(blank(b));
            }
            State::Str | State::Char => {
                let close = if state == State::Str { b'"' } else { b'\'' };
                if b == b'\\' && next.is_some_and(|n| n != b'\n') {
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                if b == close {
                    out.push(b);
                    state = State::Code;
                } else if b == b'\n' {
                    // Unterminated literal: resume scanning code on the next line.
                    out.push(b);
                    state = State::Code;
                } else {
                    out.push(b' ');
                }
            }
            State::TextBlock => {
                if b == b'\\' && next.is_some() {
                    out.push(b' ');
                    out.push(blank(bytes[i + 1]));
                    i += 2;
                    continue;
                }
                if bytes[i..].starts_with(b"\"\"\"") {
                    out.extend_from_slice(b"\"\"\"");
                    i += 3;
                    state = State::Code;
                    continue;
                }
                out.push(blank(b));
            }
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Given the byte offset of a `{` in blanked text, return the offset just
/// past its matching `}`.
pub fn matching_brace(code: &str, open: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// 1-based line number of byte offset `byte`.
pub fn line_at(text: &str, byte: usize) -> usize {
    let end = byte.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_preserves_length_and_lines() {
        let src = "a.b(\"x.y\"); // c.d\n/* e.f\n */ g.h('.');";
        let out = blank_non_code(src);
        assert_eq!(out.len(), src.len());
        assert_eq!(out.lines().count(), src.lines().count());
        assert!(out.contains("a.b("));
        assert!(out.contains("g.h("));
        assert!(!out.contains("x.y"));
        assert!(!out.contains("c.d"));
        assert!(!out.contains("e.f"));
    }

    #[test]
    fn test_blank_handles_escapes_and_text_blocks() {
        let src = "s = \"a\\\"b.c\"; t = \"\"\"\n  x.y\n\"\"\"; u.v();";
        let out = blank_non_code(src);
        assert_eq!(out.len(), src.len());
        assert!(!out.contains("b.c"));
        assert!(!out.contains("x.y"));
        assert!(out.contains("u.v()"));
    }

    #[test]
    fn test_blank_keeps_multibyte_offsets() {
        let src = "x = \"héllo\"; y.z();";
        let out = blank_non_code(src);
        assert_eq!(out.len(), src.len());
        assert_eq!(out.find("y.z"), src.find("y.z"));
    }

    #[test]
    fn test_matching_brace() {
        let code = "class A { void f() { } }";
        let open = code.find('{').unwrap();
        assert_eq!(matching_brace(code, open), Some(code.len()));
        assert_eq!(matching_brace("{ {", 0), None);
        assert_eq!(matching_brace("x", 0), None);
    }

    #[test]
    fn test_line_at() {
        let text = "a\nb\nc";
        assert_eq!(line_at(text, 0), 1);
        assert_eq!(line_at(text, 2), 2);
        assert_eq!(line_at(text, 4), 3);
        assert_eq!(line_at(text, 100), 3);
    }
}

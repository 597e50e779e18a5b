//! Balanced-delimiter scanning for brace-style blocks.
//!
//! This is not a parser. It knows just enough Rust lexing to keep delimiters
//! inside string literals, raw strings, char literals and comments from being
//! counted, which is where flat regexes go wrong on real code.

/// Find the offset of the delimiter that closes a block.
///
/// `from` is the offset just past the opening delimiter. Returns `None` when
/// the text ends before the block is closed, including when it ends inside an
/// unterminated literal or comment.
pub fn find_closing(text: &str, from: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = from;

    while i < bytes.len() {
        if let Some(end) = skip_opaque(text, i) {
            i = end;
            continue;
        }

        let b = bytes[i];
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }

    None
}

/// Blank out everything that is not at nesting depth zero.
///
/// The result has the same length as `body`. Literals, comments and the
/// contents of nested `()`, `[]` and `{}` groups become spaces (newlines are
/// kept), so a search over the result only sees top-level tokens. The nested
/// group delimiters themselves are kept at depth zero.
pub fn top_level(body: &str) -> String {
    let bytes = body.as_bytes();
    let mut out = bytes.to_vec();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = skip_opaque(body, i) {
            blank(&mut out[i..end]);
            i = end;
            continue;
        }

        match bytes[i] {
            b'(' | b'[' | b'{' => {
                if depth > 0 {
                    out[i] = b' ';
                }
                depth += 1;
            }
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth > 0 {
                    out[i] = b' ';
                }
            }
            b'\n' => {}
            _ if depth > 0 => out[i] = b' ',
            _ => {}
        }
        i += 1;
    }

    // Only ASCII bytes were written over whole characters, so this is lossless.
    String::from_utf8_lossy(&out).into_owned()
}

/// Offset just past the last token of `text`, ignoring trailing whitespace
/// and comments. Literals count as tokens. Returns 0 when `text` holds only
/// whitespace and comments.
pub fn code_end(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(next) = skip_opaque(text, i) {
            if bytes[i] != b'/' {
                end = next;
            }
            i = next;
            continue;
        }

        let Some(c) = text.get(i..).and_then(|rest| rest.chars().next()) else {
            break;
        };
        i += c.len_utf8();
        if !c.is_whitespace() {
            end = i;
        }
    }

    end
}

fn blank(region: &mut [u8]) {
    for b in region.iter_mut().filter(|b| **b != b'\n') {
        *b = b' ';
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// If a literal or comment starts at `i`, return the offset just past it.
fn skip_opaque(text: &str, i: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let len = bytes.len();

    match bytes[i] {
        b'/' if bytes.get(i + 1) == Some(&b'/') => {
            Some(memchr_from(bytes, i + 2, b'\n').unwrap_or(len))
        }
        b'/' if bytes.get(i + 1) == Some(&b'*') => Some(skip_block_comment(bytes, i + 2)),
        b'"' => Some(skip_string(bytes, i + 1)),
        b'r' | b'b' if i == 0 || !is_ident_byte(bytes[i - 1]) => skip_raw_string(bytes, i),
        b'\'' => skip_char_literal(text, i),
        _ => None,
    }
}

fn memchr_from(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|p| from + p)
}

fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 1usize;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// `r"..."`, `r#"..."#`, `br##"..."##` and friends.
fn skip_raw_string(bytes: &[u8], i: usize) -> Option<usize> {
    let mut p = i;
    if bytes[p] == b'b' {
        p += 1;
    }
    if bytes.get(p) != Some(&b'r') {
        return None;
    }
    p += 1;

    let hashes = bytes[p..].iter().take_while(|&&b| b == b'#').count();
    p += hashes;
    if bytes.get(p) != Some(&b'"') {
        return None;
    }
    p += 1;

    while p < bytes.len() {
        if bytes[p] == b'"' {
            let closing = &bytes[p + 1..];
            if closing.len() >= hashes && closing[..hashes].iter().all(|&b| b == b'#') {
                return Some(p + 1 + hashes);
            }
        }
        p += 1;
    }
    Some(bytes.len())
}

/// Char literals (`'{'`, `'\''`, `'\u{7d}'`). Lifetimes and labels return `None`.
fn skip_char_literal(text: &str, i: usize) -> Option<usize> {
    let bytes = text.as_bytes();

    if bytes.get(i + 1) == Some(&b'\\') {
        return Some(memchr_from(bytes, i + 3, b'\'').map_or(bytes.len(), |p| p + 1));
    }

    let c = text.get(i + 1..)?.chars().next()?;
    let after = i + 1 + c.len_utf8();
    if bytes.get(after) == Some(&b'\'') {
        Some(after + 1)
    } else {
        None
    }
}

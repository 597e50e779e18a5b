use crate::pattern::errors::PatternError;
use crate::pattern::scanner::find_closing;
use regex::{Captures, Regex};
use std::ops::Range;

/// A captured group within a [`Match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Group name, or its index for unnamed groups
    pub name: String,
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
}

/// A located candidate region in a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Byte range of the entire match in the scanned text
    pub byte_start: usize,
    pub byte_end: usize,
    /// The matched text
    pub text: String,
    /// Captured groups in group order
    pub captures: Vec<Capture>,
}

impl Match {
    /// Text of the named capture, if that group participated.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.capture(name).map(|c| c.text.as_str())
    }

    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.iter().find(|c| c.name == name)
    }

    pub fn span(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }
}

/// Lazy sequence of matches for one scan of one text.
pub type Matches<'a> = Box<dyn Iterator<Item = Match> + 'a>;

/// A structural description of text to find.
///
/// Implementations must yield matches left to right with each match starting
/// no earlier than the end of the previous one. Calling `find_iter` again on
/// the same text restarts the scan from the beginning.
pub trait Pattern {
    fn find_iter<'a>(&'a self, text: &'a str) -> Matches<'a>;
}

/// Scan `text` with `pattern`.
pub fn match_all<'a, P: Pattern + ?Sized>(text: &'a str, pattern: &'a P) -> Matches<'a> {
    pattern.find_iter(text)
}

/// Flat regular-expression pattern with named or positional groups.
///
/// Uses leftmost-first, non-overlapping regex semantics. Patterns that need
/// to span lines must say so themselves (`(?m)`, `\n`, `(?s)`).
#[derive(Debug, Clone)]
pub struct RegexPattern {
    regex: Regex,
}

impl RegexPattern {
    pub fn new(source: &str) -> Result<Self, PatternError> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }
}

impl Pattern for RegexPattern {
    fn find_iter<'a>(&'a self, text: &'a str) -> Matches<'a> {
        let names: Vec<Option<&'a str>> = self.regex.capture_names().collect();
        Box::new(
            self.regex
                .captures_iter(text)
                .filter_map(move |caps| from_captures(&caps, &names)),
        )
    }
}

fn from_captures(caps: &Captures<'_>, names: &[Option<&str>]) -> Option<Match> {
    let whole = caps.get(0)?;
    let captures = names
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, name)| {
            let group = caps.get(index)?;
            Some(Capture {
                name: name.map_or_else(|| index.to_string(), str::to_string),
                byte_start: group.start(),
                byte_end: group.end(),
                text: group.as_str().to_string(),
            })
        })
        .collect();

    Some(Match {
        byte_start: whole.start(),
        byte_end: whole.end(),
        text: whole.as_str().to_string(),
        captures,
    })
}

/// A delimited block located by balanced-delimiter scanning.
///
/// A candidate starts where `head` matches (the head is always followed by
/// the opening delimiter), extends to the delimiter that balances it, and
/// must be followed immediately by `tail`. Candidates that lack the tail are
/// dropped and scanning resumes inside them. A block that never closes ends
/// the scan: every later candidate would sit inside it.
///
/// Captures: `head` (through the opening delimiter), `body` (between the
/// delimiters), `tail` (closing delimiter through the tail).
#[derive(Debug, Clone)]
pub struct BlockPattern {
    head: Regex,
    tail: Regex,
    open: u8,
    close: u8,
}

impl BlockPattern {
    pub fn new(head: &str, open: char, close: char, tail: &str) -> Result<Self, PatternError> {
        if open == close || !open.is_ascii_punctuation() || !close.is_ascii_punctuation() {
            return Err(PatternError::InvalidDelimiters { open, close });
        }

        let head = Regex::new(&format!(
            "(?:{head}){}",
            regex::escape(open.encode_utf8(&mut [0; 4]))
        ))?;
        let tail = Regex::new(&format!("^(?:{tail})"))?;

        Ok(Self {
            head,
            tail,
            open: open as u8,
            close: close as u8,
        })
    }
}

impl Pattern for BlockPattern {
    fn find_iter<'a>(&'a self, text: &'a str) -> Matches<'a> {
        Box::new(BlockMatches {
            pattern: self,
            text,
            pos: 0,
        })
    }
}

struct BlockMatches<'a> {
    pattern: &'a BlockPattern,
    text: &'a str,
    pos: usize,
}

impl Iterator for BlockMatches<'_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        let text = self.text;
        let (open, close) = (self.pattern.open, self.pattern.close);

        while self.pos <= text.len() {
            let opener = self.pattern.head.find_at(text, self.pos)?;
            let body_start = opener.end();

            let Some(close_at) = find_closing(text, body_start, open, close) else {
                self.pos = text.len() + 1;
                return None;
            };

            let after_close = close_at + 1;
            let Some(tail) = self.pattern.tail.find(&text[after_close..]) else {
                self.pos = body_start;
                continue;
            };

            let byte_start = opener.start();
            let byte_end = after_close + tail.end();
            self.pos = byte_end;

            let capture = |name: &str, range: Range<usize>| Capture {
                name: name.to_string(),
                byte_start: range.start,
                byte_end: range.end,
                text: text[range].to_string(),
            };

            return Some(Match {
                byte_start,
                byte_end,
                text: text[byte_start..byte_end].to_string(),
                captures: vec![
                    capture("head", byte_start..body_start),
                    capture("body", body_start..close_at),
                    capture("tail", close_at..byte_end),
                ],
            });
        }
        None
    }
}

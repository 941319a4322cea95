//! Incremental lexical scanner with a constrained, practical grammar.
//!
//! Input arrives in arbitrary chunks. Markup whose end has not arrived yet is
//! held back until the next chunk (or end of input), so the event sequence does
//! not depend on where chunks are split. Literal text is accumulated and only
//! emitted once the next markup construct (or a flush) ends the run.
//!
//! Known limitations (intentional):
//! - Tag names are restricted to ASCII `[A-Za-z0-9:_-]`.
//! - No entity decoding: text and attribute values are kept as written.
//! - `script`, `style`, `textarea` and `title` bodies are raw text, closed by
//!   the matching close tag followed only by ASCII whitespace and `>`.
//! - Unterminated markup at end of input becomes literal text, except an
//!   unterminated comment, which runs to end of input.

use crate::dom::{Attribute, QuoteStyle};
use crate::event::{Event, EventKind};
use crate::symbol::{Symbol, SymbolTable};
use memchr::{memchr, memchr_iter, memmem, memrchr};

const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";
const CDATA_OPEN: &[u8] = b"<![CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";

fn rawtext_close_tag(name: &str) -> Option<&'static [u8]> {
    match name {
        "script" => Some(b"</script"),
        "style" => Some(b"</style"),
        "textarea" => Some(b"</textarea"),
        "title" => Some(b"</title"),
        _ => None,
    }
}

fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_attr_name_char(b: u8) -> bool {
    !(b.is_ascii_whitespace() || matches!(b, b'/' | b'>' | b'=' | b'"' | b'\'' | b'<'))
}

fn count_newlines(text: &str) -> u32 {
    memchr_iter(b'\n', text.as_bytes()).count() as u32
}

// Only attempts matches at ASCII `<`, which never occurs inside a UTF-8
// continuation byte.
fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let len = bytes.len();
    let n = close_tag.len();
    debug_assert!(n >= 2 && close_tag.starts_with(b"</") && close_tag.is_ascii());
    let mut i = 0;
    while i + n <= len {
        i += memchr(b'<', &bytes[i..])?;
        if i + n > len {
            return None;
        }
        if bytes[i..i + n].eq_ignore_ascii_case(close_tag) {
            let mut k = i + n;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Find `close` in `bytes` past `body_start`, skipping the first `resume`
/// bytes (less any overlap a split terminator needs). Returns the offset
/// relative to `body_start`.
fn find_close(bytes: &[u8], body_start: usize, close: &[u8], resume: usize) -> Option<usize> {
    let from = resume
        .saturating_sub(close.len() - 1)
        .max(body_start)
        .min(bytes.len());
    memmem::find(&bytes[from..], close).map(|at| from + at - body_start)
}

fn could_start_close_tag(tail: &[u8], close_tag: &[u8]) -> bool {
    let n = tail.len().min(close_tag.len());
    tail[..n].eq_ignore_ascii_case(&close_tag[..n])
        && tail[n..].iter().all(|b| b.is_ascii_whitespace())
}

#[derive(Clone, Copy, Debug)]
struct RawText {
    name: Symbol,
    close_tag: &'static [u8],
}

enum Scan {
    /// Literal text of the given byte length.
    Text(usize),
    /// A complete markup construct.
    Markup { len: usize, kind: EventKind },
    /// Markup whose end has not arrived yet.
    Incomplete,
}

struct RawAttribute<'a> {
    name: &'a str,
    value: Option<&'a str>,
    quote: QuoteStyle,
}

struct RawStartTag<'a> {
    name: &'a str,
    attributes: Vec<RawAttribute<'a>>,
    self_closing: bool,
    len: usize,
}

/// Chunk-fed scanner turning text into [`Event`]s.
#[derive(Debug)]
pub(crate) struct HtmlLexer {
    pending: String,
    text: String,
    text_line: u32,
    line: u32,
    rawtext: Option<RawText>,
    /// Length of the held-back construct already searched for its end.
    held: usize,
}

impl HtmlLexer {
    pub(crate) fn new() -> Self {
        Self {
            pending: String::new(),
            text: String::new(),
            text_line: 1,
            line: 1,
            rawtext: None,
            held: 0,
        }
    }

    /// Scan as much of `chunk` (plus held-back input) as is unambiguous.
    pub(crate) fn feed(&mut self, chunk: &str, symbols: &mut SymbolTable, out: &mut Vec<Event>) {
        self.pending.push_str(chunk);
        // Held markup whose kind is already known can only end at a `>`.
        if self.held > CDATA_OPEN.len() && memchr(b'>', chunk.as_bytes()).is_none() {
            self.held = self.pending.len();
            return;
        }
        self.run(symbols, out, false);
    }

    /// Line the scanner has reached (1-based).
    pub(crate) fn line(&self) -> u32 {
        self.line
    }

    /// Emit the literal text accumulated so far.
    pub(crate) fn flush_text(&mut self, out: &mut Vec<Event>) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        out.push(Event::characters(text).at_line(self.text_line));
    }

    /// Consume everything that is left; no input is held back afterwards.
    pub(crate) fn finish(&mut self, symbols: &mut SymbolTable, out: &mut Vec<Event>) {
        self.run(symbols, out, true);
        self.flush_text(out);
        self.rawtext = None;
    }

    fn run(&mut self, symbols: &mut SymbolTable, out: &mut Vec<Event>, at_eof: bool) {
        let mut pending = std::mem::take(&mut self.pending);
        let consumed = self.scan(&pending, symbols, out, at_eof);
        pending.drain(..consumed);
        self.pending = pending;
    }

    fn scan(
        &mut self,
        input: &str,
        symbols: &mut SymbolTable,
        out: &mut Vec<Event>,
        at_eof: bool,
    ) -> usize {
        let resume = std::mem::take(&mut self.held);
        let mut pos = 0;
        while pos < input.len() {
            if let Some(raw) = self.rawtext {
                let rest = &input[pos..];
                match find_rawtext_close_tag(rest, raw.close_tag) {
                    Some((start, end)) => {
                        self.push_text(&rest[..start]);
                        self.flush_text(out);
                        out.push(Event::close_tag(raw.name).at_line(self.line));
                        self.advance(&rest[start..end]);
                        self.rawtext = None;
                        pos += end;
                        continue;
                    }
                    None if at_eof => {
                        self.push_text(rest);
                        pos = input.len();
                    }
                    None => {
                        // Only a trailing partial close tag has to wait for
                        // more input.
                        let bytes = rest.as_bytes();
                        let safe = match memrchr(b'<', bytes) {
                            Some(lt) if could_start_close_tag(&bytes[lt..], raw.close_tag) => lt,
                            _ => rest.len(),
                        };
                        self.push_text(&rest[..safe]);
                        pos += safe;
                    }
                }
                break;
            }

            let rest = &input[pos..];
            let resume = if pos == 0 { resume } else { 0 };
            match self.scan_construct(rest, symbols, at_eof, resume) {
                Scan::Text(len) => {
                    debug_assert!(rest.is_char_boundary(len));
                    self.push_text(&rest[..len]);
                    pos += len;
                }
                Scan::Markup { len, kind } => {
                    self.flush_text(out);
                    if let EventKind::OpenTag {
                        name,
                        self_closing: false,
                        ..
                    } = &kind
                    {
                        if let Some(close_tag) =
                            symbols.resolve(*name).and_then(rawtext_close_tag)
                        {
                            self.rawtext = Some(RawText {
                                name: *name,
                                close_tag,
                            });
                        }
                    }
                    log::trace!(target: "html_parse.lexer", "event at line {}: {kind:?}", self.line);
                    out.push(Event::new(kind).at_line(self.line));
                    self.advance(&rest[..len]);
                    pos += len;
                }
                Scan::Incomplete => {
                    self.held = rest.len();
                    break;
                }
            }
        }
        pos
    }

    /// `resume` bytes of `rest` are known to hold no terminator.
    fn scan_construct(
        &self,
        rest: &str,
        symbols: &mut SymbolTable,
        at_eof: bool,
        resume: usize,
    ) -> Scan {
        let bytes = rest.as_bytes();
        if bytes[0] != b'<' {
            return Scan::Text(memchr(b'<', bytes).unwrap_or(bytes.len()));
        }
        let held = || {
            if at_eof {
                Scan::Text(bytes.len())
            } else {
                Scan::Incomplete
            }
        };
        if bytes.len() == 1 {
            return held();
        }
        match bytes[1] {
            b'!' => {
                if bytes.starts_with(COMMENT_OPEN) {
                    return match find_close(bytes, COMMENT_OPEN.len(), COMMENT_CLOSE, resume) {
                        Some(end) => Scan::Markup {
                            len: COMMENT_OPEN.len() + end + COMMENT_CLOSE.len(),
                            kind: EventKind::Comment(
                                rest[COMMENT_OPEN.len()..COMMENT_OPEN.len() + end].to_string(),
                            ),
                        },
                        None if at_eof => Scan::Markup {
                            len: bytes.len(),
                            kind: EventKind::Comment(rest[COMMENT_OPEN.len()..].to_string()),
                        },
                        None => Scan::Incomplete,
                    };
                }
                if bytes.starts_with(CDATA_OPEN) {
                    return match find_close(bytes, CDATA_OPEN.len(), CDATA_CLOSE, resume) {
                        Some(end) => Scan::Markup {
                            len: CDATA_OPEN.len() + end + CDATA_CLOSE.len(),
                            kind: EventKind::Cdata(
                                rest[CDATA_OPEN.len()..CDATA_OPEN.len() + end].to_string(),
                            ),
                        },
                        None => held(),
                    };
                }
                if COMMENT_OPEN.starts_with(bytes) || CDATA_OPEN.starts_with(bytes) {
                    return held();
                }
                scan_directive(rest, 2, at_eof)
            }
            b'?' => scan_directive(rest, 2, at_eof),
            b'/' => {
                if bytes.len() == 2 {
                    return held();
                }
                if !bytes[2].is_ascii_alphabetic() {
                    return Scan::Text(1);
                }
                let mut j = 2;
                while j < bytes.len() && is_tag_name_char(bytes[j]) {
                    j += 1;
                }
                match memchr(b'>', &bytes[j..]) {
                    Some(gt) => Scan::Markup {
                        len: j + gt + 1,
                        kind: EventKind::CloseTag {
                            name: symbols.intern_name(&rest[2..j]),
                        },
                    },
                    None => held(),
                }
            }
            b if b.is_ascii_alphabetic() => match parse_start_tag(rest) {
                Some(tag) => Scan::Markup {
                    len: tag.len,
                    kind: EventKind::OpenTag {
                        name: symbols.intern_name(tag.name),
                        attributes: tag
                            .attributes
                            .iter()
                            .map(|attr| Attribute {
                                name: symbols.intern_name(attr.name),
                                value: attr.value.map(str::to_string),
                                quote: attr.quote,
                            })
                            .collect(),
                        self_closing: tag.self_closing,
                    },
                },
                None => held(),
            },
            _ => Scan::Text(1),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.text.is_empty() {
            self.text_line = self.line;
        }
        self.text.push_str(text);
        self.advance(text);
    }

    fn advance(&mut self, consumed: &str) {
        self.line += count_newlines(consumed);
    }
}

fn scan_directive(rest: &str, body_start: usize, at_eof: bool) -> Scan {
    match memchr(b'>', rest.as_bytes()) {
        Some(gt) => Scan::Markup {
            len: gt + 1,
            kind: EventKind::Directive(rest[body_start.min(gt)..gt].to_string()),
        },
        None if at_eof => Scan::Text(rest.len()),
        None => Scan::Incomplete,
    }
}

/// Parse `<name attr=value ...>` at the start of `input`.
///
/// Returns `None` when the tag is not terminated within `input`. Nothing is
/// interned here, so held-back tags never grow the symbol table.
fn parse_start_tag(input: &str) -> Option<RawStartTag<'_>> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    debug_assert!(bytes[0] == b'<' && bytes[1].is_ascii_alphabetic());

    let mut k = 1;
    while k < len && is_tag_name_char(bytes[k]) {
        k += 1;
    }
    let name = &input[1..k];
    let mut attributes = Vec::new();
    let mut self_closing = false;

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            return None;
        }
        match bytes[k] {
            b'>' => {
                k += 1;
                break;
            }
            b'/' => {
                if k + 1 >= len {
                    return None;
                }
                if bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            _ => {}
        }

        let name_start = k;
        while k < len && is_attr_name_char(bytes[k]) {
            k += 1;
        }
        if k >= len {
            return None;
        }
        if name_start == k {
            // Stray `=`, quote or `<` where a name should start.
            k += 1;
            continue;
        }
        let attr_name = &input[name_start..k];

        skip_whitespace(&mut k);
        if k >= len {
            return None;
        }
        if bytes[k] != b'=' {
            attributes.push(RawAttribute {
                name: attr_name,
                value: None,
                quote: QuoteStyle::None,
            });
            continue;
        }
        k += 1;
        skip_whitespace(&mut k);
        if k >= len {
            return None;
        }
        let (value, quote) = if bytes[k] == b'"' || bytes[k] == b'\'' {
            let quote_byte = bytes[k];
            let value_start = k + 1;
            let value_end = value_start + memchr(quote_byte, &bytes[value_start..])?;
            k = value_end + 1;
            let quote = if quote_byte == b'"' {
                QuoteStyle::Double
            } else {
                QuoteStyle::Single
            };
            (&input[value_start..value_end], quote)
        } else {
            let value_start = k;
            while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                    break;
                }
                k += 1;
            }
            if k >= len {
                return None;
            }
            (&input[value_start..k], QuoteStyle::None)
        };
        attributes.push(RawAttribute {
            name: attr_name,
            value: Some(value),
            quote,
        });
    }

    Some(RawStartTag {
        name,
        attributes,
        self_closing,
        len: k,
    })
}

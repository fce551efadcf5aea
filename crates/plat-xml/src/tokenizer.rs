//! Incremental markup tokenizer.
//!
//! Consumes raw bytes in arbitrary chunk sizes and yields open/close
//! tag events. The document dialect is element-and-attribute only:
//! character data between elements is skipped, as are comments,
//! declarations and doctypes. Input must be UTF-8; multi-byte
//! sequences may straddle chunk boundaries and are reassembled here.
//!
//! Positions are tracked as 1-based lines and 0-based columns, counted
//! in characters. Events carry the position of their opening `<`;
//! errors carry the position of the offending character.

use crate::error::ParseError;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Longest character reference we accept between `&` and `;`.
const MAX_ENTITY_LEN: usize = 10;

/// A single `name="value"` pair from a tag, with character references
/// in the value already decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Attribute {
    pub(crate) name: String,
    pub(crate) value: String,
}

/// A tag boundary found in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MarkupEvent {
    /// An open tag, `<name ...>` or `<name .../>`.
    Open {
        name: String,
        attributes: SmallVec<[Attribute; 8]>,
        self_closing: bool,
        line: u64,
        column: u64,
    },
    /// A close tag, `</name>`.
    Close {
        name: String,
        line: u64,
        column: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Text,
    MarkupStart,
    OpenName,
    InTag,
    AttrName,
    AfterAttrName,
    BeforeAttrValue,
    AttrValue { quote: char },
    AttrEntity { quote: char },
    SelfClosing,
    CloseStart,
    CloseName,
    AfterCloseName,
    Declaration,
    DeclarationQuery,
    BangStart,
    CommentOpen,
    Comment,
    CommentDash,
    CommentDashDash,
    Doctype { brackets: u8 },
}

/// The tokenizer proper. Feed it byte chunks, drain events between
/// feeds, and call [`Tokenizer::finish`] once the input is exhausted.
///
/// Errors are fatal for the document; feeding more input after one is
/// unsupported.
pub(crate) struct Tokenizer {
    state: State,
    line: u64,
    column: u64,
    // Position of the '<' that opened the markup being read.
    mark_line: u64,
    mark_column: u64,
    // Partial UTF-8 sequence carried across a chunk boundary.
    utf8: [u8; 4],
    utf8_len: u8,
    utf8_need: u8,
    name: String,
    attrs: SmallVec<[Attribute; 8]>,
    attr_name: String,
    attr_value: String,
    entity: String,
    events: VecDeque<MarkupEvent>,
}

impl Tokenizer {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Text,
            line: 1,
            column: 0,
            mark_line: 1,
            mark_column: 0,
            utf8: [0; 4],
            utf8_len: 0,
            utf8_need: 0,
            name: String::new(),
            attrs: SmallVec::new(),
            attr_name: String::new(),
            attr_value: String::new(),
            entity: String::new(),
            events: VecDeque::new(),
        }
    }

    /// Consume a chunk of input, queuing any events it completes.
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        for &byte in bytes {
            if let Some(c) = self.decode(byte)? {
                self.step(c)?;
                self.advance(c);
            }
        }
        Ok(())
    }

    /// Pop the next queued event, oldest first.
    pub(crate) fn next_event(&mut self) -> Option<MarkupEvent> {
        self.events.pop_front()
    }

    /// Validate that the input ended on a clean boundary.
    pub(crate) fn finish(&mut self) -> Result<(), ParseError> {
        if self.utf8_need > 0 {
            return Err(self.error("truncated UTF-8 sequence"));
        }
        if self.state != State::Text {
            return Err(self.error("unexpected end of document inside markup"));
        }
        Ok(())
    }

    /// The position one past the last character consumed.
    pub(crate) fn position(&self) -> (u64, u64) {
        (self.line, self.column)
    }

    fn error(&self, detail: impl Into<String>) -> ParseError {
        ParseError::markup(self.line, self.column, detail)
    }

    /// Run one byte through the UTF-8 decoder. Returns a scalar once a
    /// full sequence has been seen.
    fn decode(&mut self, byte: u8) -> Result<Option<char>, ParseError> {
        if self.utf8_need > 0 {
            if byte & 0xc0 != 0x80 {
                return Err(self.error("invalid UTF-8 sequence"));
            }
            self.utf8[self.utf8_len as usize] = byte;
            self.utf8_len += 1;
            self.utf8_need -= 1;
            if self.utf8_need > 0 {
                return Ok(None);
            }
            let complete = &self.utf8[..self.utf8_len as usize];
            // from_utf8 still rejects overlong forms and surrogates
            // that a lead-byte check alone would let through.
            let c = match std::str::from_utf8(complete).ok().and_then(|s| s.chars().next()) {
                Some(c) => c,
                None => return Err(self.error("invalid UTF-8 sequence")),
            };
            self.utf8_len = 0;
            return Ok(Some(c));
        }
        match byte {
            0x00 => Err(self.error("NUL byte in document")),
            0x01..=0x7f => Ok(Some(byte as char)),
            0xc2..=0xdf => {
                self.begin_sequence(byte, 1);
                Ok(None)
            }
            0xe0..=0xef => {
                self.begin_sequence(byte, 2);
                Ok(None)
            }
            0xf0..=0xf4 => {
                self.begin_sequence(byte, 3);
                Ok(None)
            }
            _ => Err(self.error("invalid UTF-8 sequence")),
        }
    }

    fn begin_sequence(&mut self, lead: u8, continuations: u8) {
        self.utf8[0] = lead;
        self.utf8_len = 1;
        self.utf8_need = continuations;
    }

    fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    fn step(&mut self, c: char) -> Result<(), ParseError> {
        match self.state {
            State::Text => {
                // Character data is not significant in this dialect.
                if c == '<' {
                    self.mark_line = self.line;
                    self.mark_column = self.column;
                    self.state = State::MarkupStart;
                }
            }
            State::MarkupStart => match c {
                '/' => self.state = State::CloseStart,
                '?' => self.state = State::Declaration,
                '!' => self.state = State::BangStart,
                c if is_name_start(c) => {
                    self.name.push(c);
                    self.state = State::OpenName;
                }
                _ => return Err(self.error(format!("unexpected character '{c}' after '<'"))),
            },
            State::OpenName => match c {
                c if is_name_char(c) => self.name.push(c),
                c if c.is_ascii_whitespace() => self.state = State::InTag,
                '>' => self.emit_open(false),
                '/' => self.state = State::SelfClosing,
                _ => {
                    return Err(self.error(format!("unexpected character '{c}' in element name")));
                }
            },
            State::InTag => match c {
                c if c.is_ascii_whitespace() => {}
                c if is_name_start(c) => {
                    self.attr_name.push(c);
                    self.state = State::AttrName;
                }
                '>' => self.emit_open(false),
                '/' => self.state = State::SelfClosing,
                _ => return Err(self.error(format!("unexpected character '{c}' in tag"))),
            },
            State::AttrName => match c {
                c if is_name_char(c) => self.attr_name.push(c),
                '=' => self.state = State::BeforeAttrValue,
                c if c.is_ascii_whitespace() => self.state = State::AfterAttrName,
                _ => {
                    return Err(
                        self.error(format!("unexpected character '{c}' in attribute name"))
                    );
                }
            },
            State::AfterAttrName => match c {
                c if c.is_ascii_whitespace() => {}
                '=' => self.state = State::BeforeAttrValue,
                _ => return Err(self.error("expected '=' after attribute name")),
            },
            State::BeforeAttrValue => match c {
                c if c.is_ascii_whitespace() => {}
                '"' | '\'' => self.state = State::AttrValue { quote: c },
                _ => return Err(self.error("attribute value must be quoted")),
            },
            State::AttrValue { quote } => match c {
                c if c == quote => {
                    self.push_attribute();
                    self.state = State::InTag;
                }
                '&' => self.state = State::AttrEntity { quote },
                '<' => return Err(self.error("unescaped '<' in attribute value")),
                _ => self.attr_value.push(c),
            },
            State::AttrEntity { quote } => match c {
                ';' => {
                    let decoded = self.decode_entity()?;
                    self.attr_value.push(decoded);
                    self.state = State::AttrValue { quote };
                }
                c if c.is_ascii_alphanumeric() || c == '#' => {
                    if self.entity.len() >= MAX_ENTITY_LEN {
                        return Err(self.error("invalid character reference"));
                    }
                    self.entity.push(c);
                }
                _ => return Err(self.error("invalid character reference")),
            },
            State::SelfClosing => match c {
                '>' => self.emit_open(true),
                _ => return Err(self.error("expected '>' after '/'")),
            },
            State::CloseStart => match c {
                c if is_name_start(c) => {
                    self.name.push(c);
                    self.state = State::CloseName;
                }
                _ => return Err(self.error("expected an element name")),
            },
            State::CloseName => match c {
                c if is_name_char(c) => self.name.push(c),
                '>' => self.emit_close(),
                c if c.is_ascii_whitespace() => self.state = State::AfterCloseName,
                _ => {
                    return Err(self.error(format!("unexpected character '{c}' in element name")));
                }
            },
            State::AfterCloseName => match c {
                c if c.is_ascii_whitespace() => {}
                '>' => self.emit_close(),
                _ => return Err(self.error(format!("unexpected character '{c}' in close tag"))),
            },
            State::Declaration => {
                if c == '?' {
                    self.state = State::DeclarationQuery;
                }
            }
            State::DeclarationQuery => match c {
                '>' => self.state = State::Text,
                '?' => {}
                _ => self.state = State::Declaration,
            },
            State::BangStart => match c {
                '-' => self.state = State::CommentOpen,
                '>' => self.state = State::Text,
                _ => self.state = State::Doctype { brackets: 0 },
            },
            State::CommentOpen => match c {
                '-' => self.state = State::Comment,
                _ => return Err(self.error("expected '<!--' to open a comment")),
            },
            State::Comment => {
                if c == '-' {
                    self.state = State::CommentDash;
                }
            }
            State::CommentDash => {
                if c == '-' {
                    self.state = State::CommentDashDash;
                } else {
                    self.state = State::Comment;
                }
            }
            State::CommentDashDash => match c {
                '>' => self.state = State::Text,
                '-' => {}
                _ => self.state = State::Comment,
            },
            State::Doctype { brackets } => match c {
                '[' => {
                    self.state = State::Doctype {
                        brackets: brackets.saturating_add(1),
                    };
                }
                ']' => {
                    self.state = State::Doctype {
                        brackets: brackets.saturating_sub(1),
                    };
                }
                '>' if brackets == 0 => self.state = State::Text,
                _ => {}
            },
        }
        Ok(())
    }

    fn emit_open(&mut self, self_closing: bool) {
        let event = MarkupEvent::Open {
            name: std::mem::take(&mut self.name),
            attributes: std::mem::take(&mut self.attrs),
            self_closing,
            line: self.mark_line,
            column: self.mark_column,
        };
        self.events.push_back(event);
        self.state = State::Text;
    }

    fn emit_close(&mut self) {
        let event = MarkupEvent::Close {
            name: std::mem::take(&mut self.name),
            line: self.mark_line,
            column: self.mark_column,
        };
        self.events.push_back(event);
        self.state = State::Text;
    }

    fn push_attribute(&mut self) {
        let attribute = Attribute {
            name: std::mem::take(&mut self.attr_name),
            value: std::mem::take(&mut self.attr_value),
        };
        self.attrs.push(attribute);
    }

    /// Resolve the reference accumulated between `&` and `;`.
    fn decode_entity(&mut self) -> Result<char, ParseError> {
        let decoded = match self.entity.as_str() {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            text => {
                let code = if let Some(hex) =
                    text.strip_prefix("#x").or_else(|| text.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = text.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    return Err(self.error(format!("unknown character reference '&{text};'")));
                };
                match code {
                    Some(0) => return Err(self.error("character reference to NUL")),
                    Some(code) => match char::from_u32(code) {
                        Some(c) => c,
                        None => return Err(self.error("invalid character reference")),
                    },
                    None => return Err(self.error("invalid character reference")),
                }
            }
        };
        self.entity.clear();
        Ok(decoded)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

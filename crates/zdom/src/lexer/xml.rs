//! Streaming XML lexer producing open/text/close events

use crate::dom::name::{is_name_char, is_name_start};
use crate::error::{Error, Pos, Result};
use crate::lexer::Cursor;
use crate::parser::Event;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Pull-style XML lexer.
///
/// Checks well-formedness as it goes (tag nesting, attribute syntax, a
/// single document element) and reports every violation with the line and
/// column where it was found. Declarations, processing instructions,
/// comments and doctypes are skipped.
#[derive(Debug)]
pub struct XmlLexer<'a> {
    cursor: Cursor<'a>,
    open: Vec<String>,
    pending: Option<Event>,
    seen_root: bool,
}

impl<'a> XmlLexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut cursor = Cursor::new(input);
        if cursor.starts_with(BOM) {
            cursor.advance_by(BOM.len());
        }
        Self {
            cursor,
            open: Vec::new(),
            pending: None,
            seen_root: false,
        }
    }

    /// Current position in the input
    pub const fn position(&self) -> Pos {
        self.cursor.position()
    }

    /// Next event, or `None` once the document element has closed and
    /// only whitespace and skippable markup remain.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if let Some(event) = self.pending.take() {
            return Ok(Some(event));
        }

        loop {
            if self.open.is_empty() {
                self.cursor.skip_whitespace();
                if self.cursor.is_eof() {
                    if self.seen_root {
                        return Ok(None);
                    }
                    return Err(self.error_here("no element found"));
                }
                if let Some(event) = self.next_outside_root()? {
                    return Ok(Some(event));
                }
                continue;
            }

            if self.cursor.is_eof() {
                let name = self.open.last().cloned().unwrap_or_default();
                return Err(self.error_here(format!("unterminated element <{name}>")));
            }

            if self.cursor.current() != Some(b'<') {
                return self.read_text().map(Some);
            }

            match self.cursor.peek(1) {
                Some(b'/') => return self.read_close_tag().map(Some),
                Some(b'?') => self.skip_processing_instruction()?,
                Some(b'!') if self.cursor.starts_with(b"<![CDATA[") => {
                    return self.read_cdata().map(Some);
                }
                Some(b'!') if self.cursor.starts_with(b"<!--") => self.skip_comment()?,
                Some(b'!') => return Err(self.error_here("declaration inside element")),
                _ => return self.read_open_tag().map(Some),
            }
        }
    }

    /// Prolog and epilog: only whitespace, comments, PIs and a doctype.
    /// Returns the document element's start tag when it shows up.
    fn next_outside_root(&mut self) -> Result<Option<Event>> {
        if self.cursor.current() != Some(b'<') {
            return Err(self.error_here("text outside the document element"));
        }

        match self.cursor.peek(1) {
            Some(b'?') => self.skip_processing_instruction()?,
            Some(b'!') if self.cursor.starts_with(b"<!--") => self.skip_comment()?,
            Some(b'!') if self.cursor.starts_with(b"<!DOCTYPE") && !self.seen_root => {
                self.skip_doctype()?;
            }
            Some(b'!') => return Err(self.error_here("unexpected declaration")),
            Some(b'/') => return Err(self.error_here("unexpected closing tag")),
            _ if self.seen_root => {
                return Err(self.error_here("junk after document element"));
            }
            _ => return self.read_open_tag().map(Some),
        }
        Ok(None)
    }

    fn read_open_tag(&mut self) -> Result<Event> {
        self.expect_byte(b'<')?;
        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        self.seen_root = true;
        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            self.pending = Some(Event::Close { name: name.clone() });
        } else {
            self.expect_byte(b'>')?;
            self.open.push(name.clone());
        }
        Ok(Event::Open { name, attributes })
    }

    fn read_close_tag(&mut self) -> Result<Event> {
        let start = self.cursor.position();
        self.cursor.advance_by(2);
        let name = self.parse_name()?;
        self.cursor.skip_whitespace();
        self.expect_byte(b'>')?;

        match self.open.pop() {
            Some(expected) if expected == name => Ok(Event::Close { name }),
            Some(expected) => Err(Error::parse(
                start,
                format!("mismatched closing tag: expected </{expected}>, found </{name}>"),
            )),
            None => Err(Error::parse(start, "unexpected closing tag")),
        }
    }

    fn parse_attributes(&mut self) -> Result<Vec<(String, String)>> {
        let mut attrs: Vec<(String, String)> = Vec::new();

        loop {
            let had_space = matches!(self.cursor.current(), Some(b' ' | b'\t' | b'\r' | b'\n'));
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) if !had_space => {
                    return Err(self.error_here("expected whitespace before attribute"));
                }
                Some(_) => {}
                None => return Err(self.error_here("unexpected end of input")),
            }

            let start = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.iter().any(|(existing, _)| *existing == name) {
                return Err(Error::parse(start, format!("duplicate attribute {name}")));
            }
            attrs.push((name, value));
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_str(raw, start_pos)?;
                return decode_entities(text, start_pos);
            }
            if b == b'<' {
                return Err(self.error_here("'<' not allowed in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.error_here("unterminated attribute value"))
    }

    fn read_text(&mut self) -> Result<Event> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_str(raw, start_pos)?;
        decode_entities(text, start_pos).map(Event::Text)
    }

    fn read_cdata(&mut self) -> Result<Event> {
        self.cursor.advance_by(b"<![CDATA[".len());
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while !self.cursor.starts_with(b"]]>") {
            if self.cursor.is_eof() {
                return Err(Error::parse(start_pos, "unterminated CDATA section"));
            }
            self.cursor.advance();
        }
        let raw = self.cursor.slice_from(start);
        self.cursor.advance_by(3);
        bytes_to_str(raw, start_pos).map(|text| Event::Text(text.to_string()))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => return Err(Error::parse(start_pos, "invalid name")),
            None => return Err(self.error_here("expected name")),
        }
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        bytes_to_str(raw, start_pos).map(str::to_string)
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        self.cursor.advance_by(2);
        self.skip_until(b"?>", "unterminated processing instruction")
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.cursor.advance_by(4);
        self.skip_until(b"-->", "unterminated comment")
    }

    fn skip_doctype(&mut self) -> Result<()> {
        let start = self.cursor.position();
        let mut depth = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(Error::parse(start, "unterminated doctype"))
    }

    fn skip_until(&mut self, pattern: &[u8], message: &str) -> Result<()> {
        let start = self.cursor.position();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(Error::parse(start, message))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{}'", char::from(expected))))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        Error::parse(self.cursor.position(), message)
    }
}

fn bytes_to_str(bytes: &[u8], at: Pos) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| Error::parse(at, "invalid utf-8"))
}

fn decode_entities(input: &str, at: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);

        let Some(end) = after.find(';') else {
            return Err(Error::parse(at, "unterminated entity reference"));
        };
        let entity = after.get(1..end).unwrap_or_default();
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::parse(at, format!("undefined entity &{entity};")));
            }
        }
        rest = after.get(end + 1..).unwrap_or_default();
    }
    result.push_str(rest);

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

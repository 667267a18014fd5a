// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # XML Parser and Emitter
//!
//! An attribute-centric XML subset mapped onto the document tree:
//!
//! - attributes become string members, in document order
//! - child elements with unique names become nested members; repeated
//!   siblings collapse into an array under the shared name
//! - element text becomes a member named `content`
//! - `<name/>` reads as null, `<name></name>` as an empty array; the
//!   emitter reproduces each form, which is what makes parse/emit
//!   byte-stable
//! - `<![CDATA[...]]>` is taken verbatim with no entity decoding
//!
//! Everything scalar degrades to a string on parse; round-tripping through
//! XML is not type-preserving. Namespaces are out of scope.
//!
//! Entities `&amp; &lt; &gt; &quot; &apos;` and numeric `&#NN;`/`&#xHH;`
//! decode on parse; numeric references below 256 are raw bytes (documents
//! in the wild use them to spell UTF-8 sequences byte by byte), larger ones
//! encode as UTF-8.

use bedrock_core::{Error, Result};

use crate::value::{Object, Value};

/// Parses an XML document into the tree: `{ root_name: root_value }`.
pub fn parse_xml(text: &str) -> Result<Value> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
    };
    parser.skip_misc()?;
    let (name, value) = parser.parse_element()?;
    let mut root = Object::new();
    root.insert(name, value);
    Ok(Value::Object(root))
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos.min(self.bytes.len())..]
    }

    fn starts_with(&self, token: &str) -> bool {
        self.rest().starts_with(token.as_bytes())
    }

    fn peek(&self) -> Option<u8> {
        self.rest().first().copied()
    }

    fn bump(&mut self) -> Result<u8> {
        let b = self.peek().ok_or(Error::ParseError)?;
        self.pos += 1;
        Ok(b)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    // Skips past `token`, which must occur.
    fn skip_through(&mut self, token: &str) -> Result<()> {
        let haystack = self.rest();
        let needle = token.as_bytes();
        let at = haystack
            .windows(needle.len())
            .position(|w| w == needle)
            .ok_or(Error::ParseError)?;
        self.pos += at + needle.len();
        Ok(())
    }

    // Prolog, comments and doctype before (or between) elements.
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_through("?>")?;
            } else if self.starts_with("<!--") {
                self.skip_through("-->")?;
            } else if self.starts_with("<!") {
                self.skip_through(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(Error::ParseError);
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn parse_element(&mut self) -> Result<(String, Value)> {
        if self.bump()? != b'<' {
            return Err(Error::ParseError);
        }
        let name = self.read_name()?;
        let mut attrs = Object::new();

        // Attributes, then either the self-closing or open form.
        loop {
            self.skip_whitespace();
            if self.starts_with("/>") {
                self.pos += 2;
                let value = if attrs.is_empty() { Value::Null } else { Value::Object(attrs) };
                return Ok((name, value));
            }
            if self.peek() == Some(b'>') {
                self.pos += 1;
                break;
            }
            let attr_name = self.read_name()?;
            self.skip_whitespace();
            if self.bump()? != b'=' {
                return Err(Error::ParseError);
            }
            self.skip_whitespace();
            let quote = self.bump()?;
            if quote != b'"' && quote != b'\'' {
                return Err(Error::ParseError);
            }
            let start = self.pos;
            while self.peek().map(|b| b != quote).unwrap_or(false) {
                self.pos += 1;
            }
            let raw = &self.bytes[start..self.pos];
            self.bump()?; // closing quote
            attrs.insert(attr_name, Value::String(decode_entities(raw)?));
        }

        // Content: text runs, CDATA, comments and child elements until the
        // matching close tag.
        let mut text = Vec::new();
        let mut children = Object::new();
        loop {
            if self.starts_with("</") {
                self.pos += 2;
                let close = self.read_name()?;
                if close != name {
                    return Err(Error::ParseError);
                }
                self.skip_whitespace();
                if self.bump()? != b'>' {
                    return Err(Error::ParseError);
                }
                break;
            }
            if self.starts_with("<![CDATA[") {
                self.pos += 9;
                let start = self.pos;
                self.skip_through("]]>")?;
                text.extend_from_slice(&self.bytes[start..self.pos - 3]);
                continue;
            }
            if self.starts_with("<!--") {
                self.skip_through("-->")?;
                continue;
            }
            if self.peek() == Some(b'<') {
                let (child_name, child_value) = self.parse_element()?;
                merge_child(&mut children, child_name, child_value);
                continue;
            }
            // Text run; whitespace-only runs are formatting, not content.
            let start = self.pos;
            while self.peek().map(|b| b != b'<').unwrap_or(false) {
                self.pos += 1;
            }
            if self.pos == start {
                return Err(Error::ParseError); // unterminated content
            }
            let decoded = decode_entities(&self.bytes[start..self.pos])?;
            let trimmed = decoded.trim();
            if !trimmed.is_empty() {
                text.extend_from_slice(trimmed.as_bytes());
            }
        }

        let text = String::from_utf8(text).map_err(|_| Error::ParseError)?;
        let value = if attrs.is_empty() && children.is_empty() {
            if text.is_empty() {
                Value::Array(Vec::new())
            } else {
                Value::String(text)
            }
        } else {
            let mut object = attrs;
            for (child_name, child_value) in children.into_members() {
                object.insert(child_name, child_value);
            }
            if !text.is_empty() {
                object.insert("content", Value::String(text));
            }
            Value::Object(object)
        };
        Ok((name, value))
    }
}

// Repeated sibling elements collapse into an array under their shared name.
fn merge_child(children: &mut Object, name: String, value: Value) {
    match children.get_mut(&name) {
        None => children.insert(name, value),
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn decode_entities(raw: &[u8]) -> Result<String> {
    let mut out = Vec::with_capacity(raw.len());
    let mut pos = 0;
    while pos < raw.len() {
        if raw[pos] != b'&' {
            out.push(raw[pos]);
            pos += 1;
            continue;
        }
        let end = raw[pos..]
            .iter()
            .position(|&b| b == b';')
            .ok_or(Error::ParseError)?
            + pos;
        let entity = &raw[pos + 1..end];
        match entity {
            b"amp" => out.push(b'&'),
            b"lt" => out.push(b'<'),
            b"gt" => out.push(b'>'),
            b"quot" => out.push(b'"'),
            b"apos" => out.push(b'\''),
            _ if entity.first() == Some(&b'#') => {
                let code = if entity.get(1) == Some(&b'x') || entity.get(1) == Some(&b'X') {
                    u32::from_str_radix(
                        std::str::from_utf8(&entity[2..]).map_err(|_| Error::ParseError)?,
                        16,
                    )
                    .map_err(|_| Error::ParseError)?
                } else {
                    std::str::from_utf8(&entity[1..])
                        .map_err(|_| Error::ParseError)?
                        .parse::<u32>()
                        .map_err(|_| Error::ParseError)?
                };
                if code < 256 {
                    out.push(code as u8);
                } else {
                    let c = char::from_u32(code).ok_or(Error::ParseError)?;
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
            _ => return Err(Error::ParseError),
        }
        pos = end + 1;
    }
    String::from_utf8(out).map_err(|_| Error::ParseError)
}

// ----------------------------------------------------------------------
// Emitter
// ----------------------------------------------------------------------

/// Emits `value` (an object) as XML; each root member becomes a top-level
/// element.
pub fn export_xml(value: &Value) -> Result<String> {
    let root = value.as_object().ok_or(Error::FormatVariationNotSupported)?;
    let mut out = String::new();
    for (name, member) in root.iter() {
        write_element(&mut out, name, member);
    }
    Ok(out)
}

fn write_element(out: &mut String, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                // Null array entries keep the open/close form so the two
                // empty shapes stay distinguishable.
                if item.is_nothing() {
                    out.push('<');
                    out.push_str(name);
                    out.push_str("></");
                    out.push_str(name);
                    out.push('>');
                } else {
                    write_element(out, name, item);
                }
            }
            if items.is_empty() {
                out.push('<');
                out.push_str(name);
                out.push_str("></");
                out.push_str(name);
                out.push('>');
            }
        }
        Value::Null | Value::Void => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        }
        Value::Object(o) => {
            out.push('<');
            out.push_str(name);

            let mut content: Option<String> = None;
            let mut children: Vec<(&str, &Value)> = Vec::new();
            for (member_name, member) in o.iter() {
                if member_name == "content" && !member.is_object() && !member.is_array() {
                    content = Some(scalar_text(member));
                } else if is_attribute(member) {
                    out.push(' ');
                    out.push_str(member_name);
                    out.push_str("=\"");
                    escape_into(out, &scalar_text(member), true);
                    out.push('"');
                } else {
                    children.push((member_name, member));
                }
            }

            if content.is_none() && children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            if let Some(text) = content {
                escape_into(out, &text, false);
            }
            for (child_name, child) in children {
                write_element(out, child_name, child);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        scalar => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            escape_into(out, &scalar_text(scalar), false);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn is_attribute(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Bool(_) | Value::Int(_) | Value::Double(_)
    )
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "true".to_owned(),
        Value::Bool(false) => "false".to_owned(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        _ => String::new(),
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

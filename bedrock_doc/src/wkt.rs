// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # WKT Parser and Emitter
//!
//! Well-Known Text for geospatial coordinate reference systems:
//! `NAME["name", arg, NESTED[...], …]`. Each node becomes a document object
//! of shape `{type, name, values: […]}`; `name` is present when the first
//! argument is a quoted string, and `values` holds the remaining arguments
//! (numbers, strings, nested nodes) in order.
//!
//! The emitter inverts the mapping byte-exactly for well-formed input. One
//! quirk is preserved deliberately: `AXIS` nodes conventionally carry an
//! unquoted direction keyword (`AXIS["Easting",EAST]`), so string values of
//! an `AXIS` node are emitted without quotes while every other node quotes
//! its string values.

use bedrock_core::{Error, Result};

use crate::value::{Object, Value};

/// Parses a WKT string into a `{type, name, values}` document.
pub fn parse_wkt(text: &str) -> Result<Value> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let node = parser.parse_node()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(Error::ParseError);
    }
    Ok(node)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn read_word(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
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

    fn parse_node(&mut self) -> Result<Value> {
        let node_type = self.read_word()?;
        self.skip_whitespace();
        if self.peek() != Some(b'[') {
            return Err(Error::ParseError);
        }
        self.pos += 1;

        let mut name: Option<String> = None;
        let mut values = Vec::new();
        let mut first = true;
        loop {
            self.skip_whitespace();
            match self.peek().ok_or(Error::ParseError)? {
                b']' => {
                    self.pos += 1;
                    break;
                }
                b',' => {
                    self.pos += 1;
                    continue;
                }
                b'"' => {
                    let s = self.parse_quoted()?;
                    if first {
                        name = Some(s);
                    } else {
                        values.push(Value::String(s));
                    }
                }
                b'-' | b'+' | b'.' | b'0'..=b'9' => values.push(self.parse_number()?),
                _ => {
                    // A word is either a nested node (followed by '[') or a
                    // bare keyword such as EAST.
                    let word_start = self.pos;
                    let word = self.read_word()?;
                    self.skip_whitespace();
                    if self.peek() == Some(b'[') {
                        self.pos = word_start;
                        values.push(self.parse_node()?);
                    } else {
                        values.push(Value::String(word));
                    }
                }
            }
            first = false;
        }

        let mut object = Object::new();
        object.insert("type", Value::String(node_type));
        if let Some(name) = name {
            object.insert("name", Value::String(name));
        }
        object.insert("values", Value::Array(values));
        Ok(Value::Object(object))
    }

    fn parse_quoted(&mut self) -> Result<String> {
        self.pos += 1; // opening quote
        let start = self.pos;
        while self.peek().map(|b| b != b'"').unwrap_or(false) {
            self.pos += 1;
        }
        if self.peek() != Some(b'"') {
            return Err(Error::ParseError);
        }
        let s = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
        self.pos += 1;
        Ok(s)
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        let mut is_double = false;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' | b'e' | b'E' => {
                    is_double = true;
                    self.pos += 1;
                }
                b'-' | b'+' if matches!(self.bytes.get(self.pos - 1), Some(b'e' | b'E')) => {
                    self.pos += 1
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).map_err(|_| Error::ParseError)?;
        if !is_double {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Int(i));
            }
        }
        text.parse::<f64>().map(Value::Double).map_err(|_| Error::ParseError)
    }
}

/// Emits a `{type, name, values}` document back to WKT.
pub fn export_wkt(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_node(&mut out, value)?;
    Ok(out)
}

fn write_node(out: &mut String, node: &Value) -> Result<()> {
    let object = node.as_object().ok_or(Error::ObjectTypeMismatch)?;
    let node_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(Error::ObjectTypeMismatch)?;

    out.push_str(node_type);
    out.push('[');

    let mut first = true;
    if let Some(name) = object.get("name").and_then(Value::as_str) {
        out.push('"');
        out.push_str(name);
        out.push('"');
        first = false;
    }

    // AXIS direction keywords are conventionally unquoted.
    let quote_strings = node_type != "AXIS";
    if let Some(values) = object.get("values").and_then(Value::as_array) {
        for item in values {
            if !first {
                out.push(',');
            }
            first = false;
            match item {
                Value::Object(_) => write_node(out, item)?,
                Value::String(s) => {
                    if quote_strings {
                        out.push('"');
                        out.push_str(s);
                        out.push('"');
                    } else {
                        out.push_str(s);
                    }
                }
                Value::Int(i) => out.push_str(&i.to_string()),
                Value::Double(d) => out.push_str(&d.to_string()),
                _ => return Err(Error::ObjectTypeMismatch),
            }
        }
    }

    out.push(']');
    Ok(())
}

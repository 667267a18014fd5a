// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bedrock Document Tree
//!
//! One in-memory data model, [`Value`], behind three textual front-ends:
//! JSON, an attribute-centric XML subset, and WKT coordinate-system
//! strings. A path expression language ([`Value::get`] / [`Value::set`])
//! reads and edits the tree without the caller walking it by hand.
//!
//! ```
//! use bedrock_doc::Value;
//!
//! let mut doc = Value::parse(r#"{"Settings":{"TerrainIndex":2}}"#).unwrap();
//! assert_eq!(doc.get("Settings.TerrainIndex").as_int(), 2);
//! doc.set("Settings.TestArray[] = 0").unwrap();
//! doc.set("Settings.TestArray[] = 1").unwrap();
//! assert_eq!(doc.get("Settings.TestArray[-1]").as_int(), 1);
//! ```
//!
//! JSON round trips preserve scalar types; XML degrades every scalar to a
//! string on parse (readers re-coerce through `as_int` and friends). See
//! the module docs of [`json`], [`xml`] and [`wkt`] for the exact mapping
//! rules each format uses.

pub mod json;
pub mod path;
pub mod value;
pub mod wkt;
pub mod xml;

pub use value::{Object, Value};

use bedrock_core::Result;

/// The textual form used by [`Value::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Xml,
}

impl Value {
    /// Parses a document, auto-detecting XML (leading `<`) versus JSON.
    pub fn parse(text: &str) -> Result<Value> {
        if text.trim_start().starts_with('<') {
            xml::parse_xml(text)
        } else {
            json::parse_json(text)
        }
    }

    /// Exports in the requested format. JSON export is infallible for any
    /// tree; XML export requires an object at the root.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => Ok(json::export_json(self)),
            ExportFormat::Xml => xml::export_xml(self),
        }
    }

    /// Shorthand for JSON export.
    pub fn export_json(&self) -> String {
        json::export_json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatch() {
        assert!(Value::parse("  {\"a\":1}").unwrap().is_object());
        let xml = Value::parse("  <a b=\"1\"/>").unwrap();
        assert_eq!(xml.get("a.b").as_string(), "1");
    }

    #[test]
    fn test_export_dispatch() {
        let v = Value::parse("{\"a\":{\"b\":1}}").unwrap();
        assert_eq!(v.export(ExportFormat::Json).unwrap(), "{\"a\":{\"b\":1}}");
        assert_eq!(v.export(ExportFormat::Xml).unwrap(), "<a b=\"1\"/>");

        // A root scalar has no XML form.
        assert!(Value::Int(3).export(ExportFormat::Xml).is_err());
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # URL Splitter
//!
//! Splits `scheme://host[:port]/path` into its pieces with just enough
//! smarts for the HTTP file handler: IPv6 `[...]` hosts keep their brackets,
//! a missing port defaults to 443 for `https` and 80 otherwise, and a fixed
//! set of characters in the path is rewritten to percent escapes so the
//! result can go straight into a request line.

/// Characters rewritten to percent escapes in paths, and their replacements.
const SPECIAL: [(char, &str); 5] = [
    (' ', "%20"),
    ('#', "%23"),
    ('%', "%25"),
    ('+', "%2B"),
    ('?', "%3F"),
];

/// A split URL. Construct with [`Url::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    scheme: String,
    domain: String,
    port: u16,
    path: String,
}

impl Url {
    /// Splits `url` into scheme, domain, port and percent-escaped path.
    ///
    /// A missing scheme yields `""`; a missing path yields `""`. Parsing is
    /// permissive; the caller decides which schemes it accepts.
    pub fn parse(url: &str) -> Url {
        let mut rest = url;
        let mut scheme = "";

        // The colon ends the scheme only if it appears before any slash.
        if let Some(i) = rest.find([':', '/']) {
            if rest.as_bytes()[i] == b':' {
                scheme = &rest[..i];
                rest = &rest[i + 1..];
                if let Some(stripped) = rest.strip_prefix("//") {
                    rest = stripped;
                }
            }
        }

        // IPv6 hosts carry colons, so the bracket pair wins over ':'.
        let (domain, after) = if rest.starts_with('[') {
            match rest.find(']') {
                Some(j) => rest.split_at(j + 1),
                None => (rest, ""),
            }
        } else {
            match rest.find(['/', ':']) {
                Some(j) => rest.split_at(j),
                None => (rest, ""),
            }
        };

        let (port, path) = if let Some(port_part) = after.strip_prefix(':') {
            let end = port_part.find('/').unwrap_or(port_part.len());
            (port_part[..end].parse::<u16>().ok(), &port_part[end..])
        } else {
            (None, after)
        };
        let port = port.unwrap_or(if scheme == "https" { 443 } else { 80 });

        Url {
            scheme: scheme.to_owned(),
            domain: domain.to_owned(),
            port,
            path: escape_path(path),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host, with IPv6 brackets retained.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The percent-escaped path including any query.
    pub fn path_with_query(&self) -> &str {
        &self.path
    }
}

fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match SPECIAL.iter().find(|(from, _)| *from == c) {
            Some((_, sub)) => out.push_str(sub),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests scheme/domain/port/path splitting with default ports.
    ///
    /// Validates that:
    /// - `https` defaults to 443, everything else to 80
    /// - an explicit port overrides the default
    /// - the path keeps its leading slash
    #[test]
    fn test_basic_split() {
        let url = Url::parse("http://example.com/some/file.bin");
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.domain(), "example.com");
        assert_eq!(url.port(), 80);
        assert_eq!(url.path_with_query(), "/some/file.bin");

        let tls = Url::parse("https://example.com/x");
        assert_eq!(tls.port(), 443);

        let custom = Url::parse("http://example.com:8080/x");
        assert_eq!(custom.domain(), "example.com");
        assert_eq!(custom.port(), 8080);
        assert_eq!(custom.path_with_query(), "/x");
    }

    #[test]
    fn test_ipv6_host_keeps_brackets() {
        let url = Url::parse("http://[::1]:9000/file");
        assert_eq!(url.domain(), "[::1]");
        assert_eq!(url.port(), 9000);
        assert_eq!(url.path_with_query(), "/file");

        let no_port = Url::parse("https://[2001:db8::1]/file");
        assert_eq!(no_port.domain(), "[2001:db8::1]");
        assert_eq!(no_port.port(), 443);
    }

    /// Tests the fixed percent-escape set in paths.
    #[test]
    fn test_path_escaping() {
        let url = Url::parse("http://h/a b#c%d+e?f");
        assert_eq!(url.path_with_query(), "/a%20b%23c%25d%2Be%3Ff");
    }

    #[test]
    fn test_degenerate_forms() {
        let no_scheme = Url::parse("example.com/x");
        assert_eq!(no_scheme.scheme(), "");
        assert_eq!(no_scheme.domain(), "example.com");
        assert_eq!(no_scheme.port(), 80);

        let no_path = Url::parse("http://example.com");
        assert_eq!(no_path.path_with_query(), "");
    }
}

// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Filename Decomposition
//!
//! [`Filename`] owns a path string and tracks two byte offsets into it: where
//! the filename component starts (after the last `/`, `\` or `:`) and where
//! the extension starts (at the last `.` inside the filename component).
//! Everything else (folder, name-without-extension, name-with-extension)
//! falls out of slicing between those offsets, so the accessors are free and
//! the mutators just rebuild the string and rescan.
//!
//! For `http`/`https` URLs the `?query` suffix is excluded from component
//! detection so that `file.txt?version=2` still reports a `.txt` extension.

/// A decomposed path: folder, filename and extension views over one string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filename {
    path: String,
    filename_index: usize,
    extension_index: usize,
}

impl Filename {
    /// Wraps `path` and computes the component offsets.
    pub fn new(path: &str) -> Self {
        let mut filename = Filename::default();
        filename.set_from_full_path(path);
        filename
    }

    /// The full path as given.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The filename including its extension (and any URL query).
    pub fn filename_with_ext(&self) -> &str {
        &self.path[self.filename_index..]
    }

    /// The extension including its leading `.`, or `""`.
    pub fn extension(&self) -> &str {
        &self.path[self.extension_index..]
    }

    /// The folder prefix including its trailing separator, or `""`.
    pub fn folder(&self) -> &str {
        &self.path[..self.filename_index]
    }

    /// The filename with the extension stripped.
    pub fn filename_only(&self) -> &str {
        &self.path[self.filename_index..self.extension_index]
    }

    /// Replaces the whole path and rescans.
    pub fn set_from_full_path(&mut self, path: &str) {
        self.path = path.to_owned();
        self.calculate_indices();
    }

    /// Replaces the folder component, keeping filename and extension.
    pub fn set_folder(&mut self, folder: &str) {
        let mut path = folder.to_owned();
        if !path.is_empty() && !path.ends_with(['/', '\\']) {
            path.push('/');
        }
        path.push_str(self.filename_with_ext());
        self.path = path;
        self.calculate_indices();
    }

    /// Replaces the filename, keeping folder and extension.
    pub fn set_filename_no_ext(&mut self, name: &str) {
        let path = format!("{}{}{}", self.folder(), name, self.extension());
        self.path = path;
        self.calculate_indices();
    }

    /// Replaces filename and extension together, keeping the folder.
    pub fn set_filename_with_ext(&mut self, name: &str) {
        let path = format!("{}{}", self.folder(), name);
        self.path = path;
        self.calculate_indices();
    }

    /// Replaces the extension (pass a value with the leading `.`).
    pub fn set_extension(&mut self, ext: &str) {
        let path = format!("{}{}", &self.path[..self.extension_index], ext);
        self.path = path;
        self.calculate_indices();
    }

    // Scan from the right: the extension starts at the last '.' seen before
    // any separator, the filename after the last separator. For http(s) URLs
    // the scan stops short of the '?query' suffix.
    fn calculate_indices(&mut self) {
        let bytes = self.path.as_bytes();
        let mut scan_len = bytes.len();

        let lowered = self.path.get(..8).map(|p| p.to_ascii_lowercase());
        let is_http = matches!(&lowered, Some(p) if p.starts_with("http://") || p.starts_with("https://"));
        if is_http {
            if let Some(q) = self.path.find('?') {
                scan_len = q;
            }
        }

        self.extension_index = bytes.len();
        self.filename_index = 0;
        let mut extension_found = false;
        for i in (0..scan_len).rev() {
            match bytes[i] {
                b'.' if !extension_found => {
                    self.extension_index = i;
                    extension_found = true;
                }
                b'/' | b'\\' | b':' => {
                    self.filename_index = i + 1;
                    break;
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests component decomposition across the folder/extension matrix.
    ///
    /// Validates that:
    /// - a bare name has no folder and no extension
    /// - extension detection picks the last '.' of the filename only
    /// - the folder keeps its trailing separator
    #[test]
    fn test_decomposition() {
        let fn_empty = Filename::default();
        assert_eq!(fn_empty.path(), "");
        assert_eq!(fn_empty.filename_with_ext(), "");
        assert_eq!(fn_empty.extension(), "");

        let plain = Filename::new("test");
        assert_eq!(plain.path(), "test");
        assert_eq!(plain.filename_with_ext(), "test");
        assert_eq!(plain.filename_only(), "test");
        assert_eq!(plain.extension(), "");
        assert_eq!(plain.folder(), "");

        let with_ext = Filename::new("test.ext");
        assert_eq!(with_ext.filename_with_ext(), "test.ext");
        assert_eq!(with_ext.filename_only(), "test");
        assert_eq!(with_ext.extension(), ".ext");

        let with_folder = Filename::new("folder/test");
        assert_eq!(with_folder.folder(), "folder/");
        assert_eq!(with_folder.filename_with_ext(), "test");
        assert_eq!(with_folder.extension(), "");

        let full = Filename::new("folder/test.ext");
        assert_eq!(full.folder(), "folder/");
        assert_eq!(full.filename_with_ext(), "test.ext");
        assert_eq!(full.filename_only(), "test");
        assert_eq!(full.extension(), ".ext");
    }

    #[test]
    fn test_dotted_folder_does_not_become_extension() {
        let name = Filename::new("folder.name/test");
        assert_eq!(name.folder(), "folder.name/");
        assert_eq!(name.filename_only(), "test");
        assert_eq!(name.extension(), "");
    }

    #[test]
    fn test_drive_and_backslash_separators() {
        let win = Filename::new("C:\\dir\\file.txt");
        assert_eq!(win.folder(), "C:\\dir\\");
        assert_eq!(win.filename_only(), "file");
        assert_eq!(win.extension(), ".txt");

        let drive_only = Filename::new("C:file.txt");
        assert_eq!(drive_only.folder(), "C:");
        assert_eq!(drive_only.filename_with_ext(), "file.txt");
    }

    /// Tests that a URL query is excluded from extension detection.
    #[test]
    fn test_url_query_trimmed_for_extension() {
        let url = Filename::new("https://host/path/file.txt?version=2");
        assert_eq!(url.extension(), ".txt?version=2");
        assert_eq!(url.filename_only(), "file");

        // Without an http scheme, '?' is an ordinary character.
        let local = Filename::new("dir/file?odd.txt");
        assert_eq!(local.extension(), ".txt");
    }

    #[test]
    fn test_mutators() {
        let mut name = Filename::default();
        name.set_folder("folder");
        assert_eq!(name.path(), "folder/");
        assert_eq!(name.filename_with_ext(), "");

        name.set_filename_with_ext("test.ext");
        assert_eq!(name.path(), "folder/test.ext");

        name.set_filename_no_ext("other");
        assert_eq!(name.path(), "folder/other.ext");

        name.set_extension(".tmp");
        assert_eq!(name.path(), "folder/other.tmp");

        name.set_from_full_path("a/b.c");
        assert_eq!(name.folder(), "a/");
        assert_eq!(name.extension(), ".c");
    }
}

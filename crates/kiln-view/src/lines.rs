//! Line store — the loaded file, one entry per line.
//!
//! Lines are raw bytes. Nothing is decoded: a Latin-1 file or a file with
//! invalid UTF-8 displays exactly the bytes it contains, and the renderer
//! truncates by byte count. Trailing `\n` and `\r` are stripped at load
//! time; every other byte is kept as-is.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One row of file content, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    bytes: Vec<u8>,
}

impl Line {
    /// Build a line from raw bytes, stripping any trailing `\n` / `\r`.
    #[must_use]
    pub fn new(mut bytes: Vec<u8>) -> Self {
        while matches!(bytes.last(), Some(b'\n' | b'\r')) {
            bytes.pop();
        }
        Self { bytes }
    }

    /// The line's content.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

// ---------------------------------------------------------------------------
// LineStore
// ---------------------------------------------------------------------------

/// The file's lines in file order. Index `i` is line `i + 1` of the source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineStore {
    rows: Vec<Line>,
}

impl LineStore {
    /// An empty store (no file backing).
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Load `path`, or start empty when no path is given.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn open(path: Option<&Path>) -> Result<Self, LoadError> {
        path.map_or_else(|| Ok(Self::new()), Self::load)
    }

    /// Read a file line by line.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Open`] if the file cannot be opened and
    /// [`LoadError::Read`] if reading fails partway.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_reader(BufReader::new(file)).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), lines = store.numrows(), "file loaded");
        Ok(store)
    }

    /// Read lines from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails.
    pub fn from_reader(mut reader: impl BufRead) -> io::Result<Self> {
        let mut store = Self::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            store.append_row(std::mem::take(&mut buf));
        }

        Ok(store)
    }

    /// Append a row at the end.
    pub fn append_row(&mut self, bytes: Vec<u8>) {
        self.rows.push(Line::new(bytes));
    }

    /// Number of lines.
    #[inline]
    #[must_use]
    pub fn numrows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no lines.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Line at `index` (0-based), if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.rows.get(index)
    }
}

impl<'a> FromIterator<&'a str> for LineStore {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().map(Line::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn rows(store: &LineStore) -> Vec<&[u8]> {
        store.rows.iter().map(Line::as_bytes).collect()
    }

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    // -- Line ---------------------------------------------------------------

    #[test]
    fn line_strips_lf() {
        assert_eq!(Line::new(b"abc\n".to_vec()).as_bytes(), b"abc");
    }

    #[test]
    fn line_strips_crlf() {
        assert_eq!(Line::new(b"abc\r\n".to_vec()).as_bytes(), b"abc");
    }

    #[test]
    fn line_strips_every_trailing_terminator() {
        assert_eq!(Line::new(b"abc\r\r\n\n".to_vec()).as_bytes(), b"abc");
    }

    #[test]
    fn line_keeps_interior_cr() {
        assert_eq!(Line::new(b"a\rb\n".to_vec()).as_bytes(), b"a\rb");
    }

    #[test]
    fn line_len_counts_bytes() {
        let line = Line::from("héllo");
        assert_eq!(line.as_bytes().len(), 6);
        assert!(Line::from("\n").as_bytes().is_empty());
    }

    // -- Reading ------------------------------------------------------------

    #[test]
    fn three_lines_in_order() {
        let store = LineStore::from_reader(&b"abc\ndef\nghi\n"[..]).unwrap();
        assert_eq!(store.numrows(), 3);
        assert_eq!(rows(&store), vec![&b"abc"[..], b"def", b"ghi"]);
    }

    #[test]
    fn missing_final_newline() {
        let store = LineStore::from_reader(&b"abc\ndef"[..]).unwrap();
        assert_eq!(rows(&store), vec![&b"abc"[..], b"def"]);
    }

    #[test]
    fn blank_lines_are_kept() {
        let store = LineStore::from_reader(&b"\n\nx\n\n"[..]).unwrap();
        assert_eq!(rows(&store), vec![&b""[..], b"", b"x", b""]);
    }

    #[test]
    fn crlf_file() {
        let store = LineStore::from_reader(&b"one\r\ntwo\r\n"[..]).unwrap();
        assert_eq!(rows(&store), vec![&b"one"[..], b"two"]);
    }

    #[test]
    fn empty_input_is_empty_store() {
        let store = LineStore::from_reader(&b""[..]).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.numrows(), 0);
    }

    #[test]
    fn invalid_utf8_is_preserved() {
        let store = LineStore::from_reader(&b"\xff\xfe\x00ok\n"[..]).unwrap();
        assert_eq!(store.get(0).unwrap().as_bytes(), b"\xff\xfe\x00ok");
    }

    #[test]
    fn long_line_is_not_split() {
        let long = vec![b'x'; 100_000];
        let mut input = long.clone();
        input.push(b'\n');
        let store = LineStore::from_reader(&input[..]).unwrap();
        assert_eq!(store.numrows(), 1);
        assert_eq!(store.get(0).unwrap().as_bytes(), &long[..]);
    }

    #[test]
    fn get_out_of_range() {
        let store: LineStore = ["a"].into_iter().collect();
        assert!(store.get(1).is_none());
    }

    #[test]
    fn append_row_strips_and_appends() {
        let mut store = LineStore::new();
        store.append_row(b"first\n".to_vec());
        store.append_row(b"second".to_vec());
        assert_eq!(rows(&store), vec![&b"first"[..], b"second"]);
    }

    // -- Files --------------------------------------------------------------

    #[test]
    fn load_file() {
        let file = temp_file(b"abc\ndef\nghi\n");
        let store = LineStore::load(file.path()).unwrap();
        assert_eq!(rows(&store), vec![&b"abc"[..], b"def", b"ghi"]);
    }

    #[test]
    fn open_without_path_is_empty() {
        let store = LineStore::open(None).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn open_with_path_loads() {
        let file = temp_file(b"only\n");
        let store = LineStore::open(Some(file.path())).unwrap();
        assert_eq!(store.numrows(), 1);
    }

    #[test]
    fn load_missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = LineStore::load(&missing).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().starts_with("fopen "), "{err}");
    }

    #[test]
    fn load_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LineStore::load(dir.path()).is_err());
    }
}

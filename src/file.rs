//! Decoder inputs and outputs.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io_stream::ByteStream;

/// A decoded file: relative, `/`-separated path plus its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path:    String,
    pub content: Vec<u8>,
}

impl File {
    /// Backslash separators (common in these archives) are normalized to `/`.
    pub fn new(path: impl Into<String>, content: Vec<u8>) -> Self {
        let path = path.into().replace('\\', "/");
        Self { path, content }
    }

    /// Replace (or add) the extension of the last path component.
    pub fn with_extension(mut self, ext: &str) -> Self {
        self.path = replace_extension(&self.path, ext);
        self
    }
}

fn replace_extension(path: &str, ext: &str) -> String {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let stem_end = match path[name_start..].rfind('.') {
        Some(0) | None => path.len(),
        Some(dot)      => name_start + dot,
    };
    format!("{}.{}", &path[..stem_end], ext)
}

/// What every decoder reads from: the source path (for extension checks and
/// naming outputs) and the stream over its bytes.
#[derive(Debug)]
pub struct InputFile {
    pub path:   PathBuf,
    pub stream: ByteStream,
}

impl InputFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let stream = ByteStream::open(&path)?;
        Ok(Self { path, stream })
    }

    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self { path: path.into(), stream: ByteStream::new(data) }
    }

    /// Case-insensitive extension test.
    pub fn has_extension(&self, ext: &str) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// File name component, lossily converted.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators() {
        let f = File::new("dir\\sub\\a.txt", b"x".to_vec());
        assert_eq!(f.path, "dir/sub/a.txt");
    }

    #[test]
    fn extension_replacement() {
        assert_eq!(replace_extension("a/b.spb", "bmp"), "a/b.bmp");
        assert_eq!(replace_extension("a.b/c", "wav"), "a.b/c.wav");
        assert_eq!(replace_extension(".hidden", "png"), ".hidden.png");
        assert_eq!(File::new("x.koe", vec![]).with_extension("wav").path, "x.wav");
    }

    #[test]
    fn input_extension_checks() {
        let input = InputFile::from_bytes("data/SE.KOE", vec![1, 2]);
        assert!(input.has_extension("koe"));
        assert!(!input.has_extension("bgm"));
        assert_eq!(input.extension().as_deref(), Some("koe"));
        assert_eq!(input.name(), "SE.KOE");
        assert_eq!(input.stream.size(), 2);
    }
}

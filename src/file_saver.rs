//! Sinks for decoded files.
//!
//! The engine only ever calls [`FileSaver::save`].  Two sinks ship with the
//! crate: [`FileSaverHdd`] writes below an output directory and
//! [`FileSaverCallback`] forwards every file to a closure.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};

use crate::error::Result;
use crate::file::File;

pub trait FileSaver {
    fn save(&mut self, file: File) -> Result<()>;
}

// ── Directory sink ────────────────────────────────────────────────────────────

pub struct FileSaverHdd {
    output_dir: PathBuf,
    overwrite:  bool,
    /// Paths written during this run; never overwritten even with
    /// `overwrite` set, so duplicate entry names don't clobber each other.
    written:    HashSet<PathBuf>,
}

impl FileSaverHdd {
    pub fn new<P: AsRef<Path>>(output_dir: P, overwrite: bool) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_owned(),
            overwrite,
            written:    HashSet::new(),
        }
    }

    pub fn output_dir(&self) -> &Path { &self.output_dir }

    fn target_path(&self, relative: &str) -> PathBuf {
        let path = self.output_dir.join(sanitize_path(relative));
        if !self.written.contains(&path) && (self.overwrite || !path.exists()) {
            return path;
        }
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
        (1u32..)
            .map(|n| {
                let name = match &ext {
                    Some(ext) => format!("{stem}({n}).{ext}"),
                    None      => format!("{stem}({n})"),
                };
                path.with_file_name(name)
            })
            .find(|p| !self.written.contains(p) && !p.exists())
            .unwrap_or(path)
    }
}

impl FileSaver for FileSaverHdd {
    fn save(&mut self, file: File) -> Result<()> {
        let path = self.target_path(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.content)?;
        info!("saved {}", path.display());
        self.written.insert(path);
        Ok(())
    }
}

/// Turn an archive-supplied path into a safe relative path: separators are
/// unified, root/`.`/`..` components dropped and characters that are
/// illegal in file names replaced with `_`.
pub fn sanitize_path(path: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for part in path.split(['/', '\\']) {
        if part.is_empty() || part == "." || part == ".." {
            continue;
        }
        let clean: String = part
            .chars()
            .map(|c| match c {
                '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        out.push(clean);
    }
    debug_assert!(out.components().all(|c| matches!(c, Component::Normal(_))));
    if out.as_os_str().is_empty() {
        debug!("empty output path {path:?}, using 'unnamed'");
        out.push("unnamed");
    }
    out
}

// ── Callback sink ─────────────────────────────────────────────────────────────

pub struct FileSaverCallback<F: FnMut(File)> {
    callback: F,
}

impl<F: FnMut(File)> FileSaverCallback<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(File)> FileSaver for FileSaverCallback<F> {
    fn save(&mut self, file: File) -> Result<()> {
        (self.callback)(file);
        Ok(())
    }
}

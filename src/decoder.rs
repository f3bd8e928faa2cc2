//! Capabilities shared by every decoder, and the tagged [`Decoder`] variant
//! the registry hands out.
//!
//! Each concrete format implements exactly one of [`ArchiveDecoder`],
//! [`ImageDecoder`] or [`AudioDecoder`], all of which extend
//! [`BaseDecoder`].

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::archive::ArchiveDecoder;
use crate::audio::AudioDecoder;
use crate::error::{Error, Result};
use crate::file::InputFile;
use crate::image::ImageDecoder;

pub trait BaseDecoder {
    /// Cheap format test (magic, extension, coarse bounds).  Called with the
    /// stream at offset 0; may move it and may fail.  Callers should use
    /// [`BaseDecoder::is_recognized`] instead.
    fn recognize(&self, input: &mut InputFile) -> Result<bool>;

    /// Never fails: errors count as "not mine".  The stream position is the
    /// same before and after the call.
    fn is_recognized(&self, input: &mut InputFile) -> bool {
        let old_pos = input.stream.tell();
        let verdict = match input.stream.seek(0) {
            Ok(()) => self.recognize(input).unwrap_or_else(|e| {
                debug!("recognition of {} failed: {e}", input.path.display());
                false
            }),
            Err(_) => false,
        };
        input.stream.seek(old_pos).ok();
        verdict
    }

    fn plugin_names(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn set_plugin(&mut self, name: &str) -> Result<()> {
        Err(Error::unsupported(format!("decoder has no plugins (requested '{name}')")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    Archive,
    Image,
    Audio,
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecoderKind::Archive => "archive",
            DecoderKind::Image   => "image",
            DecoderKind::Audio   => "audio",
        })
    }
}

pub enum Decoder {
    Archive(Box<dyn ArchiveDecoder>),
    Image(Box<dyn ImageDecoder>),
    Audio(Box<dyn AudioDecoder>),
}

impl Decoder {
    pub fn kind(&self) -> DecoderKind {
        match self {
            Decoder::Archive(_) => DecoderKind::Archive,
            Decoder::Image(_)   => DecoderKind::Image,
            Decoder::Audio(_)   => DecoderKind::Audio,
        }
    }

    pub fn is_recognized(&self, input: &mut InputFile) -> bool {
        match self {
            Decoder::Archive(d) => d.is_recognized(input),
            Decoder::Image(d)   => d.is_recognized(input),
            Decoder::Audio(d)   => d.is_recognized(input),
        }
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        match self {
            Decoder::Archive(d) => d.plugin_names(),
            Decoder::Image(d)   => d.plugin_names(),
            Decoder::Audio(d)   => d.plugin_names(),
        }
    }

    pub fn set_plugin(&mut self, name: &str) -> Result<()> {
        match self {
            Decoder::Archive(d) => d.set_plugin(name),
            Decoder::Image(d)   => d.set_plugin(name),
            Decoder::Audio(d)   => d.set_plugin(name),
        }
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decoder::{:?}", self.kind())
    }
}

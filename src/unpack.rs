//! End-to-end extraction: pick a decoder, run it, hand the results to a
//! [`FileSaver`].
//!
//! For archives, directory and `preprocess` failures abort the input.  Once
//! extraction has started, a failing entry is logged and recorded in the
//! [`UnpackReport`] and the remaining entries are still extracted.

use log::{info, warn};
use serde::Serialize;

use crate::archive::ArchiveMeta;
use crate::decoder::Decoder;
use crate::encode::{audio_to_wav, image_to_bmp};
use crate::error::{Error, Result};
use crate::file::InputFile;
use crate::file_saver::FileSaver;
use crate::registry::Registry;

// ── UnpackOptions ─────────────────────────────────────────────────────────────

/// Configuration for [`Unpacker`].
#[derive(Debug, Clone, Default)]
pub struct UnpackOptions {
    /// Skip detection and use this format identifier.
    pub format: Option<String>,
    /// Plugin to select on the decoder before decoding.
    pub plugin: Option<String>,
}

// ── UnpackReport ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub path:  String,
    pub error: String,
}

/// Outcome of one input.
#[derive(Debug, Clone, Serialize)]
pub struct UnpackReport {
    pub format:   &'static str,
    pub saved:    usize,
    pub failures: Vec<EntryFailure>,
}

impl UnpackReport {
    fn new(format: &'static str) -> Self {
        Self { format, saved: 0, failures: Vec::new() }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ── Unpacker ──────────────────────────────────────────────────────────────────

pub struct Unpacker<'r> {
    registry: &'r Registry,
    options:  UnpackOptions,
}

impl<'r> Unpacker<'r> {
    pub fn new(registry: &'r Registry, options: UnpackOptions) -> Self {
        Self { registry, options }
    }

    /// Explicit format if configured, detection otherwise; then the plugin.
    pub fn select(&self, input: &mut InputFile) -> Result<(&'static str, Decoder)> {
        let (id, mut decoder) = match &self.options.format {
            Some(id) => {
                let format = self
                    .registry
                    .get(id)
                    .ok_or_else(|| Error::UnknownFormat(id.clone()))?;
                (format.id, format.create())
            }
            None => {
                let (format, decoder) = self.registry.detect(input)?;
                (format.id, decoder)
            }
        };
        if let Some(plugin) = &self.options.plugin {
            decoder.set_plugin(plugin)?;
        }
        Ok((id, decoder))
    }

    /// Archive directory only; nothing is extracted.
    pub fn list(&self, input: &mut InputFile) -> Result<(&'static str, ArchiveMeta)> {
        match self.select(input)? {
            (id, Decoder::Archive(decoder)) => Ok((id, decoder.read_meta(input)?)),
            (id, decoder) => Err(Error::unsupported(format!(
                "{id} is an {} format, not an archive",
                decoder.kind()
            ))),
        }
    }

    pub fn unpack(&self, input: &mut InputFile, saver: &mut dyn FileSaver) -> Result<UnpackReport> {
        let (id, decoder) = self.select(input)?;
        info!("{}: {id}", input.path.display());
        let mut report = UnpackReport::new(id);

        match decoder {
            Decoder::Archive(decoder) => {
                let mut meta = decoder.read_meta(input)?;
                decoder.preprocess(input, &mut meta, saver)?;
                for entry in &meta.entries {
                    let result = decoder
                        .read_file(input, &meta, entry)
                        .and_then(|file| saver.save(file));
                    match result {
                        Ok(()) => report.saved += 1,
                        Err(e) => {
                            warn!("{}: {}: {e}", input.path.display(), entry.path);
                            report.failures.push(EntryFailure {
                                path:  entry.path.clone(),
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }
            Decoder::Image(decoder) => {
                let image = decoder.decode(input)?;
                saver.save(image_to_bmp(&image, &input.name())?)?;
                report.saved = 1;
            }
            Decoder::Audio(decoder) => {
                let audio = decoder.decode(input)?;
                saver.save(audio_to_wav(&audio, &input.name())?)?;
                report.saved = 1;
            }
        }
        Ok(report)
    }
}

//! Built-in formats and the routine that registers them.
//!
//! Registration order is detection order (see [`crate::registry`]): formats
//! with a magic number come first, extension-gated formats next, and the
//! generic WAV decoder last so that obfuscated WAV variants win over it.

pub mod leaf_lac;
pub mod mebius_koe;
pub mod microsoft_wav;
pub mod nscripter_sar;
pub mod nscripter_spb;

use encoding_rs::SHIFT_JIS;

use crate::decoder::Decoder;
use crate::error::Result;
use crate::registry::{Registry, RegistryBuilder};

pub fn register_all(builder: &mut RegistryBuilder) -> Result<()> {
    builder
        .register("leaf/lac", || Decoder::Archive(Box::new(leaf_lac::LacArchiveDecoder)))?
        .register("nscripter/sar", || Decoder::Archive(Box::new(nscripter_sar::SarArchiveDecoder)))?
        .register("nscripter/spb", || Decoder::Image(Box::new(nscripter_spb::SpbImageDecoder)))?
        .register("mebius/koe", || Decoder::Audio(Box::new(mebius_koe::KoeAudioDecoder::new())))?
        .register("microsoft/wav", || Decoder::Audio(Box::new(microsoft_wav::WavAudioDecoder)))?;
    Ok(())
}

/// Registry holding every built-in format.
pub fn default_registry() -> Result<Registry> {
    let mut builder = Registry::builder();
    register_all(&mut builder)?;
    Ok(builder.build())
}

/// Archive member names are Shift-JIS with `\` separators.
pub(crate) fn decode_name(raw: &[u8]) -> String {
    let (name, _) = SHIFT_JIS.decode_without_bom_handling(raw);
    name.replace('\\', "/")
}

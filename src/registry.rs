//! Format registry: identifier → decoder factory.
//!
//! # Lifecycle
//! A [`RegistryBuilder`] collects registrations (identifiers must be unique)
//! and is frozen into an immutable [`Registry`] by `build()`.  The registry is
//! then passed by reference to whoever needs it; nothing mutates it again.
//!
//! # Detection order
//! [`Registry::detect`] walks formats in registration order and returns the
//! first one whose recognition predicate accepts the input.  Registration
//! order is therefore part of the contract: specific formats must be
//! registered before permissive ones.

use log::debug;
use serde::Serialize;

use crate::decoder::{Decoder, DecoderKind};
use crate::error::{Error, Result};
use crate::file::InputFile;

pub type Factory = fn() -> Decoder;

#[derive(Clone, Copy, Serialize)]
pub struct FormatDescriptor {
    pub id:   &'static str,
    pub kind: DecoderKind,
    #[serde(skip)]
    factory:  Factory,
}

impl FormatDescriptor {
    /// Fresh, unconfigured decoder instance.
    pub fn create(&self) -> Decoder {
        (self.factory)()
    }
}

impl std::fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    formats: Vec<FormatDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, id: &'static str, factory: Factory) -> Result<&mut Self> {
        if self.formats.iter().any(|f| f.id == id) {
            return Err(Error::DuplicateFormat(id.to_owned()));
        }
        let kind = factory().kind();
        self.formats.push(FormatDescriptor { id, kind, factory });
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry { formats: self.formats }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Registry {
    formats: Vec<FormatDescriptor>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder { RegistryBuilder::new() }

    pub fn get(&self, id: &str) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.id == id)
    }

    /// Explicit selection; bypasses recognition entirely.
    pub fn create(&self, id: &str) -> Result<Decoder> {
        self.get(id)
            .map(FormatDescriptor::create)
            .ok_or_else(|| Error::UnknownFormat(id.to_owned()))
    }

    /// Formats in registration (= detection) order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.formats.iter()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.id).collect()
    }

    pub fn len(&self) -> usize { self.formats.len() }

    pub fn is_empty(&self) -> bool { self.formats.is_empty() }

    /// First format whose predicate accepts `input`.
    pub fn detect(&self, input: &mut InputFile) -> Result<(&FormatDescriptor, Decoder)> {
        for format in &self.formats {
            let decoder = format.create();
            if decoder.is_recognized(input) {
                debug!("{} recognized as {}", input.path.display(), format.id);
                return Ok((format, decoder));
            }
        }
        Err(Error::UnrecognizedFormat)
    }
}

pub mod error;
pub mod io_stream;
pub mod file;
pub mod plugin;
pub mod decoder;
pub mod archive;
pub mod image;
pub mod audio;
pub mod file_saver;
pub mod registry;
pub mod formats;
pub mod encode;
pub mod logger;
pub mod unpack;

pub use error::{Error, Result};
pub use io_stream::{BitReader, ByteStream};
pub use file::{File, InputFile};
pub use decoder::{BaseDecoder, Decoder, DecoderKind};
pub use archive::{ArchiveDecoder, ArchiveEntry, ArchiveMeta};
pub use image::{Image, ImageDecoder};
pub use audio::{Audio, AudioDecoder};
pub use file_saver::{FileSaver, FileSaverCallback, FileSaverHdd};
pub use registry::{FormatDescriptor, Registry, RegistryBuilder};
pub use formats::default_registry;
pub use unpack::{UnpackOptions, UnpackReport, Unpacker};

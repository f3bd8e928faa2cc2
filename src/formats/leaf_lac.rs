//! Leaf LAC archives.
//!
//! ```text
//! "LAC\0"
//! u32 LE  entry count
//! entry × count:
//!     [u8; 32]  name, every byte XOR 0xFF, null padded
//!     u32 LE    size
//!     u32 LE    offset (absolute)
//! payloads, stored verbatim
//! ```

use crate::archive::{ArchiveDecoder, ArchiveEntry, ArchiveMeta};
use crate::decoder::BaseDecoder;
use crate::error::{Error, Result};
use crate::file::{File, InputFile};
use crate::formats::decode_name;

pub const MAGIC: &[u8; 4] = b"LAC\0";
const NAME_SIZE: usize = 32;
const ENTRY_SIZE: u64 = NAME_SIZE as u64 + 8;

pub struct LacArchiveDecoder;

/// Undo the name obfuscation.  The field ends at the first byte that decodes
/// to zero; a literal zero on disk also terminates it, since some packers pad
/// without obfuscating the padding.
fn decode_lac_name(field: &[u8]) -> String {
    let raw: Vec<u8> = field
        .iter()
        .take_while(|&&b| b != 0xFF && b != 0x00)
        .map(|b| b ^ 0xFF)
        .collect();
    decode_name(&raw)
}

impl BaseDecoder for LacArchiveDecoder {
    fn recognize(&self, input: &mut InputFile) -> Result<bool> {
        Ok(&input.stream.read_array::<4>()? == MAGIC)
    }
}

impl ArchiveDecoder for LacArchiveDecoder {
    fn read_meta(&self, input: &mut InputFile) -> Result<ArchiveMeta> {
        let stream = &mut input.stream;
        stream.seek(0)?;
        let magic = stream.read_array::<4>()?;
        if &magic != MAGIC {
            return Err(Error::malformed(format!("bad LAC magic {}", hex::encode(magic))));
        }
        let count = stream.read_u32_le()?;
        if u64::from(count) * ENTRY_SIZE > stream.left() {
            return Err(Error::malformed(format!("LAC directory of {count} entries exceeds file")));
        }

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let field = stream.read_array::<NAME_SIZE>()?;
            let size = stream.read_u32_le()?;
            let offset = stream.read_u32_le()?;
            entries.push(ArchiveEntry::new(decode_lac_name(&field), offset.into(), size.into()));
        }

        let meta = ArchiveMeta::new(entries);
        meta.check_bounds(stream.size())?;
        Ok(meta)
    }

    fn read_file(
        &self,
        input: &mut InputFile,
        _meta: &ArchiveMeta,
        entry: &ArchiveEntry,
    ) -> Result<File> {
        input.stream.seek(entry.offset)?;
        let data = input.stream.read(entry.size as usize)?;
        Ok(File::new(entry.path.clone(), data))
    }
}

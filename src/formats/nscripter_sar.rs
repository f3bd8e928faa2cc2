//! NScripter SAR archives.
//!
//! ```text
//! u16 BE  entry count
//! u32 BE  data offset
//! entry × count:
//!     name, zero-terminated Shift-JIS, `\` separators
//!     u32 BE  offset relative to the data offset
//!     u32 BE  size
//! payloads, stored verbatim
//! ```
//!
//! There is no magic; recognition requires the `.sar` extension and a
//! directory whose entries all fit inside the file.

use crate::archive::{ArchiveDecoder, ArchiveEntry, ArchiveMeta};
use crate::decoder::BaseDecoder;
use crate::error::{Error, Result};
use crate::file::{File, InputFile};
use crate::formats::decode_name;
use crate::io_stream::ByteStream;

pub struct SarArchiveDecoder;

fn read_directory(stream: &mut ByteStream) -> Result<Vec<ArchiveEntry>> {
    let count = stream.read_u16_be()?;
    let data_offset = u64::from(stream.read_u32_be()?);
    if data_offset > stream.size() {
        return Err(Error::malformed(format!(
            "data offset {data_offset} beyond file size {}",
            stream.size()
        )));
    }

    let mut entries = Vec::with_capacity(count.into());
    for _ in 0..count {
        let name = stream.read_to_zero(stream.left() as usize)?;
        let offset = data_offset + u64::from(stream.read_u32_be()?);
        let size = u64::from(stream.read_u32_be()?);
        entries.push(ArchiveEntry::new(decode_name(&name), offset, size));
    }
    Ok(entries)
}

impl BaseDecoder for SarArchiveDecoder {
    fn recognize(&self, input: &mut InputFile) -> Result<bool> {
        if !input.has_extension("sar") {
            return Ok(false);
        }
        let meta = ArchiveMeta::new(read_directory(&mut input.stream)?);
        Ok(meta.check_bounds(input.stream.size()).is_ok())
    }
}

impl ArchiveDecoder for SarArchiveDecoder {
    fn read_meta(&self, input: &mut InputFile) -> Result<ArchiveMeta> {
        input.stream.seek(0)?;
        let meta = ArchiveMeta::new(read_directory(&mut input.stream)?);
        meta.check_bounds(input.stream.size())?;
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

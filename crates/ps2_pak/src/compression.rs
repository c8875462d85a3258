//! Whole archive compression and decompression handling.
//!
//! A compressed archive is the size of the normal archive it holds, directly followed by a zlib
//! stream of that archive. The stream header doubles as the marker that identifies the encoding.

use std::io::{Cursor, Read, Write};

use binrw::BinRead;
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::format::{PakKind, DETECT_LEN};
use crate::types::{CompressedHeader, ZLIB_MARKER};

/// Offset of the zlib stream in a compressed archive
const STREAM_START: usize = 4;

/// Upper bound of deflate's expansion, in output bytes per input byte
const MAX_INFLATE_RATIO: u64 = 1032;

/// Wrap a complete normal archive into a compressed one.
#[instrument(skip_all, err, fields(size = normal.len()))]
pub fn compress_container(normal: &[u8]) -> Result<Vec<u8>> {
    let uncompressed_size = u32::try_from(normal.len()).map_err(|_| Error::ArchiveTooLarge)?;

    let mut out = Vec::with_capacity(normal.len() / 2 + STREAM_START);
    out.extend_from_slice(&uncompressed_size.to_le_bytes());

    // only the best level produces the 78 DA stream header the game looks for
    let mut encoder = ZlibEncoder::new(out, Compression::best());
    encoder.write_all(normal)?;
    let out = encoder.finish()?;

    debug!(compressed = out.len(), "compressed archive");
    Ok(out)
}

/// Unwrap a compressed archive, returning the normal archive inside it.
#[instrument(skip_all, err, fields(size = compressed.len()))]
pub fn decompress_container(compressed: &[u8]) -> Result<Vec<u8>> {
    if compressed.len() < DETECT_LEN {
        return Err(Error::CorruptCompressedStream(format!(
            "{} bytes are too short for a compressed header",
            compressed.len()
        )));
    }

    let header = CompressedHeader::read(&mut Cursor::new(compressed))?;
    if header.marker != ZLIB_MARKER {
        return Err(Error::CorruptCompressedStream(format!(
            "expected stream marker {:02X?}, found {:02X?}",
            ZLIB_MARKER, header.marker
        )));
    }

    let stream_len = (compressed.len() - STREAM_START) as u64;
    if header.uncompressed_size as u64 > stream_len * MAX_INFLATE_RATIO {
        return Err(Error::CorruptCompressedStream(format!(
            "header declares {} bytes, more than {stream_len} bytes of stream can hold",
            header.uncompressed_size
        )));
    }

    let expected = header.uncompressed_size as usize;
    let mut normal = Vec::new();
    normal.try_reserve_exact(expected)?;

    // one byte past the declared size is enough to notice a stream that is too long
    ZlibDecoder::new(&compressed[STREAM_START..])
        .take(expected as u64 + 1)
        .read_to_end(&mut normal)
        .map_err(|e| Error::CorruptCompressedStream(e.to_string()))?;

    if normal.len() != expected {
        return Err(Error::CorruptCompressedStream(format!(
            "header declares {expected} bytes but the stream holds {}",
            normal.len()
        )));
    }

    if PakKind::detect(&normal) != PakKind::Normal {
        return Err(Error::CorruptCompressedStream(
            "stream does not contain a normal archive".into(),
        ));
    }

    debug!(uncompressed = normal.len(), "decompressed archive");
    Ok(normal)
}

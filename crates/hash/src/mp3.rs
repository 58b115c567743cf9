//! MP3 audio-region detection.
//!
//! An MP3 file is a stream of MPEG audio frames, optionally wrapped in tags:
//! any number of ID3v2 regions (plus zero padding) at the start and a single
//! 128-byte ID3v1 block at the end. [`audio_region`] finds the byte range of
//! the frames alone, so files that only differ in their tags hash the same.

use crate::READ_CHUNK_SIZE;
use crate::error::{ErrorKind, Result};
use std::io::{Read, Seek, SeekFrom};

const ID3V2_HEADER_LEN: u64 = 10;
const ID3V1_LEN: u64 = 128;
const SYNC_MASK: u16 = 0xFFF0;

/// Something found in front of the audio frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Structure {
    /// An ID3v2 tag, header included.
    Id3v2 { offset: u64, length: u64 },
    /// A run of zero bytes.
    Padding { offset: u64, length: u64 },
    /// Content that is neither a tag, padding nor a frame sync word;
    /// detection stopped here.
    Unknown { offset: u64 },
}

/// Byte range of the audio frames of an MP3 file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioRegion {
    pub offset: u64,
    pub length: u64,
    /// Everything skipped on the way to `offset`, in file order.
    pub structures: Vec<Structure>,
}

/// Decode a synch-safe integer: 7 significant bits per byte, big-endian.
fn synch_safe(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |value, byte| (value << 7) | u64::from(byte & 0x7F))
}

/// Fill as much of `buffer` as the input allows, returning the count read.
fn read_up_to<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        }
    }
    Ok(filled)
}

/// Offset of the first non-zero byte at or after `offset` (or the end of
/// the input).
fn skip_zeros<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<u64> {
    reader.seek(SeekFrom::Start(offset)).map_err(ErrorKind::Io)?;
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];
    let mut position = offset;
    loop {
        let read = read_up_to(reader, &mut buffer)?;
        if read == 0 {
            return Ok(position);
        }
        if let Some(index) = buffer[..read].iter().position(|byte| *byte != 0) {
            return Ok(position + index as u64);
        }
        position += read as u64;
    }
}

fn has_id3v1<R: Read + Seek>(reader: &mut R, file_len: u64) -> Result<bool> {
    if file_len < ID3V1_LEN {
        return Ok(false);
    }
    reader.seek(SeekFrom::Start(file_len - ID3V1_LEN)).map_err(ErrorKind::Io)?;
    let mut magic = [0u8; 3];
    Ok(read_up_to(reader, &mut magic)? == 3 && &magic == b"TAG")
}

/// Locate the audio frames of an MP3 stream.
///
/// Stacked ID3v2 tags and zero padding are skipped until a frame sync word
/// is found. Anything else stops detection where it is, with a warning: the
/// result is then a best guess rather than an error. A trailing ID3v1 block
/// is excluded from the length.
///
/// # Errors
/// I/O failures, and [`ErrorKind::NoProgress`] if detection stalls.
pub fn audio_region<R: Read + Seek>(reader: &mut R) -> Result<AudioRegion> {
    let file_len = reader.seek(SeekFrom::End(0)).map_err(ErrorKind::Io)?;
    let mut offset = 0;
    let mut previous = None;
    let mut structures = Vec::new();

    loop {
        if previous == Some(offset) {
            exn::bail!(ErrorKind::NoProgress { offset });
        }
        previous = Some(offset);

        reader.seek(SeekFrom::Start(offset)).map_err(ErrorKind::Io)?;
        let mut header = [0u8; ID3V2_HEADER_LEN as usize];
        let read = read_up_to(reader, &mut header)?;

        if read == header.len() && &header[..3] == b"ID3" {
            let length = ID3V2_HEADER_LEN + synch_safe(&header[6..10]);
            structures.push(Structure::Id3v2 { offset, length });
            offset += length;
            continue;
        }
        if read >= 2 {
            let word = u16::from_be_bytes([header[0], header[1]]);
            if word & SYNC_MASK == SYNC_MASK {
                break;
            }
            if word == 0 {
                let end = skip_zeros(reader, offset)?;
                structures.push(Structure::Padding { offset, length: end - offset });
                offset = end;
                continue;
            }
        }
        tracing::warn!(offset, "Unrecognized content in front of the audio frames; audio boundary detection may be inaccurate");
        structures.push(Structure::Unknown { offset });
        break;
    }

    let tail = if has_id3v1(reader, file_len)? { ID3V1_LEN } else { 0 };
    let length = file_len.saturating_sub(offset).saturating_sub(tail);
    Ok(AudioRegion { offset, length, structures })
}

//! Content hashing for duplicate detection.
//!
//! Files are read in [`READ_CHUNK_SIZE`] chunks through SHA-224; the
//! lowercase hex digest identifies the content. Which bytes count as "the
//! content" is decided by a [`ContentRange`] strategy: the whole file, or
//! only the audio frames of an MP3.

pub mod error;
pub mod mp3;

use crate::error::{ErrorKind, Result};
use sha2::{Digest, Sha224};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

pub const READ_CHUNK_SIZE: usize = 16 * 1024;

/// Which bytes of a file are hashed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentRange {
    /// Every byte of the file.
    #[default]
    Whole,
    /// The MPEG audio frames only, without ID3 tags or padding.
    Mp3Audio,
}

impl ContentRange {
    /// The audio-aware strategy for `.mp3` files (case-insensitive), whole
    /// file otherwise.
    pub fn for_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("mp3") => Self::Mp3Audio,
            _ => Self::Whole,
        }
    }
}

/// Hash everything `reader` yields, chunk by chunk.
pub fn hash_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha224::new();
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Hash the selected range of a seekable source.
pub fn hash_range<R: Read + Seek>(mut reader: R, range: ContentRange) -> Result<String> {
    match range {
        ContentRange::Whole => hash_reader(reader),
        ContentRange::Mp3Audio => {
            let region = mp3::audio_region(&mut reader)?;
            reader.seek(SeekFrom::Start(region.offset)).map_err(ErrorKind::Io)?;
            hash_reader(reader.take(region.length))
        },
    }
}

/// Hash the selected range of the file at `path`.
#[tracing::instrument(level = "debug", skip(range))]
pub fn hash_file(path: &Path, range: ContentRange) -> Result<String> {
    let file = File::open(path).map_err(ErrorKind::Io)?;
    let digest = hash_range(file, range)?;
    tracing::debug!(%digest, ?range, "Calculated content hash");
    Ok(digest)
}

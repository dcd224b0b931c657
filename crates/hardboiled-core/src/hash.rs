//! File hashing for cache busting.
//!
//! Digests are computed by streaming the file in fixed-size chunks and are
//! returned as lowercase hex strings.

use std::{fs::File, io::Read, path::Path};

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Default length of a short hash.
pub const DEFAULT_SHORT_HASH_LEN: usize = 8;

const CHUNK_SIZE: usize = 8192;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// MD5, 32 hex characters.
    #[default]
    Md5,
    /// SHA-1, 40 hex characters.
    Sha1,
    /// SHA-256, 64 hex characters.
    Sha256,
}

impl HashAlgorithm {
    /// Length of the hex digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
        }
    }
}

/// Hash a file's contents.
pub fn get_file_hash(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; CHUNK_SIZE];

    let digest = match algorithm {
        HashAlgorithm::Md5 => {
            let mut context = md5::Context::new();
            read_chunks(&mut file, &mut buffer, |chunk| context.consume(chunk))?;
            format!("{:x}", context.compute())
        }
        HashAlgorithm::Sha1 => {
            let mut hasher = Sha1::new();
            read_chunks(&mut file, &mut buffer, |chunk| hasher.update(chunk))?;
            format!("{:x}", hasher.finalize())
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            read_chunks(&mut file, &mut buffer, |chunk| hasher.update(chunk))?;
            format!("{:x}", hasher.finalize())
        }
    };

    Ok(digest)
}

/// Short MD5 hash for cache-busting URLs.
///
/// `length` is clamped to the digest length.
pub fn get_file_hash_short(path: &Path, length: usize) -> Result<String> {
    let mut digest = get_file_hash(path, HashAlgorithm::Md5)?;
    digest.truncate(length.min(digest.len()));
    Ok(digest)
}

fn read_chunks(
    reader: &mut impl Read,
    buffer: &mut [u8],
    mut consume: impl FnMut(&[u8]),
) -> std::io::Result<()> {
    loop {
        let n = reader.read(buffer)?;
        if n == 0 {
            return Ok(());
        }
        consume(&buffer[..n]);
    }
}

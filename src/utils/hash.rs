//! SHA-1 content digests used to address blobs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest as _, Sha1};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Length of a digest in bytes (160 bits).
pub const DIGEST_LEN: usize = 20;

/// A 160-bit content digest.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, 40 characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Name of the shard directory holding this digest's blob: the first
    /// byte as two hex characters.
    #[must_use]
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// Parse a 40 character hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string has the wrong length or is not hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .with_context(|| format!("Invalid digest: {s:?}"))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[must_use]
pub fn hash_bytes(data: &[u8]) -> Digest {
    let mut hasher = Sha1::new();
    hasher.update(data);
    finish(hasher)
}

/// Stream a file through SHA-1.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> Result<Digest> {
    let file =
        File::open(path).with_context(|| format!("Failed to open for hashing: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; 65536];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(finish(hasher))
}

fn finish(hasher: Sha1) -> Digest {
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&hasher.finalize());
    Digest(bytes)
}

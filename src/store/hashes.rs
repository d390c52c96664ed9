//! Sample digests

use md5::Md5;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Digests identifying one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHashes {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

impl FileHashes {
    /// Hash the file at `path` in one streaming pass
    pub fn compute(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut md5 = Md5::new();
        let mut sha1 = Sha1::new();
        let mut sha256 = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            md5.update(&buf[..n]);
            sha1.update(&buf[..n]);
            sha256.update(&buf[..n]);
        }
        Ok(Self {
            md5: format!("{:x}", md5.finalize()),
            sha1: format!("{:x}", sha1.finalize()),
            sha256: format!("{:x}", sha256.finalize()),
        })
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            md5: format!("{:x}", Md5::digest(data)),
            sha1: format!("{:x}", Sha1::digest(data)),
            sha256: format!("{:x}", Sha256::digest(data)),
        }
    }
}

//! Content probes used when the identification tools are inconclusive

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

const PE_OFFSET_FIELD: u64 = 0x3c;
const PE_OFFSET_LIMIT: u32 = 1024;
const PDF_WINDOW: usize = 1024;
const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const ZIP_END_OF_DIRECTORY: &[u8] = b"PK\x05\x06";
// 22 byte record plus the largest possible archive comment
const ZIP_TAIL_WINDOW: u64 = 22 + 65_535;
const OLE_SIGNATURE: &[u8] = &[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];
const OLE_BETA_SIGNATURE: &[u8] = &[0x0e, 0x11, 0xfc, 0x0d, 0xd0, 0xcf, 0x11, 0x0e];

/// Byte-level file type check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `MZ` header whose `e_lfanew` (at most 1024) points at `PE`
    PeHeader,
    /// `%PDF-` somewhere in the first 1024 bytes
    PdfMarker,
    /// Local file header at offset 0 or an end-of-central-directory record
    ZipSignature,
    /// OLE2 compound document header
    OleSignature,
}

impl Probe {
    /// Check `path`; I/O errors are returned to the caller
    pub fn check(&self, path: &Path) -> io::Result<bool> {
        let mut file = File::open(path)?;
        match self {
            Probe::PeHeader => is_pe(&mut file),
            Probe::PdfMarker => {
                let head = read_head(&mut file, PDF_WINDOW)?;
                Ok(contains(&head, b"%PDF-"))
            }
            Probe::ZipSignature => is_zip(&mut file),
            Probe::OleSignature => {
                let head = read_head(&mut file, OLE_SIGNATURE.len())?;
                Ok(head == OLE_SIGNATURE || head == OLE_BETA_SIGNATURE)
            }
        }
    }
}

fn read_head(file: &mut File, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn is_pe(file: &mut File) -> io::Result<bool> {
    let mut mz = [0u8; 2];
    if file.read_exact(&mut mz).is_err() || &mz != b"MZ" {
        return Ok(false);
    }

    file.seek(SeekFrom::Start(PE_OFFSET_FIELD))?;
    let mut raw = [0u8; 4];
    if file.read_exact(&mut raw).is_err() {
        return Ok(false);
    }
    let offset = u32::from_le_bytes(raw);
    if offset > PE_OFFSET_LIMIT {
        return Ok(false);
    }

    file.seek(SeekFrom::Start(u64::from(offset)))?;
    let mut pe = [0u8; 2];
    if file.read_exact(&mut pe).is_err() {
        return Ok(false);
    }
    Ok(&pe == b"PE")
}

fn is_zip(file: &mut File) -> io::Result<bool> {
    let head = read_head(file, ZIP_LOCAL_HEADER.len())?;
    if head == ZIP_LOCAL_HEADER {
        return Ok(true);
    }

    let size = file.metadata()?.len();
    let start = size.saturating_sub(ZIP_TAIL_WINDOW);
    file.seek(SeekFrom::Start(start))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;
    Ok(contains(&tail, ZIP_END_OF_DIRECTORY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_sample(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn pe_bytes(e_lfanew: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 0x200];
        bytes[0..2].copy_from_slice(b"MZ");
        bytes[0x3c..0x40].copy_from_slice(&e_lfanew.to_le_bytes());
        let at = e_lfanew as usize;
        if at + 2 <= bytes.len() {
            bytes[at..at + 2].copy_from_slice(b"PE");
        }
        bytes
    }

    #[test]
    fn test_pe_header() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_sample(&dir, "good.exe", &pe_bytes(0x80));
        assert!(Probe::PeHeader.check(&good).unwrap());

        let mut broken = pe_bytes(0x80);
        broken[0x80] = b'X';
        let broken = write_sample(&dir, "broken.exe", &broken);
        assert!(!Probe::PeHeader.check(&broken).unwrap());

        let far = write_sample(&dir, "far.exe", &pe_bytes(4096));
        assert!(!Probe::PeHeader.check(&far).unwrap());

        let tiny = write_sample(&dir, "tiny.exe", b"MZ");
        assert!(!Probe::PeHeader.check(&tiny).unwrap());
    }

    #[test]
    fn test_pdf_marker_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut shifted = vec![b' '; 100];
        shifted.extend_from_slice(b"%PDF-1.7\n");
        let near = write_sample(&dir, "near.pdf", &shifted);
        assert!(Probe::PdfMarker.check(&near).unwrap());

        let mut late = vec![b' '; 2048];
        late.extend_from_slice(b"%PDF-1.7\n");
        let late = write_sample(&dir, "late.pdf", &late);
        assert!(!Probe::PdfMarker.check(&late).unwrap());
    }

    #[test]
    fn test_zip_signatures() {
        let dir = tempfile::tempdir().unwrap();
        let local = write_sample(&dir, "a.zip", b"PK\x03\x04rest-of-archive");
        assert!(Probe::ZipSignature.check(&local).unwrap());

        // Self-extracting style: stub first, directory record at the end
        let mut sfx = b"MZ stub".to_vec();
        sfx.extend_from_slice(b"PK\x05\x06");
        sfx.extend_from_slice(&[0u8; 18]);
        let sfx = write_sample(&dir, "sfx.exe", &sfx);
        assert!(Probe::ZipSignature.check(&sfx).unwrap());

        let plain = write_sample(&dir, "plain.txt", b"hello");
        assert!(!Probe::ZipSignature.check(&plain).unwrap());
    }

    #[test]
    fn test_ole_signature() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = OLE_SIGNATURE.to_vec();
        doc.extend_from_slice(&[0u8; 64]);
        let doc = write_sample(&dir, "a.doc", &doc);
        assert!(Probe::OleSignature.check(&doc).unwrap());

        let other = write_sample(&dir, "b.doc", b"not an ole file");
        assert!(!Probe::OleSignature.check(&other).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Probe::PdfMarker.check(&dir.path().join("missing")).is_err());
    }
}

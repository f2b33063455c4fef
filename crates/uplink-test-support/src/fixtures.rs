//! Sample files with real content signatures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Bytes that sniff as `video/mp4`.
#[must_use]
pub fn mp4_bytes() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x00, 0x00, 0x20];
    bytes.extend_from_slice(b"ftypisom");
    bytes.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
    bytes.extend_from_slice(b"isomiso2avc1mp41");
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

/// Bytes that sniff as `application/pdf`.
#[must_use]
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n".to_vec()
}

/// Write `contents` to `root/relative`, creating parent directories.
///
/// # Errors
///
/// Propagates filesystem failures.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> io::Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// Write every `(relative, contents)` pair beneath `root`.
///
/// # Errors
///
/// Propagates filesystem failures.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) -> io::Result<Vec<PathBuf>> {
    files
        .iter()
        .map(|(relative, contents)| write_file(root, relative, contents))
        .collect()
}

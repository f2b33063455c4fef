//! Content-based MIME detection.
//!
//! The leading bytes decide the type; the file name is only consulted when no
//! known signature matches.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use mime_guess::mime;

use crate::error::{FsOpsError, FsOpsResult};

/// MIME type reported when neither content nor name identify the file.
pub const FALLBACK_MIME: &str = "application/octet-stream";

const SNIFF_LEN: u64 = 512;
const TS_PACKET_LEN: usize = 188;

const SIGNATURES: &[(&[u8], &str)] = &[
    (&[0x00, 0x00, 0x01, 0xBA], "video/mpeg"),
    (&[0x00, 0x00, 0x01, 0xB3], "video/mpeg"),
    (b"FLV\x01", "video/x-flv"),
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"PK\x03\x04", "application/zip"),
    (&[0x1F, 0x8B], "application/gzip"),
    (b"ID3", "audio/mpeg"),
    (b"OggS", "application/ogg"),
    (b"fLaC", "audio/flac"),
];

/// Inspect the first bytes of `path` and return its MIME type.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or read.
pub fn sniff_mime(path: &Path) -> FsOpsResult<String> {
    let file = File::open(path).map_err(|source| FsOpsError::io("sniff.open", path, source))?;
    let mut head = Vec::new();
    file.take(SNIFF_LEN)
        .read_to_end(&mut head)
        .map_err(|source| FsOpsError::io("sniff.read", path, source))?;

    Ok(sniff_bytes(&head).map_or_else(|| guess_from_name(path, &head), str::to_string))
}

/// Match `bytes` against known container and file signatures.
#[must_use]
pub fn sniff_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return Some(match &bytes[8..12] {
            b"qt  " => "video/quicktime",
            b"M4A " | b"M4B " => "audio/mp4",
            b"heic" | b"heix" => "image/heic",
            b"avif" => "image/avif",
            b"3gp4" | b"3gp5" | b"3g2a" => "video/3gpp",
            _ => "video/mp4",
        });
    }
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        let is_webm = bytes.windows(4).any(|window| window == b"webm");
        return Some(if is_webm { "video/webm" } else { "video/x-matroska" });
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") {
        return match &bytes[8..12] {
            b"AVI " => Some("video/x-msvideo"),
            b"WAVE" => Some("audio/wav"),
            b"WEBP" => Some("image/webp"),
            _ => None,
        };
    }
    if bytes.len() > TS_PACKET_LEN && bytes[0] == 0x47 && bytes[TS_PACKET_LEN] == 0x47 {
        return Some("video/mp2t");
    }

    SIGNATURES
        .iter()
        .find(|(signature, _)| bytes.starts_with(signature))
        .map(|(_, mime)| *mime)
}

fn guess_from_name(path: &Path, head: &[u8]) -> String {
    let guess = mime_guess::from_path(path).first();
    if looks_like_text(head) {
        return guess
            .filter(|guess| {
                let kind = guess.type_();
                kind != mime::VIDEO && kind != mime::AUDIO && kind != mime::IMAGE
            })
            .map_or_else(
                || mime::TEXT_PLAIN.essence_str().to_string(),
                |guess| guess.essence_str().to_string(),
            );
    }
    guess.map_or_else(
        || FALLBACK_MIME.to_string(),
        |guess| guess.essence_str().to_string(),
    )
}

fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        // A multi-byte character cut off by the read window is still text.
        Err(err) => err.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;

    fn mp4_header() -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x20];
        bytes.extend_from_slice(b"ftypisom");
        bytes.extend_from_slice(&[0; 20]);
        bytes
    }

    #[test]
    fn recognises_video_containers() {
        assert_eq!(sniff_bytes(&mp4_header()), Some("video/mp4"));

        let mut quicktime = vec![0, 0, 0, 0x14];
        quicktime.extend_from_slice(b"ftypqt  ");
        assert_eq!(sniff_bytes(&quicktime), Some("video/quicktime"));

        let mut webm = vec![0x1A, 0x45, 0xDF, 0xA3, 0x9F, 0x42, 0x82, 0x84];
        webm.extend_from_slice(b"webm");
        assert_eq!(sniff_bytes(&webm), Some("video/webm"));

        let mkv = [0x1A, 0x45, 0xDF, 0xA3, 0x9F, 0x42, 0x82, 0x88];
        assert_eq!(sniff_bytes(&mkv), Some("video/x-matroska"));

        let mut avi = b"RIFF".to_vec();
        avi.extend_from_slice(&[0, 0, 0, 0]);
        avi.extend_from_slice(b"AVI LIST");
        assert_eq!(sniff_bytes(&avi), Some("video/x-msvideo"));

        let mut ts = vec![0u8; TS_PACKET_LEN * 2];
        ts[0] = 0x47;
        ts[TS_PACKET_LEN] = 0x47;
        assert_eq!(sniff_bytes(&ts), Some("video/mp2t"));
    }

    #[test]
    fn recognises_common_documents() {
        assert_eq!(sniff_bytes(b"%PDF-1.7\n"), Some("application/pdf"));
        assert_eq!(sniff_bytes(b"\x89PNG\r\n\x1a\n...."), Some("image/png"));
        assert_eq!(sniff_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_bytes(b"PK\x03\x04rest"), Some("application/zip"));
        assert_eq!(sniff_bytes(b"plain words"), None);
    }

    #[test]
    fn content_wins_over_file_name() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let disguised = temp.path().join("notes.txt");
        fs::write(&disguised, mp4_header())?;
        assert_eq!(sniff_mime(&disguised)?, "video/mp4");

        let fake_video = temp.path().join("movie.mp4");
        fs::write(&fake_video, b"this is not a video")?;
        assert_eq!(sniff_mime(&fake_video)?, "text/plain");
        Ok(())
    }

    #[test]
    fn unknown_binary_falls_back_to_name_or_octet_stream() -> Result<(), Box<dyn Error>> {
        let temp = tempfile::tempdir()?;
        let blob = temp.path().join("blob");
        fs::write(&blob, [0u8, 1, 2, 3, 0xFE])?;
        assert_eq!(sniff_mime(&blob)?, FALLBACK_MIME);

        let css = temp.path().join("style.css");
        fs::write(&css, b"body { color: red; }")?;
        assert_eq!(sniff_mime(&css)?, "text/css");
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = sniff_mime(Path::new("/definitely/missing/file.bin"));
        assert!(matches!(err, Err(FsOpsError::Io { operation: "sniff.open", .. })));
    }
}

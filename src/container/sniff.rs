//! Best-effort container detection from the first 16 bytes of a file.
//!
//! Only the RIFF/WAVE markers are checked; this is not a validator.
//! Anything readable that is not a WAV is assumed to be raw PCM.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 16;

/// What a selected source file looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClassification {
    /// The file could not be opened or read.
    Unreadable,
    /// `"RIFF"` at offset 0 and `"WAVE"` at offset 8.
    WavContainer,
    /// Headerless sample data (the fallback).
    RawPcm,
}

impl SourceClassification {
    pub fn label(&self) -> &'static str {
        match self {
            SourceClassification::Unreadable => "unreadable",
            SourceClassification::WavContainer => "WAV container",
            SourceClassification::RawPcm => "raw PCM",
        }
    }
}

/// Classify an in-memory prefix.  Never returns `Unreadable`.
///
/// ```
/// use pcm_convert::container::{classify, SourceClassification};
///
/// assert_eq!(classify(b"RIFF\0\0\0\0WAVEfmt "), SourceClassification::WavContainer);
/// assert_eq!(classify(b"RIFF"), SourceClassification::RawPcm);
/// assert_eq!(classify(&[]), SourceClassification::RawPcm);
/// ```
pub fn classify(bytes: &[u8]) -> SourceClassification {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    if head.get(0..4) == Some(b"RIFF".as_slice()) && head.get(8..12) == Some(b"WAVE".as_slice()) {
        SourceClassification::WavContainer
    } else {
        SourceClassification::RawPcm
    }
}

/// Read at most [`SNIFF_LEN`] bytes from `reader` and classify them.
/// A read error yields `Unreadable`.
pub fn classify_reader<R: Read>(reader: R) -> SourceClassification {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    match reader.take(SNIFF_LEN as u64).read_to_end(&mut head) {
        Ok(_) => classify(&head),
        Err(e) => {
            log::warn!("sniff: read failed: {e}");
            SourceClassification::Unreadable
        }
    }
}

/// Open `path` and classify it.
pub fn classify_path(path: &Path) -> SourceClassification {
    match File::open(path) {
        Ok(file) => classify_reader(file),
        Err(e) => {
            log::warn!("sniff: cannot open {}: {e}", path.display());
            SourceClassification::Unreadable
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn wav_markers_with_any_size_field() {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(&[7; 100]);
        assert_eq!(classify(&bytes), SourceClassification::WavContainer);
    }

    #[test]
    fn wave_marker_at_wrong_offset_is_raw() {
        assert_eq!(classify(b"RIFFWAVE\0\0\0\0\0\0\0\0"), SourceClassification::RawPcm);
    }

    #[test]
    fn short_prefix_is_raw() {
        assert_eq!(classify(b"RIFF\0\0\0\0WAV"), SourceClassification::RawPcm);
    }

    #[test]
    fn random_bytes_are_raw() {
        let bytes: Vec<u8> = (0..64u8).map(|i| i.wrapping_mul(37)).collect();
        assert_eq!(classify(&bytes), SourceClassification::RawPcm);
    }

    #[test]
    fn read_error_is_unreadable() {
        assert_eq!(classify_reader(FailingReader), SourceClassification::Unreadable);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nope.pcm");
        assert_eq!(classify_path(&path), SourceClassification::Unreadable);
    }

    #[test]
    fn files_on_disk() {
        let dir = tempdir().expect("temp dir");
        let wav = dir.path().join("a.wav");
        std::fs::write(&wav, b"RIFF\x24\0\0\0WAVEfmt \x10\0\0\0").unwrap();
        let empty = dir.path().join("empty.pcm");
        std::fs::write(&empty, b"").unwrap();

        assert_eq!(classify_path(&wav), SourceClassification::WavContainer);
        assert_eq!(classify_path(&empty), SourceClassification::RawPcm);
    }
}

//! Container handling: telling WAV files from raw PCM and writing WAV headers.
//!
//! ```text
//! source file ──classify_path──▶ SourceClassification
//!                                  ├─ WavContainer ──read_wav──▶ WavSource { format, data range }
//!                                  ├─ RawPcm        (whole file is payload)
//!                                  └─ Unreadable
//!
//! converted payload ──build_header──▶ [u8; 44] ++ payload   (ContainerKind::Wav)
//! ```

pub mod sniff;
pub mod wav;

pub use sniff::{classify, classify_path, classify_reader, SourceClassification};
pub use wav::{build_header, header_payload_len, read_wav, WavError, WavSource, WAV_HEADER_LEN};

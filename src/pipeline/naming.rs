//! Output file naming: `<stem>_<yyyy_MM_dd_HH-mm-ss>.<ext>`.
//!
//! The stem is the source file name up to its first dot, so
//! `speech.take2.pcm` becomes `speech_2024_03_05_14-07-09.wav`.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "_%Y_%m_%d_%H-%M-%S";

/// Source file name up to the first `.`.
pub fn source_stem(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy())
        .and_then(|n| n.split('.').next().map(str::to_owned))
        .unwrap_or_default()
}

/// File name for a conversion of `source` finished at `at`.
pub fn output_file_name(source: &Path, extension: &str, at: &NaiveDateTime) -> String {
    format!(
        "{}{}.{}",
        source_stem(source),
        at.format(TIMESTAMP_FORMAT),
        extension
    )
}

/// Full output path inside `dir`.
pub fn output_path(dir: &Path, source: &Path, extension: &str, at: &NaiveDateTime) -> PathBuf {
    dir.join(output_file_name(source, extension, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap()
    }

    #[test]
    fn stem_stops_at_first_dot() {
        assert_eq!(source_stem(Path::new("/a/b/speech.take2.pcm")), "speech");
        assert_eq!(source_stem(Path::new("noext")), "noext");
        assert_eq!(source_stem(Path::new(".hidden")), "");
    }

    #[test]
    fn name_uses_24_hour_timestamp() {
        let name = output_file_name(Path::new("in/voice.raw"), "wav", &at());
        assert_eq!(name, "voice_2024_03_05_14-07-09.wav");
    }

    #[test]
    fn path_joins_directory() {
        let p = output_path(Path::new("/out"), Path::new("x.y.z"), "pcm", &at());
        assert_eq!(p, PathBuf::from("/out/x_2024_03_05_14-07-09.pcm"));
    }
}

//! Record file persistence
//!
//! One CSV file per session, named from the local wall clock at second
//! resolution. The header records when the session started and the
//! negotiated sampling interval; everything after the column header is
//! appended exactly as it arrived off the wire. The device emits
//! well-formed CSV lines, so no reformatting happens on this side.

use crate::error::Result;
use crate::session::SamplingInterval;
use chrono::{DateTime, Datelike, Local, Timelike};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "Temperature_Dataset_";
const FILE_EXT: &str = "csv";
const COLLISION_SUFFIX: &str = "_V2";

const COLUMN_HEADER: &str =
    "Time (H:M:S),Delta Time(Sec),Sensor1 (Cel),Sensor2 (Cel),Sensor3 (Cel),Sensor4 (Cel)\n";

/// Append-only record file for one logging session
pub struct RecordSink {
    file: File,
    path: PathBuf,
}

impl RecordSink {
    /// Create the session's record file and write its header
    ///
    /// The base name derives from `now` at second resolution. If that
    /// exact file already exists (a second run within the same clock
    /// second), a fixed suffix disambiguates rather than overwriting.
    pub fn create(dir: &Path, interval: SamplingInterval, now: DateTime<Local>) -> Result<Self> {
        let datetime = format_datetime(now);

        let mut stem = format!("{}{}", FILE_PREFIX, datetime);
        if dir.join(format!("{}.{}", stem, FILE_EXT)).exists() {
            stem.push_str(COLLISION_SUFFIX);
        }
        let path = dir.join(format!("{}.{}", stem, FILE_EXT));

        let mut file = File::create(&path)?;
        write!(
            file,
            "Date & Time:,{}\nSecond per Sample:,{}\n\n",
            datetime,
            interval.as_secs()
        )?;
        file.write_all(COLUMN_HEADER.as_bytes())?;

        log::info!("Recording to {}", path.display());
        Ok(RecordSink { file, path })
    }

    /// Path of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one ingested chunk verbatim
    pub fn append(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk)?;
        Ok(())
    }

    /// Flush and close the file
    pub fn close(mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}

/// Format a timestamp the way it appears in file names and the header:
/// unpadded numeric components, `Y-m-d_H.M.S`
fn format_datetime(ts: DateTime<Local>) -> String {
    format!(
        "{}-{}-{}_{}.{}.{}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    )
}

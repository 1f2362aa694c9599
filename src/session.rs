// Session logging: saved frames, the CSV table, and the table viewer

use crate::error::{NeuroSphereError, Result};
use crate::models::{Emotion, Frame, LogRecord};
use chrono::{DateTime, Local};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the persisted table lives
pub const TABLE_PATH: &str = "face_emotions.csv";
/// Where saved frames are written
pub const SAVE_DIR: &str = "saved_faces";

const CSV_HEADERS: [&str; 3] = ["Timestamp", "Emotion", "File Path"];

/// Accumulates log records for one detection session.
///
/// Created when a session starts and consumed by `finalize`, which flushes
/// the records to the CSV table. Sessions do not merge: finalization
/// overwrites whatever table a previous session left behind.
pub struct SessionLog {
    records: Vec<LogRecord>,
    save_dir: PathBuf,
    table_path: PathBuf,
}

impl SessionLog {
    /// Creates a session log using the application's fixed paths
    pub fn new() -> Self {
        Self::with_paths(SAVE_DIR, TABLE_PATH)
    }

    /// Creates a session log rooted at explicit paths
    pub fn with_paths<P: AsRef<Path>, Q: AsRef<Path>>(save_dir: P, table_path: Q) -> Self {
        Self {
            records: Vec::new(),
            save_dir: save_dir.as_ref().to_path_buf(),
            table_path: table_path.as_ref().to_path_buf(),
        }
    }

    /// Records accumulated so far
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Persists the frame as a JPEG and appends a matching log record.
    ///
    /// Returns the path of the written file.
    pub fn save_frame(&mut self, frame: &Frame, emotion: Emotion) -> Result<PathBuf> {
        self.save_frame_at(frame, emotion, Local::now())
    }

    fn save_frame_at(
        &mut self,
        frame: &Frame,
        emotion: Emotion,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.save_dir)?;

        // Second-resolution name: two saves within the same second reuse the
        // filename and the later one overwrites the earlier.
        let filename = format!("face_{}.jpg", now.format("%Y%m%d_%H%M%S"));
        let path = self.save_dir.join(filename);

        let img: RgbImage =
            RgbImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or_else(
                || {
                    NeuroSphereError::FrameProcessing(format!(
                        "Frame buffer does not match {}x{}",
                        frame.width, frame.height
                    ))
                },
            )?;
        img.save(&path)?;

        self.records.push(LogRecord {
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            emotion: emotion.as_str().to_string(),
            path: path.to_string_lossy().into_owned(),
        });
        info!("Image saved and data logged: {}", path.display());

        Ok(path)
    }

    /// Flushes the session's records to the CSV table, overwriting any
    /// previous table at that path. A session with zero saves still writes
    /// the header row.
    pub fn finalize(self) -> Result<PathBuf> {
        let mut writer = csv::Writer::from_path(&self.table_path)?;
        if self.records.is_empty() {
            // serialize() only emits headers alongside a record
            writer.write_record(CSV_HEADERS)?;
        } else {
            for record in &self.records {
                writer.serialize(record)?;
            }
        }
        writer.flush()?;
        info!(
            "Session finalized, {} record(s) written to {}",
            self.records.len(),
            self.table_path.display()
        );
        Ok(self.table_path)
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// What the table viewer found on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableState {
    /// No table exists yet
    NoData,
    /// The table exists but is zero-length
    Empty,
    /// The table parsed; may hold zero rows (header-only)
    Rows(Vec<LogRecord>),
    /// The table exists but could not be parsed
    Unreadable(String),
}

/// Reads the persisted table into one of four distinct states.
///
/// Never fails: a malformed table becomes `Unreadable` rather than an error.
pub fn read_table<P: AsRef<Path>>(path: P) -> TableState {
    let path = path.as_ref();
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return TableState::NoData,
    };
    if metadata.len() == 0 {
        return TableState::Empty;
    }

    let mut reader = match csv::Reader::from_path(path) {
        Ok(r) => r,
        Err(e) => return TableState::Unreadable(e.to_string()),
    };

    let mut rows = Vec::new();
    for result in reader.deserialize::<LogRecord>() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => return TableState::Unreadable(e.to_string()),
        }
    }
    TableState::Rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn gray_frame() -> Frame {
        Frame::new(vec![128; 8 * 8 * 3], 8, 8)
    }

    fn stamp(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn save_writes_one_file_and_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::with_paths(dir.path().join("faces"), dir.path().join("log.csv"));

        let path = log
            .save_frame_at(&gray_frame(), Emotion::Happy, stamp(12, 0, 0))
            .unwrap();

        assert!(path.exists());
        assert_eq!(log.records().len(), 1);
        let record = &log.records()[0];
        assert_eq!(record.path, path.to_string_lossy());
        assert_eq!(record.emotion, "happy");
        assert_eq!(record.timestamp, "2024-05-01 12:00:00");
    }

    #[test]
    fn distinct_timestamps_produce_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::with_paths(dir.path().join("faces"), dir.path().join("log.csv"));

        let first = log
            .save_frame_at(&gray_frame(), Emotion::Happy, stamp(12, 0, 0))
            .unwrap();
        let second = log
            .save_frame_at(&gray_frame(), Emotion::Sad, stamp(12, 0, 1))
            .unwrap();

        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
        assert_eq!(log.records().len(), 2);
    }

    #[test]
    fn finalize_with_zero_saves_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("log.csv");
        let log = SessionLog::with_paths(dir.path().join("faces"), &table);

        log.finalize().unwrap();

        let contents = fs::read_to_string(&table).unwrap();
        assert_eq!(contents, "Timestamp,Emotion,File Path\n");
        assert_eq!(read_table(&table), TableState::Rows(Vec::new()));
    }

    #[test]
    fn finalize_round_trips_through_the_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("log.csv");
        let mut log = SessionLog::with_paths(dir.path().join("faces"), &table);

        log.save_frame_at(&gray_frame(), Emotion::Surprised, stamp(9, 30, 0))
            .unwrap();
        log.save_frame_at(&gray_frame(), Emotion::Unknown, stamp(9, 30, 5))
            .unwrap();
        let expected = log.records().to_vec();

        log.finalize().unwrap();

        assert_eq!(read_table(&table), TableState::Rows(expected));
    }

    #[test]
    fn finalize_overwrites_a_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("log.csv");

        let mut first = SessionLog::with_paths(dir.path().join("faces"), &table);
        first
            .save_frame_at(&gray_frame(), Emotion::Angry, stamp(8, 0, 0))
            .unwrap();
        first.finalize().unwrap();

        let second = SessionLog::with_paths(dir.path().join("faces"), &table);
        second.finalize().unwrap();

        // The second session had no saves, so the earlier rows are gone
        assert_eq!(read_table(&table), TableState::Rows(Vec::new()));
    }

    #[test]
    fn viewer_reports_missing_table_as_no_data() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_table(dir.path().join("absent.csv")), TableState::NoData);
    }

    #[test]
    fn viewer_reports_zero_length_table_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("log.csv");
        fs::write(&table, "").unwrap();
        assert_eq!(read_table(&table), TableState::Empty);
    }

    #[test]
    fn viewer_reports_malformed_table_as_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("log.csv");
        fs::write(&table, "Timestamp,Emotion,File Path\njustonefield\n").unwrap();

        match read_table(&table) {
            TableState::Unreadable(_) => {}
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }
}

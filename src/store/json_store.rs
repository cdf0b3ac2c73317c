use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::session::result::LessonSummary;
use crate::store::schema::{LessonHistoryData, ProgressRecord};

const PROGRESS_FILE: &str = "progress.json";
const HISTORY_FILE: &str = "lesson_history.json";
const HISTORY_LIMIT: usize = 500;

/// Progress persistence under fixed keys in the data directory.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lusodrill");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(file = %path.display(), error = %e, "unreadable store file, using defaults");
                T::default()
            }),
            Err(_) => T::default(),
        }
    }

    /// Write through a temp file and rename, so a crash never leaves a
    /// half-written record.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Load the progress record. Returns None if the file exists but cannot
    /// be parsed.
    pub fn load_progress(&self) -> Option<ProgressRecord> {
        let path = self.file_path(PROGRESS_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path).ok()?;
            serde_json::from_str(&content).ok()
        } else {
            Some(ProgressRecord::default())
        }
    }

    pub fn save_progress(&self, record: &ProgressRecord) -> Result<()> {
        self.save(PROGRESS_FILE, record)
    }

    pub fn load_history(&self) -> LessonHistoryData {
        self.load(HISTORY_FILE)
    }

    /// Append a finished lesson, keeping the newest `HISTORY_LIMIT` entries.
    pub fn append_history(&self, summary: &LessonSummary) -> Result<()> {
        let mut history = self.load_history();
        history.lessons.push(summary.clone());
        if history.lessons.len() > HISTORY_LIMIT {
            let excess = history.lessons.len() - HISTORY_LIMIT;
            history.lessons.drain(..excess);
        }
        self.save(HISTORY_FILE, &history)
    }

    pub fn reset(&self) -> Result<()> {
        for name in [PROGRESS_FILE, HISTORY_FILE] {
            let path = self.file_path(name);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_progress_is_fresh_default() {
        let (_dir, store) = make_test_store();
        let record = store.load_progress().unwrap();
        assert!(record.completed_lessons.is_empty());
        assert_eq!(record.streak, 0);
    }

    #[test]
    fn progress_round_trips() {
        let (_dir, store) = make_test_store();
        let mut record = ProgressRecord::default();
        record.completed_lessons.push("1".to_string());
        record.streak = 3;
        store.save_progress(&record).unwrap();

        let loaded = store.load_progress().unwrap();
        assert_eq!(loaded.completed_lessons, vec!["1".to_string()]);
        assert_eq!(loaded.streak, 3);
        assert!(!store.file_path("progress.tmp").exists());
    }

    #[test]
    fn corrupt_progress_is_none() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), "{not json").unwrap();
        assert!(store.load_progress().is_none());
    }

    #[test]
    fn history_is_capped() {
        let (_dir, store) = make_test_store();
        let mut history = LessonHistoryData::default();
        for i in 0..HISTORY_LIMIT {
            history
                .lessons
                .push(LessonSummary::from_outcomes(&i.to_string(), Vec::new()));
        }
        store.save(HISTORY_FILE, &history).unwrap();

        store
            .append_history(&LessonSummary::from_outcomes("newest", Vec::new()))
            .unwrap();
        let loaded = store.load_history();
        assert_eq!(loaded.lessons.len(), HISTORY_LIMIT);
        assert_eq!(loaded.lessons[0].lesson_id, "1");
        assert_eq!(loaded.lessons.last().unwrap().lesson_id, "newest");
    }

    #[test]
    fn reset_removes_files() {
        let (_dir, store) = make_test_store();
        store.save_progress(&ProgressRecord::default()).unwrap();
        store
            .append_history(&LessonSummary::from_outcomes("1", Vec::new()))
            .unwrap();
        store.reset().unwrap();
        assert!(!store.file_path(PROGRESS_FILE).exists());
        assert!(store.load_history().lessons.is_empty());
    }
}

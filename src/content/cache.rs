use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::lesson::Lesson;
use crate::lesson::curriculum::CurriculumEntry;

/// Generated lessons kept on disk, one file per curriculum id.
pub struct LessonCache {
    base_dir: PathBuf,
}

impl LessonCache {
    pub fn new() -> Option<Self> {
        Self::with_base_dir(dirs::data_dir()?.join("lusodrill").join("lessons"))
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Option<Self> {
        fs::create_dir_all(&base_dir).ok()?;
        Some(Self { base_dir })
    }

    fn lesson_path(&self, lesson_id: &str) -> PathBuf {
        let id: String = lesson_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.base_dir.join(format!("lesson-{id}.json"))
    }

    /// The cached lesson for `entry`. A corrupt file counts as a miss.
    pub fn get_lesson(&self, entry: &CurriculumEntry) -> Option<Lesson> {
        let path = self.lesson_path(entry.id);
        let json = fs::read_to_string(&path).ok()?;
        match Lesson::from_json(&json) {
            Ok(lesson) => Some(lesson),
            Err(e) => {
                warn!(lesson = entry.id, file = %path.display(), error = %e, "discarding cached lesson");
                None
            }
        }
    }

    pub fn put_lesson(&self, lesson: &Lesson) -> Result<()> {
        let path = self.lesson_path(&lesson.id);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(lesson)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::lesson::curriculum;
    use crate::lesson::fixtures::greeting_lesson;

    #[test]
    fn ids_cannot_escape_cache_dir() {
        let dir = TempDir::new().unwrap();
        let cache = LessonCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            cache.lesson_path("../2"),
            dir.path().join("lesson-___2.json")
        );
    }

    #[test]
    fn stored_lesson_is_found_by_curriculum_entry() {
        let dir = TempDir::new().unwrap();
        let cache = LessonCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        let entry = curriculum::find("2").unwrap();
        assert!(cache.get_lesson(entry).is_none());

        let mut lesson = greeting_lesson();
        lesson.id = "2".to_string();
        cache.put_lesson(&lesson).unwrap();
        assert_eq!(cache.get_lesson(entry), Some(lesson));
        assert!(!dir.path().join("lesson-2.tmp").exists());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = LessonCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("lesson-3.json"), "{ not a lesson").unwrap();
        assert!(cache.get_lesson(curriculum::find("3").unwrap()).is_none());
    }
}

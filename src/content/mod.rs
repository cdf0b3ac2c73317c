pub mod cache;
pub mod gemini;

use thiserror::Error;
use tracing::{info, warn};

use crate::content::cache::LessonCache;
use crate::error::DrillError;
use crate::lesson::Lesson;
use crate::lesson::bundled::BundledLessons;
use crate::lesson::curriculum::CurriculumEntry;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("no API key found in ${0}")]
    MissingApiKey(String),
    #[error("lesson request failed: {0}")]
    Network(String),
    #[error("lesson service returned status {0}")]
    HttpStatus(u16),
    #[error("lesson service returned an empty response")]
    EmptyResponse,
    #[error(transparent)]
    Malformed(#[from] DrillError),
    #[error("no content source available for lesson {0}")]
    Unavailable(String),
}

/// Produces a lesson document for a topic.
pub trait ContentSource {
    fn fetch_lesson(&self, topic: &str) -> Result<Lesson, ContentError>;
}

/// Resolves curriculum entries to lessons: bundled first, then the local
/// cache of generated lessons, then the remote source.
pub struct LessonLoader {
    remote: Option<Box<dyn ContentSource>>,
    cache: Option<LessonCache>,
}

impl LessonLoader {
    pub fn new(remote: Option<Box<dyn ContentSource>>, cache: Option<LessonCache>) -> Self {
        Self { remote, cache }
    }

    /// Load the lesson for `entry`. `refresh` skips the cache and asks the
    /// remote source for a new lesson.
    pub fn load(&self, entry: &CurriculumEntry, refresh: bool) -> Result<Lesson, ContentError> {
        if let Some(bundled) = BundledLessons::get(entry.id) {
            return Ok(bundled?);
        }

        if !refresh
            && let Some(cached) = self.cache.as_ref().and_then(|c| c.get_lesson(entry))
        {
            return Ok(cached);
        }

        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| ContentError::Unavailable(entry.id.to_string()))?;
        let mut lesson = remote.fetch_lesson(&entry.topic())?;
        // progress is keyed by curriculum id, whatever id the generator chose
        lesson.id = entry.id.to_string();
        info!(lesson = entry.id, "lesson generated");

        if let Some(cache) = &self.cache
            && let Err(e) = cache.put_lesson(&lesson)
        {
            warn!(lesson = entry.id, error = %e, "could not cache generated lesson");
        }
        Ok(lesson)
    }
}

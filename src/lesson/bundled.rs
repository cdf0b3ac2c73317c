use rust_embed::Embed;

use crate::error::DrillError;
use crate::lesson::Lesson;

#[derive(Embed)]
#[folder = "assets/lessons/"]
struct LessonAssets;

/// Lessons shipped inside the binary. These never go through a content source.
pub struct BundledLessons;

impl BundledLessons {
    pub fn get(id: &str) -> Option<Result<Lesson, DrillError>> {
        let file = LessonAssets::get(&format!("{id}.json"))?;
        let parsed = match std::str::from_utf8(file.data.as_ref()) {
            Ok(content) => Lesson::from_json(content),
            Err(e) => Err(DrillError::malformed(format!(
                "bundled lesson {id} is not UTF-8: {e}"
            ))),
        };
        Some(parsed)
    }

    pub fn contains(id: &str) -> bool {
        LessonAssets::get(&format!("{id}.json")).is_some()
    }
}

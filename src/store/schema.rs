use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::result::LessonSummary;

pub const SCHEMA_VERSION: u32 = 1;
pub const FIRST_LESSON_ID: &str = "1";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    #[serde(default = "default_current_lesson")]
    pub current_lesson_id: String,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default, alias = "lastLogin")]
    pub last_activity: Option<DateTime<Utc>>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_current_lesson() -> String {
    FIRST_LESSON_ID.to_string()
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            completed_lessons: Vec::new(),
            current_lesson_id: default_current_lesson(),
            streak: 0,
            best_streak: 0,
            last_activity: None,
        }
    }
}

impl ProgressRecord {
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed_lessons.iter().any(|id| id == lesson_id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonHistoryData {
    pub schema_version: u32,
    pub lessons: Vec<LessonSummary>,
}

impl Default for LessonHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            lessons: Vec::new(),
        }
    }
}

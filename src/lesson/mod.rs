pub mod bundled;
pub mod curriculum;

use serde::{Deserialize, Serialize};

use crate::error::DrillError;

/// One lesson document as produced by a content source.
///
/// The JSON shape is camelCase with `pt`/`cn` for vocabulary terms, matching
/// what the generator is prompted to emit. Collections default to empty so that
/// a partially filled document still reaches [`Lesson::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(rename = "chineseTitle")]
    pub native_title: String,
    pub situation: String,
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    pub grammar: GrammarNote,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
    pub challenge: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
    pub translation: String,
}

impl DialogueLine {
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    #[serde(rename = "pt")]
    pub target: String,
    #[serde(rename = "cn")]
    pub native: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarNote {
    pub point: String,
    pub explanation: String,
    pub example: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

impl Lesson {
    /// Parse and validate a lesson document.
    pub fn from_json(json: &str) -> Result<Self, DrillError> {
        let lesson: Lesson = serde_json::from_str(json)
            .map_err(|e| DrillError::malformed(format!("invalid lesson document: {e}")))?;
        lesson.validate()?;
        Ok(lesson)
    }

    pub fn validate(&self) -> Result<(), DrillError> {
        for (i, q) in self.quiz.iter().enumerate() {
            let Some(answer) = q.correct_option() else {
                return Err(DrillError::malformed(format!(
                    "quiz question {i} has correct index {} but only {} options",
                    q.correct_index,
                    q.options.len()
                )));
            };
            if q.options.iter().filter(|o| *o == answer).count() != 1 {
                return Err(DrillError::malformed(format!(
                    "quiz question {i} lists its answer {answer:?} more than once"
                )));
            }
        }
        for (i, line) in self.dialogue.iter().enumerate() {
            if line.tokens().is_empty() {
                return Err(DrillError::malformed(format!(
                    "dialogue line {i} has no text"
                )));
            }
        }
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state correctness of a drill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn from_bool(correct: bool) -> Self {
        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillOutcome {
    pub kind: String,
    pub verdict: Verdict,
}

/// Payload of the lesson-complete signal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LessonSummary {
    pub lesson_id: String,
    pub total_drills: usize,
    pub checked: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub outcomes: Vec<DrillOutcome>,
}

impl LessonSummary {
    pub fn from_outcomes(lesson_id: &str, outcomes: Vec<DrillOutcome>) -> Self {
        let checked = outcomes
            .iter()
            .filter(|o| o.verdict != Verdict::Unknown)
            .count();
        let correct = outcomes
            .iter()
            .filter(|o| o.verdict == Verdict::Correct)
            .count();
        let accuracy = if checked > 0 {
            (correct as f64 / checked as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };
        Self {
            lesson_id: lesson_id.to_string(),
            total_drills: outcomes.len(),
            checked,
            correct,
            accuracy,
            finished_at: Utc::now(),
            outcomes,
        }
    }
}

use chrono::{DateTime, Utc};
use tracing::info;

use crate::lesson::curriculum;
use crate::session::result::LessonSummary;
use crate::store::schema::ProgressRecord;

/// Apply a lesson-complete signal to the progress record.
///
/// A lesson id is recorded once no matter how often it is replayed. The
/// streak counts consecutive calendar days (UTC) with at least one finished
/// lesson.
pub fn record_completion(record: &mut ProgressRecord, summary: &LessonSummary, now: DateTime<Utc>) {
    if !record.is_completed(&summary.lesson_id) {
        record.completed_lessons.push(summary.lesson_id.clone());
    }

    let today = now.date_naive();
    match record.last_activity.map(|t| t.date_naive()) {
        Some(last) if last == today => {
            if record.streak == 0 {
                record.streak = 1;
            }
        }
        Some(last) if today.signed_duration_since(last).num_days() == 1 => {
            record.streak += 1;
        }
        _ => record.streak = 1,
    }
    record.best_streak = record.best_streak.max(record.streak);
    record.last_activity = Some(now);

    if let Some(next) = curriculum::next_after(&summary.lesson_id)
        && !record.is_completed(next.id)
    {
        record.current_lesson_id = next.id.to_string();
    }

    info!(
        lesson = %summary.lesson_id,
        streak = record.streak,
        completed = record.completed_lessons.len(),
        "progress updated"
    );
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn summary(id: &str) -> LessonSummary {
        LessonSummary::from_outcomes(id, Vec::new())
    }

    #[test]
    fn first_completion_starts_streak() {
        let mut record = ProgressRecord::default();
        record_completion(&mut record, &summary("1"), at(10, 9));
        assert_eq!(record.completed_lessons, vec!["1".to_string()]);
        assert_eq!(record.streak, 1);
        assert_eq!(record.best_streak, 1);
        assert_eq!(record.current_lesson_id, "2");
        assert_eq!(record.last_activity, Some(at(10, 9)));
    }

    #[test]
    fn replay_does_not_duplicate_lesson() {
        let mut record = ProgressRecord::default();
        record_completion(&mut record, &summary("1"), at(10, 9));
        record_completion(&mut record, &summary("1"), at(10, 18));
        assert_eq!(record.completed_lessons.len(), 1);
        assert_eq!(record.streak, 1);
    }

    #[test]
    fn consecutive_days_extend_streak() {
        let mut record = ProgressRecord::default();
        record_completion(&mut record, &summary("1"), at(10, 23));
        record_completion(&mut record, &summary("2"), at(11, 1));
        record_completion(&mut record, &summary("3"), at(12, 12));
        assert_eq!(record.streak, 3);
        assert_eq!(record.current_lesson_id, "4");
    }

    #[test]
    fn gap_resets_streak_but_keeps_best() {
        let mut record = ProgressRecord::default();
        record_completion(&mut record, &summary("1"), at(10, 9));
        record_completion(&mut record, &summary("2"), at(11, 9));
        record_completion(&mut record, &summary("3"), at(14, 9));
        assert_eq!(record.streak, 1);
        assert_eq!(record.best_streak, 2);
    }

    #[test]
    fn last_lesson_keeps_current_pointer() {
        let mut record = ProgressRecord::default();
        record.current_lesson_id = "7".to_string();
        record_completion(&mut record, &summary("7"), at(10, 9));
        assert_eq!(record.current_lesson_id, "7");
    }
}

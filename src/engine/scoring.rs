use crate::store::schema::ProgressRecord;

const GEMS_PER_LESSON: u32 = 10;

pub fn gems(record: &ProgressRecord) -> u32 {
    record.completed_lessons.len() as u32 * GEMS_PER_LESSON
}

/// Share of the curriculum completed, 0.0..=1.0.
pub fn path_completion(record: &ProgressRecord, total_lessons: usize) -> f64 {
    if total_lessons == 0 {
        return 0.0;
    }
    (record.completed_lessons.len() as f64 / total_lessons as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gems_scale_with_completed_lessons() {
        let mut record = ProgressRecord::default();
        assert_eq!(gems(&record), 0);
        record.completed_lessons = vec!["1".to_string(), "2".to_string()];
        assert_eq!(gems(&record), 20);
    }

    #[test]
    fn path_completion_is_clamped() {
        let mut record = ProgressRecord::default();
        record.completed_lessons = vec!["1".to_string(); 9];
        assert_eq!(path_completion(&record, 7), 1.0);
        assert_eq!(path_completion(&record, 0), 0.0);
    }
}

//! @acp:module "Recent Exclusion"
//! @acp:summary "Questions a student saw in their most recent sessions"
//! @acp:domain selection
//! @acp:layer service

use std::collections::BTreeSet;

use super::types::{QuestionId, SessionHistory};

/// Union of question ids from the student's last `window` completed sessions.
/// Students with fewer sessions get whatever exists.
pub fn recently_seen(history: &SessionHistory, student_id: &str, window: usize) -> BTreeSet<QuestionId> {
    history
        .for_student(student_id)
        .into_iter()
        .take(window)
        .flat_map(|session| session.answers.iter().map(|a| a.question_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::types::{AnsweredQuestion, CompletedSession, Outcome};
    use chrono::{Duration, TimeZone, Utc};

    fn create_test_history() -> SessionHistory {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let session = |student: &str, day: i64, ids: &[QuestionId]| CompletedSession {
            student_id: student.to_string(),
            completed_at: start + Duration::days(day),
            answers: ids
                .iter()
                .map(|&id| AnsweredQuestion {
                    question_id: id,
                    outcome: Outcome::Incorrect,
                })
                .collect(),
        };

        SessionHistory::new(vec![
            session("amy", 0, &[1, 2]),
            session("amy", 1, &[3]),
            session("ben", 2, &[50]),
            session("amy", 3, &[4, 5]),
            session("amy", 2, &[6]),
        ])
    }

    #[test]
    fn test_takes_most_recent_sessions() {
        let history = create_test_history();

        let seen = recently_seen(&history, "amy", 3);
        assert_eq!(seen, BTreeSet::from([3, 4, 5, 6]));
    }

    #[test]
    fn test_window_larger_than_history() {
        let history = create_test_history();

        let seen = recently_seen(&history, "amy", 10);
        assert_eq!(seen, BTreeSet::from([1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_no_history_is_empty() {
        let history = create_test_history();

        assert!(recently_seen(&history, "cara", 3).is_empty());
        assert!(recently_seen(&history, "amy", 0).is_empty());
    }

    #[test]
    fn test_other_students_do_not_leak() {
        let history = create_test_history();

        let seen = recently_seen(&history, "ben", 3);
        assert_eq!(seen, BTreeSet::from([50]));
    }
}

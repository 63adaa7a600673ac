//! Course validation and quiz grading.

use serde::Serialize;

use crate::error::{BrigadeError, BrigadeResult};
use crate::models::course::{Course, CreateCourse};

/// Result of grading one quiz attempt.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct QuizGrade {
    pub correct: usize,
    pub total: usize,
    pub score_percent: u32,
    pub passed: bool,
}

/// Grade `answers` against every question of the course, in lesson
/// order. `None` and missing trailing answers count as wrong; more
/// answers than questions is rejected.
pub fn grade(course: &Course, answers: &[Option<usize>]) -> BrigadeResult<QuizGrade> {
    let total = course.questions().count();
    if answers.len() > total {
        return Err(BrigadeError::validation(format!(
            "{} answers submitted for {total} questions",
            answers.len()
        )));
    }

    let correct = course
        .questions()
        .zip(answers.iter())
        .filter(|(q, a)| **a == Some(q.correct_option))
        .count();

    let score_percent = if total == 0 {
        100
    } else {
        ((correct * 100 + total / 2) / total) as u32
    };

    Ok(QuizGrade {
        correct,
        total,
        score_percent,
        passed: score_percent >= course.pass_mark_percent,
    })
}

/// Structural checks applied before a course is stored.
pub fn validate_course(input: &CreateCourse) -> BrigadeResult<()> {
    if input.title.trim().is_empty() {
        return Err(BrigadeError::validation("course title must not be empty"));
    }
    if input.lessons.is_empty() {
        return Err(BrigadeError::validation("a course needs at least one lesson"));
    }
    if input.pass_mark_percent > 100 {
        return Err(BrigadeError::validation("pass mark must be between 0 and 100"));
    }
    for (li, lesson) in input.lessons.iter().enumerate() {
        if lesson.title.trim().is_empty() {
            return Err(BrigadeError::validation(format!(
                "lesson {} has an empty title",
                li + 1
            )));
        }
        for (qi, q) in lesson.questions.iter().enumerate() {
            if q.options.len() < 2 {
                return Err(BrigadeError::validation(format!(
                    "lesson {} question {} needs at least two options",
                    li + 1,
                    qi + 1
                )));
            }
            if q.correct_option >= q.options.len() {
                return Err(BrigadeError::validation(format!(
                    "lesson {} question {} marks a nonexistent option as correct",
                    li + 1,
                    qi + 1
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::{Lesson, QuizQuestion};
    use chrono::Utc;
    use uuid::Uuid;

    fn question(correct: usize) -> QuizQuestion {
        QuizQuestion {
            prompt: "Which fork is for salad?".into(),
            options: vec!["outer".into(), "inner".into(), "dessert".into()],
            correct_option: correct,
        }
    }

    fn course(questions_per_lesson: &[usize], pass_mark: u32) -> Course {
        Course {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            channel_id: Uuid::new_v4(),
            title: "Table Setting".into(),
            description: String::new(),
            lessons: questions_per_lesson
                .iter()
                .map(|&n| Lesson {
                    title: "Lesson".into(),
                    video_url: None,
                    questions: (0..n).map(|i| question(i % 3)).collect(),
                })
                .collect(),
            pass_mark_percent: pass_mark,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn all_correct_passes() {
        let c = course(&[2, 1], 80);
        let g = grade(&c, &[Some(0), Some(1), Some(0)]).unwrap();
        assert_eq!(g.correct, 3);
        assert_eq!(g.score_percent, 100);
        assert!(g.passed);
    }

    #[test]
    fn missing_answers_count_as_wrong() {
        let c = course(&[3], 50);
        let g = grade(&c, &[Some(0), None]).unwrap();
        assert_eq!(g.correct, 1);
        assert_eq!(g.total, 3);
        assert_eq!(g.score_percent, 33);
        assert!(!g.passed);
    }

    #[test]
    fn score_rounds_to_nearest() {
        let c = course(&[3], 67);
        let g = grade(&c, &[Some(0), Some(1), None]).unwrap();
        assert_eq!(g.score_percent, 67);
        assert!(g.passed);
    }

    #[test]
    fn too_many_answers_is_rejected() {
        let c = course(&[1], 50);
        assert!(grade(&c, &[Some(0), Some(0)]).is_err());
    }

    #[test]
    fn course_without_questions_passes() {
        let c = course(&[0], 100);
        let g = grade(&c, &[]).unwrap();
        assert_eq!(g.score_percent, 100);
        assert!(g.passed);
    }

    fn create(lessons: Vec<Lesson>) -> CreateCourse {
        CreateCourse {
            organization_id: Uuid::new_v4(),
            channel_id: Uuid::new_v4(),
            title: "Wine Service".into(),
            description: String::new(),
            lessons,
            pass_mark_percent: 80,
        }
    }

    #[test]
    fn validate_rejects_bad_questions() {
        let mut q = question(0);
        q.options.truncate(1);
        let lesson = Lesson {
            title: "Decanting".into(),
            video_url: None,
            questions: vec![q],
        };
        assert!(validate_course(&create(vec![lesson])).is_err());

        let lesson = Lesson {
            title: "Decanting".into(),
            video_url: None,
            questions: vec![question(5)],
        };
        assert!(validate_course(&create(vec![lesson])).is_err());
    }

    #[test]
    fn validate_requires_lessons() {
        assert!(validate_course(&create(vec![])).is_err());
        let ok = Lesson {
            title: "Opening a bottle".into(),
            video_url: Some("https://videos.example/open.mp4".into()),
            questions: vec![question(2)],
        };
        assert!(validate_course(&create(vec![ok])).is_ok());
    }
}

//! Training course domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_option: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lesson {
    pub title: String,
    pub video_url: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub channel_id: Uuid,
    pub title: String,
    pub description: String,
    pub lessons: Vec<Lesson>,
    /// Minimum score (0-100) counted as a pass.
    pub pass_mark_percent: u32,
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// All quiz questions in lesson order.
    pub fn questions(&self) -> impl Iterator<Item = &QuizQuestion> {
        self.lessons.iter().flat_map(|l| l.questions.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourse {
    pub organization_id: Uuid,
    pub channel_id: Uuid,
    pub title: String,
    pub description: String,
    pub lessons: Vec<Lesson>,
    pub pass_mark_percent: u32,
}

/// A graded quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseCompletion {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub score_percent: u32,
    pub passed: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseCompletion {
    pub organization_id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub score_percent: u32,
    pub passed: bool,
}

//! SurrealDB implementation of [`CourseRepository`].
//!
//! Lessons and their quiz questions are stored as one FLEXIBLE
//! `content` object (`{ "lessons": [...] }`) on the course record.

use brigade_core::error::BrigadeResult;
use brigade_core::models::course::{
    Course, CourseCompletion, CreateCourse, CreateCourseCompletion, Lesson,
};
use brigade_core::repository::CourseRepository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const SELECT_COURSE: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('course', $id) WHERE organization_id = $organization_id";

#[derive(Debug, Serialize, Deserialize)]
struct CourseContent {
    lessons: Vec<Lesson>,
}

#[derive(Debug, SurrealValue)]
struct CourseRow {
    record_id: String,
    organization_id: String,
    channel_id: String,
    title: String,
    description: String,
    content: serde_json::Value,
    pass_mark_percent: u32,
    created_at: DateTime<Utc>,
}

impl CourseRow {
    fn try_into_course(self) -> Result<Course, DbError> {
        let content: CourseContent = serde_json::from_value(self.content)
            .map_err(|e| DbError::Decode(format!("course content: {e}")))?;
        Ok(Course {
            id: parse_uuid("course", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            channel_id: parse_uuid("channel", &self.channel_id)?,
            title: self.title,
            description: self.description,
            lessons: content.lessons,
            pass_mark_percent: self.pass_mark_percent,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CompletionRow {
    record_id: String,
    organization_id: String,
    course_id: String,
    user_id: String,
    score_percent: u32,
    passed: bool,
    completed_at: DateTime<Utc>,
}

impl CompletionRow {
    fn try_into_completion(self) -> Result<CourseCompletion, DbError> {
        Ok(CourseCompletion {
            id: parse_uuid("course completion", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            course_id: parse_uuid("course", &self.course_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            score_percent: self.score_percent,
            passed: self.passed,
            completed_at: self.completed_at,
        })
    }
}

fn collect_courses(rows: Vec<CourseRow>) -> Result<Vec<Course>, DbError> {
    rows.into_iter().map(CourseRow::try_into_course).collect()
}

/// SurrealDB implementation of the Course repository.
#[derive(Clone)]
pub struct SurrealCourseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCourseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CourseRepository for SurrealCourseRepository<C> {
    async fn create(&self, input: CreateCourse) -> BrigadeResult<Course> {
        let id = Uuid::new_v4();
        let content = serde_json::to_value(CourseContent {
            lessons: input.lessons,
        })
        .map_err(|e| DbError::Decode(format!("course content: {e}")))?;

        let query = format!(
            "CREATE type::record('course', $id) SET \
             organization_id = $organization_id, channel_id = $channel_id, \
             title = $title, description = $description, content = $content, \
             pass_mark_percent = $pass_mark_percent; {SELECT_COURSE};"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("channel_id", input.channel_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("content", content))
            .bind(("pass_mark_percent", input.pass_mark_percent))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("course", e))?;

        let rows: Vec<CourseRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("course", id))?;
        Ok(row.try_into_course()?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> BrigadeResult<Course> {
        let mut result = self
            .db
            .query(SELECT_COURSE)
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CourseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("course", id))?;
        Ok(row.try_into_course()?)
    }

    async fn list_by_channel(
        &self,
        organization_id: Uuid,
        channel_id: Uuid,
    ) -> BrigadeResult<Vec<Course>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM course \
                 WHERE organization_id = $organization_id AND channel_id = $channel_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("channel_id", channel_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CourseRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect_courses(rows)?)
    }

    async fn list(&self, organization_id: Uuid) -> BrigadeResult<Vec<Course>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM course \
                 WHERE organization_id = $organization_id ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CourseRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect_courses(rows)?)
    }

    async fn record_completion(
        &self,
        input: CreateCourseCompletion,
    ) -> BrigadeResult<CourseCompletion> {
        let id = Uuid::new_v4();

        let mut result = self
            .db
            .query(
                "CREATE type::record('course_completion', $id) SET \
                 organization_id = $organization_id, course_id = $course_id, \
                 user_id = $user_id, score_percent = $score_percent, passed = $passed; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('course_completion', $id);",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("course_id", input.course_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("score_percent", input.score_percent))
            .bind(("passed", input.passed))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("course_completion", e))?;

        let rows: Vec<CompletionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("course_completion", id))?;

        info!(
            course_id = %input.course_id,
            user_id = %input.user_id,
            score = input.score_percent,
            passed = input.passed,
            "Course attempt recorded"
        );
        Ok(row.try_into_completion()?)
    }

    async fn list_completions(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> BrigadeResult<Vec<CourseCompletion>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM course_completion \
                 WHERE organization_id = $organization_id AND user_id = $user_id \
                 ORDER BY completed_at DESC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CompletionRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(CompletionRow::try_into_completion)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}

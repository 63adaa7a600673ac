//! Training service: channels, subscriptions, courses and quiz attempts.

use brigade_core::context::AppContext;
use brigade_core::error::{BrigadeError, BrigadeResult};
use brigade_core::models::{
    channel::{Channel, CreateChannel, Subscription},
    course::{Course, CourseCompletion, CreateCourse, CreateCourseCompletion, Lesson},
};
use brigade_core::repository::{ChannelRepository, CourseRepository};
use brigade_core::training::{QuizGrade, grade, validate_course};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

fn default_pass_mark() -> u32 {
    80
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChannel {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub channel_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub lessons: Vec<Lesson>,
    #[serde(default = "default_pass_mark")]
    pub pass_mark_percent: u32,
}

/// A graded quiz attempt and the completion recorded for it.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub grade: QuizGrade,
    pub completion: CourseCompletion,
}

pub struct TrainingService<C: ChannelRepository, K: CourseRepository> {
    channels: C,
    courses: K,
}

impl<C: ChannelRepository, K: CourseRepository> TrainingService<C, K> {
    pub fn new(channels: C, courses: K) -> Self {
        Self { channels, courses }
    }

    pub async fn create_channel(
        &self,
        ctx: &AppContext,
        input: NewChannel,
    ) -> BrigadeResult<Channel> {
        ctx.require_admin()?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            warn!(organization_id = %ctx.organization_id, "Channel rejected: empty name");
            return Err(BrigadeError::validation("channel name must not be empty"));
        }

        let channel = self
            .channels
            .create(CreateChannel {
                organization_id: ctx.organization_id,
                name,
                description: input.description.trim().to_string(),
            })
            .await?;
        info!(organization_id = %ctx.organization_id, channel_id = %channel.id, "Channel created");
        Ok(channel)
    }

    /// Delete a channel with its subscriptions, courses and their
    /// completions.
    pub async fn delete_channel(&self, ctx: &AppContext, channel_id: Uuid) -> BrigadeResult<()> {
        ctx.require_admin()?;
        self.channels.delete(ctx.organization_id, channel_id).await?;
        Ok(())
    }

    pub async fn list_channels(&self, ctx: &AppContext) -> BrigadeResult<Vec<Channel>> {
        self.channels.list(ctx.organization_id).await
    }

    /// Subscribe the caller. Subscribing again returns the existing
    /// subscription.
    pub async fn subscribe(
        &self,
        ctx: &AppContext,
        channel_id: Uuid,
    ) -> BrigadeResult<Subscription> {
        self.channels
            .get_by_id(ctx.organization_id, channel_id)
            .await?;
        self.channels
            .subscribe(ctx.organization_id, channel_id, ctx.user_id)
            .await
    }

    pub async fn unsubscribe(&self, ctx: &AppContext, channel_id: Uuid) -> BrigadeResult<()> {
        self.channels
            .unsubscribe(ctx.organization_id, channel_id, ctx.user_id)
            .await
    }

    pub async fn subscriptions(&self, ctx: &AppContext) -> BrigadeResult<Vec<Channel>> {
        self.channels
            .list_subscribed(ctx.organization_id, ctx.user_id)
            .await
    }

    pub async fn create_course(&self, ctx: &AppContext, input: NewCourse) -> BrigadeResult<Course> {
        ctx.require_admin()?;
        let create = CreateCourse {
            organization_id: ctx.organization_id,
            channel_id: input.channel_id,
            title: input.title.trim().to_string(),
            description: input.description,
            lessons: input.lessons,
            pass_mark_percent: input.pass_mark_percent,
        };
        if let Err(e) = validate_course(&create) {
            warn!(organization_id = %ctx.organization_id, error = %e, "Course rejected");
            return Err(e);
        }
        self.channels
            .get_by_id(ctx.organization_id, create.channel_id)
            .await?;

        let course = self.courses.create(create).await?;
        info!(
            organization_id = %ctx.organization_id,
            course_id = %course.id,
            channel_id = %course.channel_id,
            "Course published"
        );
        Ok(course)
    }

    /// Courses of one channel, or of the whole organization.
    pub async fn list_courses(
        &self,
        ctx: &AppContext,
        channel_id: Option<Uuid>,
    ) -> BrigadeResult<Vec<Course>> {
        match channel_id {
            Some(channel_id) => {
                self.courses
                    .list_by_channel(ctx.organization_id, channel_id)
                    .await
            }
            None => self.courses.list(ctx.organization_id).await,
        }
    }

    /// Courses from every channel the caller subscribes to.
    pub async fn feed(&self, ctx: &AppContext) -> BrigadeResult<Vec<Course>> {
        let mut feed = Vec::new();
        for channel in self.subscriptions(ctx).await? {
            feed.extend(
                self.courses
                    .list_by_channel(ctx.organization_id, channel.id)
                    .await?,
            );
        }
        feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feed)
    }

    /// Grade the caller's answers and record the attempt.
    pub async fn submit_attempt(
        &self,
        ctx: &AppContext,
        course_id: Uuid,
        answers: &[Option<usize>],
    ) -> BrigadeResult<Attempt> {
        let course = self.courses.get_by_id(ctx.organization_id, course_id).await?;
        let grade = grade(&course, answers)?;

        let completion = self
            .courses
            .record_completion(CreateCourseCompletion {
                organization_id: ctx.organization_id,
                course_id,
                user_id: ctx.user_id,
                score_percent: grade.score_percent,
                passed: grade.passed,
            })
            .await?;
        Ok(Attempt { grade, completion })
    }

    pub async fn completions(&self, ctx: &AppContext) -> BrigadeResult<Vec<CourseCompletion>> {
        self.courses
            .list_completions(ctx.organization_id, ctx.user_id)
            .await
    }
}

//! Channels, subscriptions, courses and quiz attempts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use brigade_chart::{Attempt, NewChannel, NewCourse};
use brigade_core::models::channel::{Channel, Subscription};
use brigade_core::models::course::{Course, CourseCompletion};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::OrgContext;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/channels", get(list_channels).post(create_channel))
        .route("/channels/{id}", delete(delete_channel))
        .route("/channels/{id}/subscription", put(subscribe).delete(unsubscribe))
        .route("/subscriptions", get(subscriptions))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}/attempts", post(submit_attempt))
        .route("/feed", get(feed))
        .route("/completions", get(completions))
}

#[derive(Debug, Deserialize)]
struct CourseFilter {
    channel_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct AttemptBody {
    answers: Vec<Option<usize>>,
}

async fn list_channels(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<Vec<Channel>>> {
    Ok(Json(state.training.list_channels(&ctx).await?))
}

async fn create_channel(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Json(input): Json<NewChannel>,
) -> ApiResult<(StatusCode, Json<Channel>)> {
    let channel = state.training.create_channel(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(channel)))
}

async fn delete_channel(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.training.delete_channel(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn subscribe(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Subscription>> {
    Ok(Json(state.training.subscribe(&ctx, id).await?))
}

async fn unsubscribe(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.training.unsubscribe(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn subscriptions(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<Vec<Channel>>> {
    Ok(Json(state.training.subscriptions(&ctx).await?))
}

async fn list_courses(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Query(filter): Query<CourseFilter>,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.training.list_courses(&ctx, filter.channel_id).await?))
}

async fn create_course(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Json(input): Json<NewCourse>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let course = state.training.create_course(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn feed(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.training.feed(&ctx).await?))
}

async fn submit_attempt(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
    Json(body): Json<AttemptBody>,
) -> ApiResult<(StatusCode, Json<Attempt>)> {
    let attempt = state.training.submit_attempt(&ctx, id, &body.answers).await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

async fn completions(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<Vec<CourseCompletion>>> {
    Ok(Json(state.training.completions(&ctx).await?))
}

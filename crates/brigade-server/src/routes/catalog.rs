//! Departments and the position-title catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use brigade_chart::NewDepartment;
use brigade_core::models::department::Department;
use brigade_core::models::position::PositionTitle;
use serde::Deserialize;

use super::chart::ReconciledBody;
use crate::error::ApiResult;
use crate::extract::OrgContext;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments).post(create_department))
        .route("/departments/{slug}", delete(delete_department))
        .route("/titles", get(list_titles).post(add_title))
        .route("/titles/{title}", delete(remove_title))
}

#[derive(Debug, Deserialize)]
struct TitleBody {
    title: String,
}

async fn list_departments(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<Vec<Department>>> {
    Ok(Json(state.chart.list_departments(&ctx).await?))
}

async fn create_department(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Json(input): Json<NewDepartment>,
) -> ApiResult<(StatusCode, Json<ReconciledBody<Department>>)> {
    let created = state.chart.create_department(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn delete_department(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(slug): Path<String>,
) -> ApiResult<Json<ReconciledBody<()>>> {
    Ok(Json(state.chart.delete_department(&ctx, &slug).await?.into()))
}

async fn list_titles(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<Vec<PositionTitle>>> {
    Ok(Json(state.chart.list_titles(&ctx).await?))
}

async fn add_title(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Json(body): Json<TitleBody>,
) -> ApiResult<(StatusCode, Json<PositionTitle>)> {
    let title = state.chart.add_title(&ctx, &body.title).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

async fn remove_title(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(title): Path<String>,
) -> ApiResult<StatusCode> {
    state.chart.remove_title(&ctx, &title).await?;
    Ok(StatusCode::NO_CONTENT)
}

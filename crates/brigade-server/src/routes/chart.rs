//! Org-chart reads and position writes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use brigade_chart::{ChartView, NewPosition, Reconciled};
use brigade_core::hierarchy::PositionNode;
use brigade_core::models::position::{Position, PositionPermissions};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::OrgContext;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/chart", get(chart))
        .route("/chart/tree/{department}", get(tree))
        .route("/positions", post(create_position))
        .route("/positions/{id}", delete(delete_position))
        .route("/positions/{id}/scope", get(scope))
        .route("/positions/{id}/permissions", put(update_permissions))
        .route("/positions/{id}/open", put(set_open))
        .route("/positions/{id}/occupant", put(assign).delete(unassign))
}

/// A write result together with the chart reloaded after it.
#[derive(Debug, Serialize)]
pub(super) struct ReconciledBody<T> {
    value: T,
    chart: ChartView,
}

impl<T> From<Reconciled<T>> for ReconciledBody<T> {
    fn from(reconciled: Reconciled<T>) -> Self {
        Self {
            value: reconciled.value,
            chart: reconciled.chart.view(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenBody {
    is_open: bool,
}

#[derive(Debug, Deserialize)]
struct OccupantBody {
    user_id: Uuid,
}

async fn chart(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<ChartView>> {
    Ok(Json(state.chart.chart(&ctx).await?.view()))
}

async fn tree(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(department): Path<String>,
) -> ApiResult<Json<Vec<PositionNode>>> {
    Ok(Json(state.chart.tree(&ctx, &department).await?))
}

async fn scope(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Position>>> {
    Ok(Json(state.chart.scope(&ctx, id).await?))
}

async fn create_position(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Json(input): Json<NewPosition>,
) -> ApiResult<(StatusCode, Json<ReconciledBody<Position>>)> {
    let created = state.chart.create_position(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn delete_position(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReconciledBody<()>>> {
    Ok(Json(state.chart.delete_position(&ctx, id).await?.into()))
}

async fn update_permissions(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
    Json(permissions): Json<PositionPermissions>,
) -> ApiResult<Json<ReconciledBody<Position>>> {
    Ok(Json(
        state
            .chart
            .update_permissions(&ctx, id, permissions)
            .await?
            .into(),
    ))
}

async fn set_open(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
    Json(body): Json<OpenBody>,
) -> ApiResult<Json<ReconciledBody<Position>>> {
    Ok(Json(state.chart.set_open(&ctx, id, body.is_open).await?.into()))
}

async fn assign(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
    Json(body): Json<OccupantBody>,
) -> ApiResult<Json<ReconciledBody<()>>> {
    Ok(Json(state.chart.assign(&ctx, id, body.user_id).await?.into()))
}

async fn unassign(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReconciledBody<()>>> {
    Ok(Json(state.chart.unassign(&ctx, id).await?.into()))
}

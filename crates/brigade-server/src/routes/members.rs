//! Organization membership.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use brigade_core::error::BrigadeError;
use brigade_core::models::membership::{Member, MemberRole, Membership};
use brigade_core::repository::UserRepository;
use serde::Deserialize;
use uuid::Uuid;

use super::chart::ReconciledBody;
use crate::error::ApiResult;
use crate::extract::OrgContext;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(add_member))
        .route("/members/{user_id}", get(get_member).put(change_role).delete(remove_member))
}

/// Members are added by the email they registered with.
#[derive(Debug, Deserialize)]
struct AddMember {
    email: String,
    role: MemberRole,
}

#[derive(Debug, Deserialize)]
struct RoleBody {
    role: MemberRole,
}

async fn list_members(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
) -> ApiResult<Json<Vec<Member>>> {
    Ok(Json(state.chart.list_members(&ctx).await?))
}

async fn get_member(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Member>> {
    let chart = state.chart.chart(&ctx).await?;
    let member = chart
        .member(user_id)
        .cloned()
        .ok_or_else(|| BrigadeError::not_found("member", user_id))?;
    Ok(Json(member))
}

async fn add_member(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Json(input): Json<AddMember>,
) -> ApiResult<(StatusCode, Json<ReconciledBody<Membership>>)> {
    ctx.require_admin()?;
    let user = state
        .users
        .get_by_email(&input.email.trim().to_lowercase())
        .await?;
    let added = state.chart.add_member(&ctx, user.id, input.role).await?;
    Ok((StatusCode::CREATED, Json(added.into())))
}

async fn change_role(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(user_id): Path<Uuid>,
    Json(body): Json<RoleBody>,
) -> ApiResult<Json<ReconciledBody<Membership>>> {
    Ok(Json(state.chart.change_role(&ctx, user_id, body.role).await?.into()))
}

async fn remove_member(
    State(state): State<AppState>,
    OrgContext(ctx): OrgContext,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<ReconciledBody<()>>> {
    Ok(Json(state.chart.remove_member(&ctx, user_id).await?.into()))
}

//! Registration, login, the caller's profile and organization creation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use brigade_auth::{LoginInput, LoginOutput, RegisterInput};
use brigade_core::context::AppContext;
use brigade_core::error::BrigadeError;
use brigade_core::models::organization::{CreateOrganization, Organization};
use brigade_core::models::user::User;
use brigade_core::repository::{OrganizationRepository, UserRepository};
use brigade_core::slug::slugify;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::Caller;
use crate::state::AppState;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/me", get(me))
        .route("/organizations", post(create_organization))
        .route("/organizations/{id}/token", post(switch_organization))
}

#[derive(Debug, Deserialize)]
struct NewOrganization {
    name: String,
    #[serde(default)]
    slug: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatedOrganization {
    organization: Organization,
    token: LoginOutput,
}

#[derive(Debug, Serialize)]
struct Me {
    user: User,
    organization: Option<AppContext>,
    organizations: Vec<Organization>,
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> ApiResult<Json<LoginOutput>> {
    Ok(Json(state.auth.login(input).await?))
}

async fn me(State(state): State<AppState>, Caller(identity): Caller) -> ApiResult<Json<Me>> {
    let user = state.users.get_by_id(identity.user_id).await?;
    let organizations = state.organizations.list_for_user(identity.user_id).await?;
    let organization = match identity.organization {
        Some(_) => match state.auth.authorize(&identity).await {
            Ok(ctx) => Some(ctx),
            Err(BrigadeError::AuthorizationDenied { .. }) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };
    Ok(Json(Me {
        user,
        organization,
        organizations,
    }))
}

/// Create an organization owned by the caller and return a token scoped
/// to it.
async fn create_organization(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(input): Json<NewOrganization>,
) -> ApiResult<(StatusCode, Json<CreatedOrganization>)> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(BrigadeError::validation("organization name must not be empty").into());
    }
    let slug = slugify(input.slug.as_deref().unwrap_or(&name));
    if slug.is_empty() {
        return Err(
            BrigadeError::validation("organization slug must contain letters or digits").into(),
        );
    }

    let organization = state
        .organizations
        .create(CreateOrganization {
            name,
            slug,
            owner_id: identity.user_id,
        })
        .await?;

    let token = state
        .auth
        .issue_for_organization(identity.user_id, organization.id)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedOrganization { organization, token })))
}

/// Re-issue the caller's token scoped to another organization they
/// belong to.
async fn switch_organization(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(organization_id): Path<Uuid>,
) -> ApiResult<Json<LoginOutput>> {
    let token = state
        .auth
        .issue_for_organization(identity.user_id, organization_id)
        .await?;
    Ok(Json(token))
}

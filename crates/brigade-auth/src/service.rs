//! Authentication service — registration, login and token
//! verification.

use brigade_core::context::AppContext;
use brigade_core::error::{BrigadeError, BrigadeResult};
use brigade_core::models::membership::MemberRole;
use brigade_core::models::user::{CreateUser, User, UserStatus};
use brigade_core::repository::{MembershipRepository, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Input for the login flow.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// Scope the token to this organization. The user must be a member.
    #[serde(default)]
    pub organization_id: Option<Uuid>,
}

/// Successful login result.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    pub user_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub role: Option<MemberRole>,
}

/// The verified caller behind an access token.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub organization: Option<AppContext>,
}

impl Identity {
    /// The organization context, or an authorization error for tokens
    /// not scoped to an organization.
    pub fn context(&self) -> BrigadeResult<AppContext> {
        self.organization
            .ok_or_else(|| AuthError::NoOrganization.into())
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, M: MembershipRepository> {
    user_repo: U,
    membership_repo: M,
    config: AuthConfig,
}

impl<U: UserRepository, M: MembershipRepository> AuthService<U, M> {
    pub fn new(user_repo: U, membership_repo: M, config: AuthConfig) -> Self {
        Self {
            user_repo,
            membership_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create a new account after applying the email and password
    /// policy.
    pub async fn register(&self, input: RegisterInput) -> BrigadeResult<User> {
        let email = normalize_email(&input.email)?;
        password::check_policy(&input.password, self.config.min_password_length)?;
        let display_name = input.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(BrigadeError::validation("display name must not be empty"));
        }

        let user = self
            .user_repo
            .create(CreateUser {
                email,
                display_name,
                password: input.password,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Authenticate with email + password and issue an access token,
    /// optionally scoped to one organization.
    pub async fn login(&self, input: LoginInput) -> BrigadeResult<LoginOutput> {
        let email = normalize_email(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = match self.user_repo.get_by_email(&email).await {
            Ok(u) => u,
            Err(BrigadeError::NotFound { .. }) => {
                warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        match user.status {
            UserStatus::Active => {}
            UserStatus::Inactive => return Err(AuthError::AccountInactive.into()),
            UserStatus::PendingVerification => {
                return Err(AuthError::AccountPendingVerification.into());
            }
        }

        match input.organization_id {
            Some(organization_id) => self.issue_for_organization(user.id, organization_id).await,
            None => self.issue(user.id, None),
        }
    }

    /// Issue a token scoped to `organization_id` for a user already
    /// known to be authenticated, with the role from their membership.
    pub async fn issue_for_organization(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> BrigadeResult<LoginOutput> {
        let membership = match self.membership_repo.get(organization_id, user_id).await {
            Ok(m) => m,
            Err(BrigadeError::NotFound { .. }) => return Err(AuthError::NotAMember.into()),
            Err(e) => return Err(e),
        };
        self.issue(user_id, Some((organization_id, membership.role)))
    }

    fn issue(
        &self,
        user_id: Uuid,
        organization: Option<(Uuid, MemberRole)>,
    ) -> BrigadeResult<LoginOutput> {
        let access_token = token::issue_access_token(user_id, organization, &self.config)?;
        info!(
            %user_id,
            organization_id = ?organization.map(|(id, _)| id),
            "Access token issued"
        );
        Ok(LoginOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
            user_id,
            organization_id: organization.map(|(id, _)| id),
            role: organization.map(|(_, role)| role),
        })
    }

    /// Resolve the organization context of an authenticated caller
    /// against their current membership.
    ///
    /// The token only selects the organization. The role is read from
    /// the stored membership, so removed members are denied and role
    /// changes apply to tokens already issued.
    pub async fn authorize(&self, identity: &Identity) -> BrigadeResult<AppContext> {
        let claimed = identity.context()?;
        let membership = match self
            .membership_repo
            .get(claimed.organization_id, claimed.user_id)
            .await
        {
            Ok(m) => m,
            Err(BrigadeError::NotFound { .. }) => {
                warn!(
                    user_id = %claimed.user_id,
                    organization_id = %claimed.organization_id,
                    "Token presented by a former member"
                );
                return Err(AuthError::NotAMember.into());
            }
            Err(e) => return Err(e),
        };
        Ok(AppContext {
            role: membership.role,
            ..claimed
        })
    }

    /// Verify an access token and return the caller's identity.
    pub fn authenticate(&self, access_token: &str) -> BrigadeResult<Identity> {
        let claims = token::decode_access_token(access_token, &self.config)?;
        Ok(Identity {
            user_id: claims.user_id()?,
            organization: claims.context()?,
        })
    }
}

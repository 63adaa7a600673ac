//! SurrealDB implementation of [`MembershipRepository`].

use std::collections::HashMap;

use brigade_core::error::BrigadeResult;
use brigade_core::models::membership::{CreateMembership, Member, MemberRole, Membership};
use brigade_core::models::user::UserStatus;
use brigade_core::repository::MembershipRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid};
use crate::error::DbError;

const SELECT_MEMBERSHIP: &str = "SELECT * FROM membership \
     WHERE organization_id = $organization_id AND user_id = $user_id";

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    organization_id: String,
    user_id: String,
    role: String,
    position_id: Option<String>,
    joined_at: DateTime<Utc>,
}

impl MembershipRow {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let role = MemberRole::parse(&self.role)
            .ok_or_else(|| DbError::Decode(format!("unknown member role: {}", self.role)))?;
        Ok(Membership {
            organization_id: parse_uuid("organization", &self.organization_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            role,
            position_id: parse_opt_uuid("position", self.position_id)?,
            joined_at: self.joined_at,
        })
    }
}

/// Profile columns needed for the member view.
#[derive(Debug, SurrealValue)]
struct ProfileRow {
    record_id: String,
    email: String,
    display_name: String,
    status: String,
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Membership>, DbError> {
        let mut result = self
            .db
            .query(SELECT_MEMBERSHIP)
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await?;
        let rows: Vec<MembershipRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(MembershipRow::try_into_membership)
            .transpose()
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn add(&self, input: CreateMembership) -> BrigadeResult<Membership> {
        self.db
            .query(
                "CREATE membership SET organization_id = $organization_id, \
                 user_id = $user_id, role = $role, position_id = NONE",
            )
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("role", input.role.as_str().to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("membership", e))?;

        info!(
            organization_id = %input.organization_id,
            user_id = %input.user_id,
            role = input.role.as_str(),
            "Member added"
        );

        self.get(input.organization_id, input.user_id).await
    }

    async fn get(&self, organization_id: Uuid, user_id: Uuid) -> BrigadeResult<Membership> {
        self.find(organization_id, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("membership", user_id).into())
    }

    async fn update_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> BrigadeResult<Membership> {
        self.db
            .query(
                "UPDATE membership SET role = $role \
                 WHERE organization_id = $organization_id AND user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("membership", e))?;

        self.get(organization_id, user_id).await
    }

    async fn remove(&self, organization_id: Uuid, user_id: Uuid) -> BrigadeResult<()> {
        if self.find(organization_id, user_id).await?.is_none() {
            return Err(DbError::not_found("membership", user_id).into());
        }

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE position SET occupant_id = NONE, updated_at = time::now() \
                 WHERE organization_id = $organization_id AND occupant_id = $user_id; \
                 DELETE subscription \
                 WHERE organization_id = $organization_id AND user_id = $user_id; \
                 DELETE membership \
                 WHERE organization_id = $organization_id AND user_id = $user_id; \
                 COMMIT TRANSACTION;",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("membership", e))?;

        info!(%organization_id, %user_id, "Member removed");
        Ok(())
    }

    async fn list_members(&self, organization_id: Uuid) -> BrigadeResult<Vec<Member>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM membership WHERE organization_id = $organization_id \
                 ORDER BY joined_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let memberships = rows
            .into_iter()
            .map(MembershipRow::try_into_membership)
            .collect::<Result<Vec<_>, DbError>>()?;

        let user_ids: Vec<String> = memberships.iter().map(|m| m.user_id.to_string()).collect();
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, email, display_name, status \
                 FROM user WHERE meta::id(id) IN $user_ids",
            )
            .bind(("user_ids", user_ids))
            .await
            .map_err(DbError::from)?;
        let profiles: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let mut profiles: HashMap<String, ProfileRow> = profiles
            .into_iter()
            .map(|p| (p.record_id.clone(), p))
            .collect();

        let mut members = Vec::with_capacity(memberships.len());
        for m in memberships {
            // A membership whose user record is gone is skipped.
            let Some(profile) = profiles.remove(&m.user_id.to_string()) else {
                continue;
            };
            let status = UserStatus::parse(&profile.status)
                .ok_or_else(|| {
                    DbError::Decode(format!("unknown user status: {}", profile.status))
                })?;
            members.push(Member {
                user_id: m.user_id,
                email: profile.email,
                display_name: profile.display_name,
                status,
                role: m.role,
                position_id: m.position_id,
                joined_at: m.joined_at,
            });
        }
        Ok(members)
    }
}

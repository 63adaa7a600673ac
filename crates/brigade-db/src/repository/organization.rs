//! SurrealDB implementation of [`OrganizationRepository`].

use brigade_core::error::BrigadeResult;
use brigade_core::models::organization::{CreateOrganization, Organization};
use brigade_core::repository::OrganizationRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    record_id: String,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        Ok(Organization {
            id: parse_uuid("organization", &self.record_id)?,
            name: self.name,
            slug: self.slug,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        query: &str,
        key: &'static str,
        value: String,
    ) -> Result<Option<Organization>, DbError> {
        let mut result = self.db.query(query).bind((key, value)).await?;
        let rows: Vec<OrganizationRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(OrganizationRow::try_into_organization)
            .transpose()
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> BrigadeResult<Organization> {
        if self
            .find_one(
                "SELECT meta::id(id) AS record_id, * FROM organization WHERE slug = $slug",
                "slug",
                input.slug.clone(),
            )
            .await?
            .is_some()
        {
            return Err(DbError::AlreadyExists {
                entity: "organization".into(),
            }
            .into());
        }

        let id = Uuid::new_v4();

        // The organization and its owner's membership are written together.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('organization', $id) SET \
                 name = $name, slug = $slug; \
                 CREATE membership SET organization_id = $id, \
                 user_id = $owner_id, role = 'Owner', position_id = NONE; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("owner_id", input.owner_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("organization", e))?;

        info!(organization_id = %id, owner_id = %input.owner_id, "Organization created");

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> BrigadeResult<Organization> {
        let org = self
            .find_one(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('organization', $id)",
                "id",
                id.to_string(),
            )
            .await?;
        org.ok_or_else(|| DbError::not_found("organization", id).into())
    }

    async fn list_for_user(&self, user_id: Uuid) -> BrigadeResult<Vec<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE meta::id(id) IN \
                 (SELECT VALUE organization_id FROM membership WHERE user_id = $user_id) \
                 ORDER BY name ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(OrganizationRow::try_into_organization)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}

//! SurrealDB implementation of [`DepartmentRepository`].

use brigade_core::error::BrigadeResult;
use brigade_core::models::department::{CreateDepartment, Department};
use brigade_core::repository::DepartmentRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DepartmentRow {
    organization_id: String,
    slug: String,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
}

impl DepartmentRow {
    fn try_into_department(self) -> Result<Department, DbError> {
        Ok(Department {
            id: self.slug,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            name: self.name,
            color: self.color,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Department repository.
///
/// Records get a generated key; the slug is a field unique per
/// organization.
#[derive(Clone)]
pub struct SurrealDepartmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDepartmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DepartmentRepository for SurrealDepartmentRepository<C> {
    async fn create(&self, slug: &str, input: CreateDepartment) -> BrigadeResult<Department> {
        self.db
            .query(
                "CREATE department SET organization_id = $organization_id, \
                 slug = $slug, name = $name, color = $color",
            )
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("slug", slug.to_string()))
            .bind(("name", input.name))
            .bind(("color", input.color))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("department", e))?;

        self.get(input.organization_id, slug).await
    }

    async fn get(&self, organization_id: Uuid, slug: &str) -> BrigadeResult<Department> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM department \
                 WHERE organization_id = $organization_id AND slug = $slug",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("department", slug))?;
        Ok(row.try_into_department()?)
    }

    async fn delete(&self, organization_id: Uuid, slug: &str) -> BrigadeResult<()> {
        self.get(organization_id, slug).await?;

        self.db
            .query(
                "DELETE department \
                 WHERE organization_id = $organization_id AND slug = $slug",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("department", e))?;

        Ok(())
    }

    async fn list(&self, organization_id: Uuid) -> BrigadeResult<Vec<Department>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM department WHERE organization_id = $organization_id \
                 ORDER BY name ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(DepartmentRow::try_into_department)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}

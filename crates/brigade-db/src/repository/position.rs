//! SurrealDB implementation of [`PositionRepository`].
//!
//! Positions live in a flat table; `parent_id` and `occupant_id` are
//! plain UUID strings. Writes that touch more than one record
//! (assignment, unassignment, delete) run as a single transaction so
//! that a position's occupant and the occupant's membership never
//! disagree.

use brigade_core::error::{BrigadeError, BrigadeResult};
use brigade_core::models::position::{CreatePosition, Position, PositionPermissions};
use brigade_core::repository::PositionRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{info, warn};
use uuid::Uuid;

use super::{CountRow, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

const SELECT_POSITION: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('position', $id) WHERE organization_id = $organization_id";

const ASSIGN_OCCUPANT: &str = "\
BEGIN TRANSACTION;
LET $target = type::record('position', $position_id);
LET $previous = (SELECT VALUE occupant_id FROM position \
    WHERE id = $target AND organization_id = $organization_id);
IF array::len($previous) = 0 { THROW 'position not found'; };
IF array::len((SELECT VALUE id FROM membership \
    WHERE organization_id = $organization_id AND user_id = $user_id)) = 0 \
    { THROW 'user is not a member of the organization'; };
UPDATE membership SET position_id = NONE \
    WHERE organization_id = $organization_id AND user_id IN $previous \
    AND user_id != $user_id;
UPDATE position SET occupant_id = NONE, updated_at = time::now() \
    WHERE organization_id = $organization_id AND occupant_id = $user_id \
    AND id != $target;
UPDATE $target SET occupant_id = $user_id, updated_at = time::now();
UPDATE membership SET position_id = $position_id \
    WHERE organization_id = $organization_id AND user_id = $user_id;
COMMIT TRANSACTION;
";

const CLEAR_OCCUPANT: &str = "\
BEGIN TRANSACTION;
LET $target = type::record('position', $position_id);
LET $previous = (SELECT VALUE occupant_id FROM position \
    WHERE id = $target AND organization_id = $organization_id);
UPDATE membership SET position_id = NONE \
    WHERE organization_id = $organization_id AND user_id IN $previous \
    AND position_id = $position_id;
UPDATE position SET occupant_id = NONE, updated_at = time::now() \
    WHERE id = $target AND organization_id = $organization_id \
    AND occupant_id != NONE;
COMMIT TRANSACTION;
";

const DELETE_POSITION: &str = "\
BEGIN TRANSACTION;
IF array::len((SELECT VALUE id FROM position \
    WHERE organization_id = $organization_id AND parent_id = $position_id)) > 0 \
    { THROW 'position has child positions'; };
UPDATE membership SET position_id = NONE \
    WHERE organization_id = $organization_id AND position_id = $position_id;
DELETE position WHERE id = type::record('position', $position_id) \
    AND organization_id = $organization_id;
COMMIT TRANSACTION;
";

#[derive(Debug, SurrealValue)]
struct PositionRow {
    record_id: String,
    organization_id: String,
    title: String,
    department_id: String,
    parent_id: Option<String>,
    occupant_id: Option<String>,
    level: u32,
    is_open: bool,
    permissions: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PositionRow {
    fn try_into_position(self) -> Result<Position, DbError> {
        let permissions: PositionPermissions = serde_json::from_value(self.permissions)
            .map_err(|e| DbError::Decode(format!("position permissions: {e}")))?;
        Ok(Position {
            id: parse_uuid("position", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            title: self.title,
            department_id: self.department_id,
            parent_id: parse_opt_uuid("parent position", self.parent_id)?,
            occupant_id: parse_opt_uuid("occupant", self.occupant_id)?,
            level: self.level,
            is_open: self.is_open,
            permissions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn permissions_value(permissions: &PositionPermissions) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(permissions)
        .map_err(|e| DbError::Decode(format!("position permissions: {e}")))
}

/// SurrealDB implementation of the Position repository.
#[derive(Clone)]
pub struct SurrealPositionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPositionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run a statement against one position, then re-read it.
    async fn update_one(
        &self,
        organization_id: Uuid,
        id: Uuid,
        set_clause: &str,
        binding: (&'static str, serde_json::Value),
    ) -> BrigadeResult<Position> {
        let query = format!(
            "UPDATE type::record('position', $id) SET {set_clause}, updated_at = time::now() \
             WHERE organization_id = $organization_id; {SELECT_POSITION};"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(binding)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("position", e))?;

        let rows: Vec<PositionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("position", id))?;
        Ok(row.try_into_position()?)
    }
}

impl<C: Connection> PositionRepository for SurrealPositionRepository<C> {
    async fn create(&self, input: CreatePosition) -> BrigadeResult<Position> {
        let id = Uuid::new_v4();
        let permissions = permissions_value(&input.permissions)?;

        let query = format!(
            "CREATE type::record('position', $id) SET \
             organization_id = $organization_id, title = $title, \
             department_id = $department_id, parent_id = $parent_id, \
             occupant_id = NONE, level = $level, is_open = $is_open, \
             permissions = $permissions; {SELECT_POSITION};"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("title", input.title))
            .bind(("department_id", input.department_id))
            .bind(("parent_id", input.parent_id.map(|p| p.to_string())))
            .bind(("level", input.level))
            .bind(("is_open", input.is_open))
            .bind(("permissions", permissions))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("position", e))?;

        let rows: Vec<PositionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("position", id))?;
        Ok(row.try_into_position()?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> BrigadeResult<Position> {
        let mut result = self
            .db
            .query(SELECT_POSITION)
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PositionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("position", id))?;
        Ok(row.try_into_position()?)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> BrigadeResult<Vec<Position>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM position \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PositionRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PositionRow::try_into_position)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn count_children(&self, organization_id: Uuid, id: Uuid) -> BrigadeResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM position \
                 WHERE organization_id = $organization_id AND parent_id = $id \
                 GROUP ALL",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> BrigadeResult<()> {
        self.get_by_id(organization_id, id).await?;

        let children = self.count_children(organization_id, id).await?;
        if children > 0 {
            warn!(position_id = %id, children, "Refusing to delete position with children");
            return Err(BrigadeError::validation(format!(
                "position {id} has {children} child position(s) and cannot be deleted"
            )));
        }

        let outcome = self
            .db
            .query(DELETE_POSITION)
            .bind(("organization_id", organization_id.to_string()))
            .bind(("position_id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check();

        if let Err(e) = outcome {
            // A child may have been created after the first count.
            let children = self.count_children(organization_id, id).await?;
            if children > 0 {
                warn!(position_id = %id, children, "Position gained children before delete");
                return Err(BrigadeError::validation(format!(
                    "position {id} has {children} child position(s) and cannot be deleted"
                )));
            }
            return Err(DbError::statement("position", e).into());
        }

        info!(%organization_id, position_id = %id, "Position deleted");
        Ok(())
    }

    async fn update_permissions(
        &self,
        organization_id: Uuid,
        id: Uuid,
        permissions: PositionPermissions,
    ) -> BrigadeResult<Position> {
        let value = permissions_value(&permissions)?;
        self.update_one(organization_id, id, "permissions = $permissions", ("permissions", value))
            .await
    }

    async fn set_open(
        &self,
        organization_id: Uuid,
        id: Uuid,
        is_open: bool,
    ) -> BrigadeResult<Position> {
        self.update_one(
            organization_id,
            id,
            "is_open = $is_open",
            ("is_open", serde_json::Value::Bool(is_open)),
        )
        .await
    }

    async fn assign_occupant(
        &self,
        organization_id: Uuid,
        position_id: Uuid,
        user_id: Uuid,
    ) -> BrigadeResult<()> {
        self.db
            .query(ASSIGN_OCCUPANT)
            .bind(("organization_id", organization_id.to_string()))
            .bind(("position_id", position_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("position", e))?;

        info!(%organization_id, %position_id, %user_id, "Occupant assigned");
        Ok(())
    }

    async fn clear_occupant(&self, organization_id: Uuid, position_id: Uuid) -> BrigadeResult<()> {
        self.db
            .query(CLEAR_OCCUPANT)
            .bind(("organization_id", organization_id.to_string()))
            .bind(("position_id", position_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("position", e))?;

        info!(%organization_id, %position_id, "Occupant cleared");
        Ok(())
    }
}

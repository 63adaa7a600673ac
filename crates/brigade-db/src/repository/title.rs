//! SurrealDB implementation of [`PositionTitleRepository`].

use brigade_core::error::BrigadeResult;
use brigade_core::models::position::PositionTitle;
use brigade_core::repository::PositionTitleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TitleRow {
    title: String,
}

#[derive(Clone)]
pub struct SurrealPositionTitleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPositionTitleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PositionTitleRepository for SurrealPositionTitleRepository<C> {
    async fn add(&self, organization_id: Uuid, title: &str) -> BrigadeResult<PositionTitle> {
        self.db
            .query("CREATE position_title SET organization_id = $organization_id, title = $title")
            .bind(("organization_id", organization_id.to_string()))
            .bind(("title", title.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("position_title", e))?;

        Ok(PositionTitle {
            organization_id,
            title: title.to_string(),
        })
    }

    async fn remove(&self, organization_id: Uuid, title: &str) -> BrigadeResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE position_title \
                 WHERE organization_id = $organization_id AND title = $title \
                 RETURN BEFORE",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("title", title.to_string()))
            .await
            .map_err(DbError::from)?;

        let removed: Vec<TitleRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::not_found("position_title", title).into());
        }
        Ok(())
    }

    async fn list(&self, organization_id: Uuid) -> BrigadeResult<Vec<PositionTitle>> {
        let mut result = self
            .db
            .query(
                "SELECT title FROM position_title \
                 WHERE organization_id = $organization_id ORDER BY title ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TitleRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| PositionTitle {
                organization_id,
                title: row.title,
            })
            .collect())
    }
}

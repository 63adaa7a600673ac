//! SurrealDB repository implementations.

mod channel;
mod course;
mod department;
mod membership;
mod organization;
mod position;
mod title;
mod user;

pub use channel::SurrealChannelRepository;
pub use course::SurrealCourseRepository;
pub use department::SurrealDepartmentRepository;
pub use membership::SurrealMembershipRepository;
pub use organization::SurrealOrganizationRepository;
pub use position::SurrealPositionRepository;
pub use title::SurrealPositionTitleRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(field, &v)).transpose()
}

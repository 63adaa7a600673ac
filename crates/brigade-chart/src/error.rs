//! Chart service error types.

use brigade_core::error::BrigadeError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("position title must not be empty")]
    EmptyTitle,

    #[error("department '{0}' does not exist")]
    UnknownDepartment(String),

    #[error("parent position {0} does not exist")]
    UnknownParent(Uuid),

    #[error(
        "parent position {parent_id} belongs to department '{parent_department}', \
         not '{department}'"
    )]
    ParentDepartmentMismatch {
        parent_id: Uuid,
        parent_department: String,
        department: String,
    },

    #[error("user {0} is not a member of this organization")]
    NotAMember(Uuid),

    #[error("department name '{0}' contains no letters or digits")]
    EmptySlug(String),

    #[error("color '{0}' is not a #RRGGBB value")]
    InvalidColor(String),

    #[error("only an owner can grant or revoke the owner role")]
    OwnerRequired,

    #[error("the organization must keep at least one owner")]
    LastOwner,
}

impl From<ChartError> for BrigadeError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::OwnerRequired => BrigadeError::denied(err.to_string()),
            other => BrigadeError::validation(other.to_string()),
        }
    }
}

//! Position domain model.
//!
//! A position is one role slot in an organization's chart. Positions
//! form a forest per department through `parent_id`; see
//! [`crate::hierarchy`] for the traversal rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability flags attached to a position.
///
/// These flags are stored and returned, but nothing in Brigade reads
/// them to gate an operation. Administrative access is decided by the
/// member's [`MemberRole`](super::membership::MemberRole).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PositionPermissions {
    pub manage_chart: bool,
    pub manage_members: bool,
    pub manage_courses: bool,
    pub manage_channels: bool,
    pub view_reports: bool,
    pub assign_training: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    /// Department slug.
    pub department_id: String,
    /// `None` marks a root of its department's tree.
    pub parent_id: Option<Uuid>,
    pub occupant_id: Option<Uuid>,
    /// Depth at creation time. Not maintained when the tree changes.
    pub level: u32,
    /// Whether the vacancy is advertised.
    pub is_open: bool,
    pub permissions: PositionPermissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    pub fn is_vacant(&self) -> bool {
        self.occupant_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePosition {
    pub organization_id: Uuid,
    pub title: String,
    pub department_id: String,
    pub parent_id: Option<Uuid>,
    pub level: u32,
    pub is_open: bool,
    pub permissions: PositionPermissions,
}

/// An entry in the organization's position-title catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionTitle {
    pub organization_id: Uuid,
    pub title: String,
}

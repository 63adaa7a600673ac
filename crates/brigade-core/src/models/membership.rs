//! Organization membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserStatus;

/// Administrative role of a user inside one organization.
///
/// This is independent of the position a member occupies; position
/// permission flags are descriptive and never consulted here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MemberRole {
    Owner,
    Admin,
    Staff,
}

impl MemberRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "Owner",
            MemberRole::Admin => "Admin",
            MemberRole::Staff => "Staff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Owner" => Some(MemberRole::Owner),
            "Admin" => Some(MemberRole::Admin),
            "Staff" => Some(MemberRole::Staff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Membership {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    /// The position this user occupies in the organization, if any.
    pub position_id: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
}

/// A user as seen from one organization: profile fields joined with
/// the membership record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub status: UserStatus,
    pub role: MemberRole,
    pub position_id: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
}

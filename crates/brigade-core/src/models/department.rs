//! Department definitions.
//!
//! Departments are a catalog per organization. Positions reference a
//! department by its slug; deleting a department leaves its positions
//! untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    /// Slug derived from the name (see [`crate::slug::slugify`]).
    pub id: String,
    pub organization_id: Uuid,
    pub name: String,
    /// Display color, `#RRGGBB`.
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub organization_id: Uuid,
    pub name: String,
    pub color: String,
}

/// Returns true for `#RRGGBB` hex colors.
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

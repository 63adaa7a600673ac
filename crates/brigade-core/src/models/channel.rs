//! Channel domain model.
//!
//! Channels are content-distribution topics owned by an organization.
//! Courses are published into a channel and reach the users subscribed
//! to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChannel {
    pub organization_id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub organization_id: Uuid,
    pub channel_id: Uuid,
    pub user_id: Uuid,
    pub subscribed_at: DateTime<Utc>,
}

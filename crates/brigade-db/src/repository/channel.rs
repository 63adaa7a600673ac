//! SurrealDB implementation of [`ChannelRepository`].

use brigade_core::error::BrigadeResult;
use brigade_core::models::channel::{Channel, CreateChannel, Subscription};
use brigade_core::repository::ChannelRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const SELECT_CHANNEL: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('channel', $id) WHERE organization_id = $organization_id";

const SELECT_SUBSCRIPTION: &str = "SELECT * FROM subscription \
     WHERE organization_id = $organization_id AND channel_id = $channel_id \
     AND user_id = $user_id";

#[derive(Debug, SurrealValue)]
struct ChannelRow {
    record_id: String,
    organization_id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl ChannelRow {
    fn try_into_channel(self) -> Result<Channel, DbError> {
        Ok(Channel {
            id: parse_uuid("channel", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct SubscriptionRow {
    organization_id: String,
    channel_id: String,
    user_id: String,
    subscribed_at: DateTime<Utc>,
}

impl SubscriptionRow {
    fn try_into_subscription(self) -> Result<Subscription, DbError> {
        Ok(Subscription {
            organization_id: parse_uuid("organization", &self.organization_id)?,
            channel_id: parse_uuid("channel", &self.channel_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            subscribed_at: self.subscribed_at,
        })
    }
}

/// SurrealDB implementation of the Channel repository.
#[derive(Clone)]
pub struct SurrealChannelRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealChannelRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_subscription(
        &self,
        organization_id: Uuid,
        channel_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, DbError> {
        let mut result = self
            .db
            .query(SELECT_SUBSCRIPTION)
            .bind(("organization_id", organization_id.to_string()))
            .bind(("channel_id", channel_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await?;
        let rows: Vec<SubscriptionRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(SubscriptionRow::try_into_subscription)
            .transpose()
    }
}

impl<C: Connection> ChannelRepository for SurrealChannelRepository<C> {
    async fn create(&self, input: CreateChannel) -> BrigadeResult<Channel> {
        let id = Uuid::new_v4();
        let query = format!(
            "CREATE type::record('channel', $id) SET \
             organization_id = $organization_id, name = $name, \
             description = $description; {SELECT_CHANNEL};"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("channel", e))?;

        let rows: Vec<ChannelRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("channel", id))?;
        Ok(row.try_into_channel()?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> BrigadeResult<Channel> {
        let mut result = self
            .db
            .query(SELECT_CHANNEL)
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChannelRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("channel", id))?;
        Ok(row.try_into_channel()?)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> BrigadeResult<()> {
        self.get_by_id(organization_id, id).await?;

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE course_completion WHERE organization_id = $organization_id \
                 AND course_id IN (SELECT VALUE meta::id(id) FROM course \
                 WHERE organization_id = $organization_id AND channel_id = $id); \
                 DELETE course \
                 WHERE organization_id = $organization_id AND channel_id = $id; \
                 DELETE subscription \
                 WHERE organization_id = $organization_id AND channel_id = $id; \
                 DELETE type::record('channel', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("channel", e))?;

        info!(%organization_id, channel_id = %id, "Channel deleted");
        Ok(())
    }

    async fn list(&self, organization_id: Uuid) -> BrigadeResult<Vec<Channel>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM channel \
                 WHERE organization_id = $organization_id ORDER BY name ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChannelRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ChannelRow::try_into_channel)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn subscribe(
        &self,
        organization_id: Uuid,
        channel_id: Uuid,
        user_id: Uuid,
    ) -> BrigadeResult<Subscription> {
        if let Some(existing) = self
            .find_subscription(organization_id, channel_id, user_id)
            .await?
        {
            return Ok(existing);
        }

        let outcome = self
            .db
            .query(
                "CREATE subscription SET organization_id = $organization_id, \
                 channel_id = $channel_id, user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("channel_id", channel_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("subscription", e));

        match outcome {
            // A concurrent subscribe won the unique index; reuse its row.
            Ok(_) | Err(DbError::AlreadyExists { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        self.find_subscription(organization_id, channel_id, user_id)
            .await?
            .ok_or_else(|| DbError::not_found("subscription", channel_id).into())
    }

    async fn unsubscribe(
        &self,
        organization_id: Uuid,
        channel_id: Uuid,
        user_id: Uuid,
    ) -> BrigadeResult<()> {
        self.db
            .query(
                "DELETE subscription WHERE organization_id = $organization_id \
                 AND channel_id = $channel_id AND user_id = $user_id",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("channel_id", channel_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement("subscription", e))?;
        Ok(())
    }

    async fn list_subscribed(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> BrigadeResult<Vec<Channel>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM channel \
                 WHERE organization_id = $organization_id AND meta::id(id) IN \
                 (SELECT VALUE channel_id FROM subscription \
                 WHERE organization_id = $organization_id AND user_id = $user_id) \
                 ORDER BY name ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ChannelRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ChannelRow::try_into_channel)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}

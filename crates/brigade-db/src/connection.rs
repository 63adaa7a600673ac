//! Opening the Brigade store.
//!
//! The endpoint URL picks the deployment: `mem://` runs an embedded
//! in-memory store with no credentials, anything else is a remote
//! SurrealDB server that requires root sign-in.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Embedded,
    Remote,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials; ignored by embedded stores.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "mem://".into(),
            namespace: "brigade".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    pub fn kind(&self) -> StoreKind {
        if self.url.starts_with("mem://") {
            StoreKind::Embedded
        } else {
            StoreKind::Remote
        }
    }
}

/// An open store with the Brigade namespace and database selected.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
    kind: StoreKind,
}

impl DbManager {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let kind = config.kind();
        let db = any::connect(config.url.as_str()).await?;

        if kind == StoreKind::Remote {
            let credentials = Root {
                username: config.username.clone(),
                password: config.password.clone(),
            };
            db.signin(credentials).await?;
        }
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            ?kind,
            "Store opened"
        );
        Ok(Self { db, kind })
    }

    /// Bring the schema up to the latest version.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}

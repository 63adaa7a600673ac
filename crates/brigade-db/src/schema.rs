//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; enums are stored as strings with ASSERT constraints.
//! Structured values that have no query use (permission flags, course
//! lessons) are stored as FLEXIBLE objects.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD slug ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_slug ON TABLE organization \
    COLUMNS slug UNIQUE;

-- =======================================================================
-- Users (global)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Active', 'Inactive', 'PendingVerification'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Memberships (organization scope)
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE membership TYPE string;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string \
    ASSERT $value IN ['Owner', 'Admin', 'Staff'];
DEFINE FIELD position_id ON TABLE membership TYPE option<string>;
DEFINE FIELD joined_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_org_user ON TABLE membership \
    COLUMNS organization_id, user_id UNIQUE;
DEFINE INDEX idx_membership_user ON TABLE membership COLUMNS user_id;

-- =======================================================================
-- Departments (organization scope)
-- =======================================================================
DEFINE TABLE department SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE department TYPE string;
DEFINE FIELD slug ON TABLE department TYPE string;
DEFINE FIELD name ON TABLE department TYPE string;
DEFINE FIELD color ON TABLE department TYPE string;
DEFINE FIELD created_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_department_org_slug ON TABLE department \
    COLUMNS organization_id, slug UNIQUE;

-- =======================================================================
-- Position title catalog (organization scope)
-- =======================================================================
DEFINE TABLE position_title SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE position_title TYPE string;
DEFINE FIELD title ON TABLE position_title TYPE string;
DEFINE INDEX idx_position_title_org_title ON TABLE position_title \
    COLUMNS organization_id, title UNIQUE;

-- =======================================================================
-- Positions (organization scope)
-- =======================================================================
DEFINE TABLE position SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE position TYPE string;
DEFINE FIELD title ON TABLE position TYPE string;
DEFINE FIELD department_id ON TABLE position TYPE string;
DEFINE FIELD parent_id ON TABLE position TYPE option<string>;
DEFINE FIELD occupant_id ON TABLE position TYPE option<string>;
DEFINE FIELD level ON TABLE position TYPE int DEFAULT 0;
DEFINE FIELD is_open ON TABLE position TYPE bool DEFAULT true;
DEFINE FIELD permissions ON TABLE position TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE position TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE position TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_position_org ON TABLE position COLUMNS organization_id;
DEFINE INDEX idx_position_org_parent ON TABLE position \
    COLUMNS organization_id, parent_id;
DEFINE INDEX idx_position_org_occupant ON TABLE position \
    COLUMNS organization_id, occupant_id;

-- =======================================================================
-- Channels and subscriptions (organization scope)
-- =======================================================================
DEFINE TABLE channel SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE channel TYPE string;
DEFINE FIELD name ON TABLE channel TYPE string;
DEFINE FIELD description ON TABLE channel TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE channel TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_channel_org_name ON TABLE channel \
    COLUMNS organization_id, name UNIQUE;

DEFINE TABLE subscription SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE subscription TYPE string;
DEFINE FIELD channel_id ON TABLE subscription TYPE string;
DEFINE FIELD user_id ON TABLE subscription TYPE string;
DEFINE FIELD subscribed_at ON TABLE subscription TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_subscription_channel_user ON TABLE subscription \
    COLUMNS channel_id, user_id UNIQUE;

-- =======================================================================
-- Courses and completions (organization scope)
-- =======================================================================
DEFINE TABLE course SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE course TYPE string;
DEFINE FIELD channel_id ON TABLE course TYPE string;
DEFINE FIELD title ON TABLE course TYPE string;
DEFINE FIELD description ON TABLE course TYPE string DEFAULT '';
DEFINE FIELD content ON TABLE course TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD pass_mark_percent ON TABLE course TYPE int \
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD created_at ON TABLE course TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_course_org_channel ON TABLE course \
    COLUMNS organization_id, channel_id;

DEFINE TABLE course_completion SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE course_completion TYPE string;
DEFINE FIELD course_id ON TABLE course_completion TYPE string;
DEFINE FIELD user_id ON TABLE course_completion TYPE string;
DEFINE FIELD score_percent ON TABLE course_completion TYPE int;
DEFINE FIELD passed ON TABLE course_completion TYPE bool;
DEFINE FIELD completed_at ON TABLE course_completion TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_course_completion_org_user ON TABLE course_completion \
    COLUMNS organization_id, user_id;
";

/// Run all pending migrations against the database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

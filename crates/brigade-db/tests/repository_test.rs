//! Integration tests for organization, user and membership
//! repositories using in-memory SurrealDB.

use brigade_core::error::BrigadeError;
use brigade_core::models::membership::{CreateMembership, MemberRole};
use brigade_core::models::organization::CreateOrganization;
use brigade_core::models::position::{CreatePosition, PositionPermissions};
use brigade_core::models::user::{CreateUser, UserStatus};
use brigade_core::repository::{
    MembershipRepository, OrganizationRepository, PositionRepository, UserRepository,
};
use brigade_db::repository::{
    SurrealMembershipRepository, SurrealOrganizationRepository, SurrealPositionRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    brigade_db::run_migrations(&db).await.unwrap();
    db
}

async fn create_user(db: &Surreal<Db>, email: &str) -> Uuid {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            email: email.into(),
            display_name: email.split('@').next().unwrap_or(email).into(),
            password: "long-enough-password".into(),
        })
        .await
        .unwrap()
        .id
}

// -----------------------------------------------------------------------
// Organizations
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_organization_makes_owner_member() {
    let db = setup().await;
    let owner = create_user(&db, "gm@harbour.example").await;
    let orgs = SurrealOrganizationRepository::new(db.clone());
    let members = SurrealMembershipRepository::new(db.clone());

    let org = orgs
        .create(CreateOrganization {
            name: "Grand Harbour Hotel".into(),
            slug: "grand-harbour".into(),
            owner_id: owner,
        })
        .await
        .unwrap();

    assert_eq!(orgs.get_by_id(org.id).await.unwrap(), org);
    assert_eq!(org.slug, "grand-harbour");

    let membership = members.get(org.id, owner).await.unwrap();
    assert_eq!(membership.role, MemberRole::Owner);
    assert_eq!(membership.position_id, None);

    let mine = orgs.list_for_user(owner).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, org.id);
}

#[tokio::test]
async fn duplicate_organization_slug_is_rejected() {
    let db = setup().await;
    let owner = create_user(&db, "owner@example.com").await;
    let orgs = SurrealOrganizationRepository::new(db);

    let input = CreateOrganization {
        name: "Seaside".into(),
        slug: "seaside".into(),
        owner_id: owner,
    };
    orgs.create(input.clone()).await.unwrap();
    let err = orgs.create(input).await.unwrap_err();
    assert!(matches!(err, BrigadeError::AlreadyExists { .. }));
}

#[tokio::test]
async fn missing_organization_is_not_found() {
    let db = setup().await;
    let orgs = SurrealOrganizationRepository::new(db);
    let err = orgs.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, BrigadeError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------

#[tokio::test]
async fn user_round_trip_hashes_password() {
    let db = setup().await;
    let users = SurrealUserRepository::with_pepper(db, "pepper".into());

    let user = users
        .create(CreateUser {
            email: "chef@example.com".into(),
            display_name: "Chef".into(),
            password: "mise-en-place-123".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.status, UserStatus::Active);
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_ne!(user.password_hash, "mise-en-place-123");

    let by_email = users.get_by_email("chef@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(users.get_by_id(user.id).await.unwrap().email, "chef@example.com");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let db = setup().await;
    create_user(&db, "dup@example.com").await;
    let err = SurrealUserRepository::new(db)
        .create(CreateUser {
            email: "dup@example.com".into(),
            display_name: "Other".into(),
            password: "another-password".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BrigadeError::AlreadyExists { .. }));
}

// -----------------------------------------------------------------------
// Memberships
// -----------------------------------------------------------------------

#[tokio::test]
async fn list_members_joins_profiles() {
    let db = setup().await;
    let owner = create_user(&db, "owner@example.com").await;
    let waiter = create_user(&db, "waiter@example.com").await;
    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Bistro".into(),
            slug: "bistro".into(),
            owner_id: owner,
        })
        .await
        .unwrap();
    let members = SurrealMembershipRepository::new(db.clone());

    members
        .add(CreateMembership {
            organization_id: org.id,
            user_id: waiter,
            role: MemberRole::Staff,
        })
        .await
        .unwrap();

    let listed = members.list_members(org.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    let w = listed.iter().find(|m| m.user_id == waiter).unwrap();
    assert_eq!(w.email, "waiter@example.com");
    assert_eq!(w.role, MemberRole::Staff);

    let promoted = members
        .update_role(org.id, waiter, MemberRole::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, MemberRole::Admin);

    let err = members
        .add(CreateMembership {
            organization_id: org.id,
            user_id: waiter,
            role: MemberRole::Staff,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BrigadeError::AlreadyExists { .. }));
}

#[tokio::test]
async fn removing_member_vacates_position() {
    let db = setup().await;
    let owner = create_user(&db, "owner@example.com").await;
    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Inn".into(),
            slug: "inn".into(),
            owner_id: owner,
        })
        .await
        .unwrap();
    let positions = SurrealPositionRepository::new(db.clone());
    let members = SurrealMembershipRepository::new(db.clone());

    let gm = positions
        .create(CreatePosition {
            organization_id: org.id,
            title: "General Manager".into(),
            department_id: "management".into(),
            parent_id: None,
            level: 0,
            is_open: true,
            permissions: PositionPermissions::default(),
        })
        .await
        .unwrap();
    positions.assign_occupant(org.id, gm.id, owner).await.unwrap();

    members.remove(org.id, owner).await.unwrap();

    let gm = positions.get_by_id(org.id, gm.id).await.unwrap();
    assert!(gm.is_vacant());
    assert!(matches!(
        members.get(org.id, owner).await.unwrap_err(),
        BrigadeError::NotFound { .. }
    ));
    assert!(matches!(
        members.remove(org.id, owner).await.unwrap_err(),
        BrigadeError::NotFound { .. }
    ));
}

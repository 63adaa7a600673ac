//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    brigade_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "organization",
        "user",
        "membership",
        "department",
        "position_title",
        "position",
        "channel",
        "subscription",
        "course",
        "course_completion",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    brigade_db::run_migrations(&db).await.unwrap();
    brigade_db::run_migrations(&db).await.unwrap();

    let mut result = db
        .query("SELECT VALUE version FROM _migration")
        .await
        .unwrap();
    let versions: Vec<i64> = result.take(0).unwrap();
    assert_eq!(versions, vec![1]);
}

#[tokio::test]
async fn db_manager_connects_to_embedded_store() {
    let config = brigade_db::DbConfig {
        namespace: "test".into(),
        database: "manager".into(),
        ..Default::default()
    };
    let manager = brigade_db::DbManager::connect(&config).await.unwrap();
    assert_eq!(manager.kind(), brigade_db::StoreKind::Embedded);
    manager.migrate().await.unwrap();

    let mut result = manager.client().query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    assert!(format!("{:?}", info).contains("position"));
}

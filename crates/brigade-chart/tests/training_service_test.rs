//! Integration tests for channels, courses, the feed and quiz attempts.

use brigade_chart::{NewChannel, NewCourse, TrainingService};
use brigade_core::context::AppContext;
use brigade_core::error::BrigadeError;
use brigade_core::models::course::{Lesson, QuizQuestion};
use brigade_core::models::membership::MemberRole;
use brigade_db::repository::{SurrealChannelRepository, SurrealCourseRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Training = TrainingService<SurrealChannelRepository<Db>, SurrealCourseRepository<Db>>;

async fn setup() -> (Training, AppContext, AppContext) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    brigade_db::run_migrations(&db).await.unwrap();

    let service = TrainingService::new(
        SurrealChannelRepository::new(db.clone()),
        SurrealCourseRepository::new(db),
    );
    let organization_id = Uuid::new_v4();
    let admin = AppContext {
        organization_id,
        user_id: Uuid::new_v4(),
        role: MemberRole::Admin,
    };
    let staff = AppContext {
        organization_id,
        user_id: Uuid::new_v4(),
        role: MemberRole::Staff,
    };
    (service, admin, staff)
}

fn channel(name: &str) -> NewChannel {
    NewChannel {
        name: name.into(),
        description: String::new(),
    }
}

fn course(channel_id: Uuid, title: &str) -> NewCourse {
    NewCourse {
        channel_id,
        title: title.into(),
        description: "Front desk basics".into(),
        lessons: vec![Lesson {
            title: "Greeting guests".into(),
            video_url: None,
            questions: vec![
                QuizQuestion {
                    prompt: "First thing to say?".into(),
                    options: vec!["Welcome".into(), "Next".into()],
                    correct_option: 0,
                },
                QuizQuestion {
                    prompt: "Offer help with luggage?".into(),
                    options: vec!["No".into(), "Yes".into()],
                    correct_option: 1,
                },
            ],
        }],
        pass_mark_percent: 80,
    }
}

#[tokio::test]
async fn staff_cannot_publish() {
    let (service, admin, staff) = setup().await;
    let err = service.create_channel(&staff, channel("Bar")).await.unwrap_err();
    assert!(matches!(err, BrigadeError::AuthorizationDenied { .. }));

    let bar = service.create_channel(&admin, channel("Bar")).await.unwrap();
    let err = service
        .create_course(&staff, course(bar.id, "Cocktails"))
        .await
        .unwrap_err();
    assert!(matches!(err, BrigadeError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn courses_need_an_existing_channel_and_valid_content() {
    let (service, admin, _) = setup().await;
    let err = service
        .create_course(&admin, course(Uuid::new_v4(), "Orphan"))
        .await
        .unwrap_err();
    assert!(matches!(err, BrigadeError::NotFound { .. }));

    let lobby = service.create_channel(&admin, channel("Lobby")).await.unwrap();
    let mut empty = course(lobby.id, "Empty");
    empty.lessons.clear();
    let err = service.create_course(&admin, empty).await.unwrap_err();
    assert!(matches!(err, BrigadeError::Validation { .. }));

    let err = service.create_channel(&admin, channel("  ")).await.unwrap_err();
    assert!(matches!(err, BrigadeError::Validation { .. }));
}

#[tokio::test]
async fn feed_follows_subscriptions() {
    let (service, admin, staff) = setup().await;
    let lobby = service.create_channel(&admin, channel("Lobby")).await.unwrap();
    let spa = service.create_channel(&admin, channel("Spa")).await.unwrap();
    let check_in = service
        .create_course(&admin, course(lobby.id, "Check-in"))
        .await
        .unwrap();
    service
        .create_course(&admin, course(spa.id, "Treatments"))
        .await
        .unwrap();

    assert!(service.feed(&staff).await.unwrap().is_empty());

    service.subscribe(&staff, lobby.id).await.unwrap();
    service.subscribe(&staff, lobby.id).await.unwrap();
    let feed = service.feed(&staff).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, check_in.id);

    service.unsubscribe(&staff, lobby.id).await.unwrap();
    assert!(service.feed(&staff).await.unwrap().is_empty());

    let err = service.subscribe(&staff, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, BrigadeError::NotFound { .. }));
}

#[tokio::test]
async fn attempts_are_graded_and_recorded() {
    let (service, admin, staff) = setup().await;
    let lobby = service.create_channel(&admin, channel("Lobby")).await.unwrap();
    let course = service
        .create_course(&admin, course(lobby.id, "Check-in"))
        .await
        .unwrap();

    let failed = service
        .submit_attempt(&staff, course.id, &[Some(0)])
        .await
        .unwrap();
    assert_eq!(failed.grade.score_percent, 50);
    assert!(!failed.grade.passed);

    let passed = service
        .submit_attempt(&staff, course.id, &[Some(0), Some(1)])
        .await
        .unwrap();
    assert_eq!(passed.grade.score_percent, 100);
    assert!(passed.completion.passed);

    let err = service
        .submit_attempt(&staff, course.id, &[Some(0), Some(1), Some(0)])
        .await
        .unwrap_err();
    assert!(matches!(err, BrigadeError::Validation { .. }));

    let completions = service.completions(&staff).await.unwrap();
    assert_eq!(completions.len(), 2);
    assert!(service.completions(&admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn course_listing_by_channel() {
    let (service, admin, _) = setup().await;
    let lobby = service.create_channel(&admin, channel("Lobby")).await.unwrap();
    let spa = service.create_channel(&admin, channel("Spa")).await.unwrap();
    service
        .create_course(&admin, course(lobby.id, "Check-in"))
        .await
        .unwrap();
    service
        .create_course(&admin, course(spa.id, "Treatments"))
        .await
        .unwrap();

    assert_eq!(service.list_courses(&admin, None).await.unwrap().len(), 2);
    let spa_courses = service.list_courses(&admin, Some(spa.id)).await.unwrap();
    assert_eq!(spa_courses.len(), 1);
    assert_eq!(spa_courses[0].title, "Treatments");

    service.delete_channel(&admin, spa.id).await.unwrap();
    assert_eq!(service.list_channels(&admin).await.unwrap().len(), 1);
    assert_eq!(service.list_courses(&admin, None).await.unwrap().len(), 1);
}

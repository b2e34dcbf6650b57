//! Integration tests for `Repository` against an in-memory database.

use crate::db::models::*;
use crate::db::{DbPool, Repository};
use crate::errors::AppError;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, Schema};
use uuid::Uuid;

async fn repository() -> Repository {
    // A pool would hand each connection its own :memory: database
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);

    let db = Database::connect(opts).await.expect("in-memory database");

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    db.execute(backend.build(&schema.create_table_from_entity(AppUserEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(CandidateEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(BioItemEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(SkillEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(CandidateSkillEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(ProjectEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(CandidateProjectEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(ContactTypeEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(ContactEntity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(RequestLogEntity)))
        .await
        .unwrap();

    Repository::new(DbPool {
        primary: db,
        replica: None,
    })
}

// ─── Candidates ──────────────────────────────────────────────────────────

#[tokio::test]
async fn candidate_crud() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Micah".into(), "Smith".into(), None)
        .await
        .unwrap();
    assert_eq!(candidate.first_name, "Micah");

    let fetched = repo.get_candidate(candidate.id).await.unwrap();
    assert_eq!(fetched.last_name, "Smith");

    let updated = repo
        .update_candidate(candidate.id, "Updated Micah".into(), "Smith".into())
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Updated Micah");

    assert!(repo.delete_candidate(candidate.id).await.unwrap());
    assert!(matches!(
        repo.get_candidate(candidate.id).await,
        Err(AppError::CandidateNotFound { .. })
    ));
}

#[tokio::test]
async fn missing_candidate_is_not_found() {
    let repo = repository().await;
    assert!(matches!(
        repo.candidate_summary(Uuid::new_v4()).await,
        Err(AppError::CandidateNotFound { .. })
    ));
}

// ─── Bio uniqueness ──────────────────────────────────────────────────────

#[tokio::test]
async fn second_bio_fails_validation_and_leaves_first_intact() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();

    repo.create_bio_item(candidate.id, "A seasoned software engineer.".into())
        .await
        .unwrap();

    let err = repo
        .create_bio_item(candidate.id, "A different bio.".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let bio = repo
        .find_bio_by_candidate_id(candidate.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bio.bio, "A seasoned software engineer.");
}

// ─── Orphan cleanup ──────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_last_skill_link_removes_skill() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();
    let skill = repo.create_skill("Python".into()).await.unwrap();
    let link = repo
        .create_candidate_skill(candidate.id, skill.id)
        .await
        .unwrap();

    let skill_removed = repo.delete_candidate_skill(link.id).await.unwrap();

    assert!(skill_removed);
    assert!(repo.find_skill_by_id(skill.id).await.unwrap().is_none());
    assert!(repo
        .find_candidate_skill_by_id(link.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn shared_skill_survives_link_deletion() {
    let repo = repository().await;

    let jane = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();
    let john = repo
        .create_candidate("John".into(), "Doe".into(), None)
        .await
        .unwrap();
    let skill = repo.create_skill("Python".into()).await.unwrap();

    let jane_link = repo.create_candidate_skill(jane.id, skill.id).await.unwrap();
    let john_link = repo.create_candidate_skill(john.id, skill.id).await.unwrap();

    assert!(!repo.delete_candidate_skill(jane_link.id).await.unwrap());
    assert!(repo.find_skill_by_id(skill.id).await.unwrap().is_some());

    assert!(repo.delete_candidate_skill(john_link.id).await.unwrap());
    assert!(repo.find_skill_by_id(skill.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_last_project_link_removes_project() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();
    let project = repo
        .create_project("Test Project".into(), "A test project description.".into())
        .await
        .unwrap();
    let link = repo
        .create_candidate_project(candidate.id, project.id)
        .await
        .unwrap();

    assert!(repo.delete_candidate_project(link.id).await.unwrap());
    assert!(repo.find_project_by_id(project.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_missing_association_is_not_found() {
    let repo = repository().await;

    assert!(matches!(
        repo.delete_candidate_skill(Uuid::new_v4()).await,
        Err(AppError::AssociationNotFound { .. })
    ));
    assert!(matches!(
        repo.delete_candidate_project(Uuid::new_v4()).await,
        Err(AppError::AssociationNotFound { .. })
    ));
}

// ─── Uniqueness ──────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_skill_name_conflicts() {
    let repo = repository().await;

    repo.create_skill("Python".into()).await.unwrap();
    assert!(matches!(
        repo.create_skill("Python".into()).await,
        Err(AppError::Duplicate { .. })
    ));
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let repo = repository().await;

    repo.create_user("test_user".into(), "hash".into())
        .await
        .unwrap();
    assert!(matches!(
        repo.create_user("test_user".into(), "other-hash".into()).await,
        Err(AppError::Duplicate { .. })
    ));
}

// ─── Contacts ────────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_values_validate_against_type() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();
    let email_type = repo.create_contact_type("Email".into()).await.unwrap();
    let unknown_type = repo.create_contact_type("Telegram".into()).await.unwrap();

    assert!(matches!(
        repo.create_contact(candidate.id, email_type.id, "not-an-email".into())
            .await,
        Err(AppError::Validation { .. })
    ));

    let contact = repo
        .create_contact(candidate.id, email_type.id, "jane.doe@example.com".into())
        .await
        .unwrap();
    assert_eq!(contact.value, "jane.doe@example.com");

    // Unknown type names skip format validation
    repo.create_contact(candidate.id, unknown_type.id, "@janedoe".into())
        .await
        .unwrap();

    // Contact values are globally unique
    assert!(matches!(
        repo.create_contact(candidate.id, email_type.id, "jane.doe@example.com".into())
            .await,
        Err(AppError::Duplicate { .. })
    ));
}

#[tokio::test]
async fn contact_with_unknown_type_id_fails() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();

    assert!(matches!(
        repo.create_contact(candidate.id, Uuid::new_v4(), "jane@example.com".into())
            .await,
        Err(AppError::ContactTypeNotFound { .. })
    ));
}

// ─── Summary assembly ────────────────────────────────────────────────────

#[tokio::test]
async fn summary_matches_expected_shape() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();
    let skill = repo.create_skill("Python".into()).await.unwrap();
    repo.create_candidate_skill(candidate.id, skill.id)
        .await
        .unwrap();

    let summary = repo.candidate_summary(candidate.id).await.unwrap();

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["first_name"], "Jane");
    assert_eq!(value["last_name"], "Doe");
    assert_eq!(value["skills"], serde_json::json!(["Python"]));
    assert_eq!(value["bio"], serde_json::Value::Null);
    assert_eq!(value["projects"], serde_json::json!([]));
    assert_eq!(value["contacts"], serde_json::json!([]));
}

#[tokio::test]
async fn summary_deduplicates_join_rows() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();
    let skill = repo.create_skill("Python".into()).await.unwrap();
    let project = repo
        .create_project("Test Project".into(), "A test project description.".into())
        .await
        .unwrap();

    // Duplicated association rows must collapse to one entry each
    repo.create_candidate_skill(candidate.id, skill.id)
        .await
        .unwrap();
    repo.create_candidate_skill(candidate.id, skill.id)
        .await
        .unwrap();
    repo.create_candidate_project(candidate.id, project.id)
        .await
        .unwrap();
    repo.create_candidate_project(candidate.id, project.id)
        .await
        .unwrap();

    let summary = repo.candidate_summary(candidate.id).await.unwrap();

    assert_eq!(summary.skills, vec!["Python".to_string()]);
    assert_eq!(summary.projects.len(), 1);
    assert_eq!(summary.projects[0].name, "Test Project");
}

#[tokio::test]
async fn summary_includes_bio_and_typed_contacts() {
    let repo = repository().await;

    let candidate = repo
        .create_candidate("Jane".into(), "Doe".into(), None)
        .await
        .unwrap();
    repo.create_bio_item(candidate.id, "A seasoned software engineer.".into())
        .await
        .unwrap();

    let email_type = repo.create_contact_type("Email".into()).await.unwrap();
    repo.create_contact(candidate.id, email_type.id, "jane.doe@example.com".into())
        .await
        .unwrap();

    let summary = repo.candidate_summary(candidate.id).await.unwrap();

    assert_eq!(summary.bio.as_deref(), Some("A seasoned software engineer."));
    assert_eq!(summary.contacts.len(), 1);
    assert_eq!(summary.contacts[0].contact_type, "Email");
    assert_eq!(summary.contacts[0].value, "jane.doe@example.com");
}

// ─── Request log ─────────────────────────────────────────────────────────

#[tokio::test]
async fn request_log_appends_and_lists_newest_first() {
    let repo = repository().await;

    repo.insert_request_log(
        "GET".into(),
        "/api/candidates".into(),
        None,
        Some("203.0.113.7".into()),
        Some("curl/8.0".into()),
        None,
    )
    .await
    .unwrap();

    repo.insert_request_log(
        "POST".into(),
        "/api/skills".into(),
        Some("offset=0".into()),
        None,
        None,
        None,
    )
    .await
    .unwrap();

    let (logs, total) = repo.list_request_logs(0, 10).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|l| l.path == "/api/candidates"));
    assert!(logs.iter().any(|l| l.path == "/api/skills"));
}

//! Integration tests for Group, Role and Project repositories.

use demo_core::error::DemoError;
use demo_core::models::group::CreateGroup;
use demo_core::models::project::CreateProject;
use demo_core::models::role::CreateRole;
use demo_core::models::user::{CreateUser, User};
use demo_core::repository::{
    GroupRepository, ProjectRepository, RoleRepository, UserRepository,
};
use demo_db::repository::{
    SurrealGroupRepository, SurrealProjectRepository, SurrealRoleRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    demo_db::run_migrations(&db).await.unwrap();
    db
}

async fn user(db: &Surreal<Db>, name: &str) -> User {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: None,
        })
        .await
        .unwrap()
}

async fn group(db: &Surreal<Db>, name: &str) -> Uuid {
    SurrealGroupRepository::new(db.clone())
        .create(CreateGroup { name: name.into() })
        .await
        .unwrap()
        .id
}

// -----------------------------------------------------------------------
// Groups
// -----------------------------------------------------------------------

#[tokio::test]
async fn grant_member_and_admin() {
    let db = setup().await;
    let repo = SurrealGroupRepository::new(db.clone());
    let alice = user(&db, "Alice").await;
    let carol = user(&db, "Carol").await;
    let engineers = group(&db, "Engineers").await;

    repo.grant_member(engineers, alice.id).await.unwrap();
    repo.grant_admin(engineers, carol.id).await.unwrap();

    let g = repo.get_by_id(engineers).await.unwrap();
    assert_eq!(g.members, vec![alice.id]);
    assert_eq!(g.admins, vec![carol.id]);
}

#[tokio::test]
async fn granting_twice_stores_one_row() {
    let db = setup().await;
    let repo = SurrealGroupRepository::new(db.clone());
    let alice = user(&db, "Alice").await;
    let engineers = group(&db, "Engineers").await;

    repo.grant_member(engineers, alice.id).await.unwrap();
    repo.grant_member(engineers, alice.id).await.unwrap();

    let g = repo.get_by_id(engineers).await.unwrap();
    assert_eq!(g.members, vec![alice.id]);
}

#[tokio::test]
async fn revoke_member_keeps_admin_role() {
    let db = setup().await;
    let repo = SurrealGroupRepository::new(db.clone());
    let carol = user(&db, "Carol").await;
    let engineers = group(&db, "Engineers").await;

    repo.grant_member(engineers, carol.id).await.unwrap();
    repo.grant_admin(engineers, carol.id).await.unwrap();
    repo.revoke_member(engineers, carol.id).await.unwrap();

    let g = repo.get_by_id(engineers).await.unwrap();
    assert!(g.members.is_empty());
    assert_eq!(g.admins, vec![carol.id]);
}

#[tokio::test]
async fn revoking_a_non_member_is_a_no_op() {
    let db = setup().await;
    let repo = SurrealGroupRepository::new(db.clone());
    let alice = user(&db, "Alice").await;
    let engineers = group(&db, "Engineers").await;

    repo.revoke_member(engineers, alice.id).await.unwrap();
    repo.revoke_admin(engineers, alice.id).await.unwrap();
}

#[tokio::test]
async fn membership_requires_existing_group_and_user() {
    let db = setup().await;
    let repo = SurrealGroupRepository::new(db.clone());
    let alice = user(&db, "Alice").await;
    let engineers = group(&db, "Engineers").await;

    let err = repo.grant_member(Uuid::new_v4(), alice.id).await.unwrap_err();
    assert!(matches!(err, DemoError::NotFound { ref entity, .. } if entity == "group"));

    let err = repo.grant_admin(engineers, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DemoError::NotFound { ref entity, .. } if entity == "user"));
}

#[tokio::test]
async fn group_id_is_not_a_valid_member() {
    let db = setup().await;
    let repo = SurrealGroupRepository::new(db.clone());
    let engineers = group(&db, "Engineers").await;
    let sales = group(&db, "Sales").await;

    let err = repo.grant_member(engineers, sales).await.unwrap_err();
    assert!(matches!(err, DemoError::NotFound { .. }));
}

#[tokio::test]
async fn list_groups_attaches_memberships() {
    let db = setup().await;
    let repo = SurrealGroupRepository::new(db.clone());
    let alice = user(&db, "Alice").await;
    let dan = user(&db, "Dan").await;
    let engineers = group(&db, "Engineers").await;
    let sales = group(&db, "Sales").await;

    repo.grant_member(engineers, alice.id).await.unwrap();
    repo.grant_member(sales, dan.id).await.unwrap();

    let groups = repo.list().await.unwrap();
    assert_eq!(groups.len(), 2);
    let eng = groups.iter().find(|g| g.id == engineers).unwrap();
    let sal = groups.iter().find(|g| g.id == sales).unwrap();
    assert_eq!(eng.members, vec![alice.id]);
    assert_eq!(sal.members, vec![dan.id]);
}

#[tokio::test]
async fn duplicate_group_name_is_rejected() {
    let db = setup().await;
    group(&db, "Engineers").await;

    let err = SurrealGroupRepository::new(db)
        .create(CreateGroup {
            name: "Engineers".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DemoError::AlreadyExists { .. }));
}

#[tokio::test]
async fn concurrent_group_creates_never_leak_database_errors() {
    let db = setup().await;
    let first = SurrealGroupRepository::new(db.clone());
    let second = SurrealGroupRepository::new(db.clone());

    for round in 0..20 {
        let name = format!("Team {round}");
        let (a, b) = tokio::join!(
            first.create(CreateGroup { name: name.clone() }),
            second.create(CreateGroup { name: name.clone() }),
        );
        let failures: Vec<DemoError> = [a, b].into_iter().filter_map(Result::err).collect();
        assert!(!failures.is_empty(), "round {round}: both writers created {name}");
        for err in failures {
            assert!(
                matches!(err, DemoError::AlreadyExists { .. }),
                "round {round}: unexpected error {err:?}"
            );
        }
    }
}

// -----------------------------------------------------------------------
// Roles
// -----------------------------------------------------------------------

#[tokio::test]
async fn role_direct_and_group_assignments() {
    let db = setup().await;
    let roles = SurrealRoleRepository::new(db.clone());
    let frank = user(&db, "Frank").await;
    let engineers = group(&db, "Engineers").await;

    let editor = roles
        .create(CreateRole {
            name: "Editor".into(),
        })
        .await
        .unwrap();
    roles.grant(frank.id, editor.id).await.unwrap();
    roles.grant(frank.id, editor.id).await.unwrap();
    roles.assign_group(editor.id, engineers).await.unwrap();

    let editor = roles.get_by_id(editor.id).await.unwrap();
    assert_eq!(editor.direct_assignments, vec![frank.id]);
    assert_eq!(editor.group_assignments, vec![engineers]);

    roles.revoke(frank.id, editor.id).await.unwrap();
    let editor = roles.get_by_id(editor.id).await.unwrap();
    assert!(editor.direct_assignments.is_empty());
    assert_eq!(editor.group_assignments, vec![engineers]);
}

#[tokio::test]
async fn role_grant_requires_existing_records() {
    let db = setup().await;
    let roles = SurrealRoleRepository::new(db.clone());
    let frank = user(&db, "Frank").await;

    let err = roles.grant(frank.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DemoError::NotFound { ref entity, .. } if entity == "role"));

    let reader = roles
        .create(CreateRole {
            name: "Reader".into(),
        })
        .await
        .unwrap();
    let err = roles.assign_group(reader.id, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DemoError::NotFound { ref entity, .. } if entity == "group"));
}

// -----------------------------------------------------------------------
// Projects
// -----------------------------------------------------------------------

#[tokio::test]
async fn project_owner_and_groups() {
    let db = setup().await;
    let projects = SurrealProjectRepository::new(db.clone());
    let bob = user(&db, "Bob").await;
    let engineers = group(&db, "Engineers").await;

    let product = projects
        .create(CreateProject {
            name: "Product X".into(),
            owner: bob.id,
        })
        .await
        .unwrap();
    assert_eq!(product.owner, bob.id);

    projects.assign_group(product.id, engineers).await.unwrap();
    projects.assign_group(product.id, engineers).await.unwrap();

    let listed = projects.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].group_assignments, vec![engineers]);
}

#[tokio::test]
async fn project_owner_must_exist() {
    let db = setup().await;
    let err = SurrealProjectRepository::new(db)
        .create(CreateProject {
            name: "Orphan".into(),
            owner: Uuid::new_v4(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DemoError::NotFound { ref entity, .. } if entity == "user"));
}

//! Integration tests for demo data seeding and the grants it produces.

use std::collections::HashSet;

use demo_core::access::{
    DerivedGrant, EntitlementSlug, group_grants, resolve_project_grants, resolve_role_grants,
};
use demo_core::error::DemoError;
use demo_core::repository::{
    CredentialRepository, GroupRepository, ProjectRepository, RoleRepository, UserRepository,
};
use demo_db::repository::{
    SurrealCredentialRepository, SurrealGroupRepository, SurrealProjectRepository,
    SurrealRoleRepository, SurrealUserRepository,
};
use demo_db::seed::{SEED_PASSWORD, ids, seed};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn seeded() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    demo_db::run_migrations(&db).await.unwrap();
    assert!(seed(&db, None).await.unwrap());
    db
}

fn as_set(grants: Vec<DerivedGrant>) -> HashSet<DerivedGrant> {
    let len = grants.len();
    let set: HashSet<_> = grants.into_iter().collect();
    assert_eq!(set.len(), len, "derived grants contain duplicates");
    set
}

#[tokio::test]
async fn seeding_twice_inserts_once() {
    let db = seeded().await;
    assert!(!seed(&db, None).await.unwrap());

    let users = SurrealUserRepository::new(db).list().await.unwrap();
    assert_eq!(users.len(), 5);
}

#[tokio::test]
async fn seeded_users_share_the_demo_password() {
    let db = seeded().await;
    let creds = SurrealCredentialRepository::new(db.clone());

    for user in SurrealUserRepository::new(db).list().await.unwrap() {
        assert!(creds.verify_password(user.id, SEED_PASSWORD).await.unwrap());
        assert_eq!(user.email, format!("{}@example.com", user.name.to_lowercase()));
    }
}

#[tokio::test]
async fn engineers_group_grants() {
    let db = seeded().await;
    let engineers = SurrealGroupRepository::new(db)
        .get_by_id(ids::ENGINEERS)
        .await
        .unwrap();

    let expected: HashSet<_> = [
        DerivedGrant::user(EntitlementSlug::Admin, ids::CAROL),
        DerivedGrant::user(EntitlementSlug::Member, ids::CAROL),
        DerivedGrant::user(EntitlementSlug::Member, ids::ALICE),
        DerivedGrant::user(EntitlementSlug::Member, ids::BOB),
    ]
    .into_iter()
    .collect();
    assert_eq!(as_set(group_grants(&engineers)), expected);
}

#[tokio::test]
async fn reader_role_expands_both_groups() {
    let db = seeded().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let reader = SurrealRoleRepository::new(db)
        .get_by_id(ids::READER)
        .await
        .unwrap();

    let grants = as_set(resolve_role_grants(&groups, &reader).await.unwrap());

    let expected: HashSet<_> = [ids::ALICE, ids::BOB, ids::CAROL, ids::DAN, ids::FRANK]
        .into_iter()
        .map(|u| DerivedGrant::user(EntitlementSlug::Assignment, u))
        .collect();
    assert_eq!(grants, expected);
}

#[tokio::test]
async fn editor_role_combines_direct_and_group_users() {
    let db = seeded().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let editor = SurrealRoleRepository::new(db)
        .get_by_id(ids::EDITOR)
        .await
        .unwrap();

    let grants = as_set(resolve_role_grants(&groups, &editor).await.unwrap());

    let expected: HashSet<_> = [ids::FRANK, ids::CAROL, ids::ALICE, ids::BOB]
        .into_iter()
        .map(|u| DerivedGrant::user(EntitlementSlug::Assignment, u))
        .collect();
    assert_eq!(grants, expected);
}

#[tokio::test]
async fn sales_project_grants_owner_and_group_access() {
    let db = seeded().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let project = SurrealProjectRepository::new(db)
        .get_by_id(ids::SALES_PROJECT)
        .await
        .unwrap();

    let grants = as_set(resolve_project_grants(&groups, &project).await.unwrap());

    let expected: HashSet<_> = [
        DerivedGrant::user(EntitlementSlug::Owner, ids::FRANK),
        DerivedGrant::group(EntitlementSlug::Access, ids::SALES),
        DerivedGrant::user(EntitlementSlug::Access, ids::FRANK),
        DerivedGrant::user(EntitlementSlug::Access, ids::DAN),
    ]
    .into_iter()
    .collect();
    assert_eq!(grants, expected);
}

#[tokio::test]
async fn product_x_is_owned_by_bob() {
    let db = seeded().await;
    let product = SurrealProjectRepository::new(db)
        .get_by_id(ids::PRODUCT_X)
        .await
        .unwrap();

    assert_eq!(product.name, "Product X");
    assert_eq!(product.owner, ids::BOB);
    let groups: HashSet<_> = product.group_assignments.into_iter().collect();
    assert_eq!(groups, HashSet::from([ids::ENGINEERS, ids::SALES]));
}

/// Remove a group row while leaving the role and project links to it.
async fn orphan_group(db: &Surreal<Db>, id: uuid::Uuid) {
    db.query("DELETE type::record('group', $id)")
        .bind(("id", id.to_string()))
        .await
        .unwrap()
        .check()
        .unwrap();
}

#[tokio::test]
async fn role_with_missing_group_fails_whole_derivation() {
    let db = seeded().await;
    orphan_group(&db, ids::SALES).await;

    let groups = SurrealGroupRepository::new(db.clone());
    let reader = SurrealRoleRepository::new(db)
        .get_by_id(ids::READER)
        .await
        .unwrap();
    assert!(reader.group_assignments.contains(&ids::SALES));

    let err = resolve_role_grants(&groups, &reader).await.unwrap_err();
    match err {
        DemoError::NotFound { entity, id } => {
            assert_eq!(entity, "group");
            assert_eq!(id, ids::SALES.to_string());
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn project_with_missing_group_fails_whole_derivation() {
    let db = seeded().await;
    orphan_group(&db, ids::SALES).await;

    let groups = SurrealGroupRepository::new(db.clone());
    let project = SurrealProjectRepository::new(db)
        .get_by_id(ids::SALES_PROJECT)
        .await
        .unwrap();

    let err = resolve_project_grants(&groups, &project).await.unwrap_err();
    assert!(matches!(err, DemoError::NotFound { ref entity, .. } if entity == "group"));
}

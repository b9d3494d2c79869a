//! One-time demo data population.
//!
//! The dataset is written in a single transaction together with a
//! `_seed:initial` marker, so a database is either fully seeded or not at
//! all, and seeding an already seeded database does nothing.
//!
//! ```text
//! Engineers  admins: Carol        members: Alice, Bob
//! Sales      admins: Frank        members: Dan
//! Editor     direct: Frank        groups:  Engineers
//! Reader     direct: -            groups:  Engineers, Sales
//! Product X  owner:  Bob          groups:  Engineers, Sales
//! Sales      owner:  Frank        groups:  Sales
//! ```

use serde_json::{Value, json};
use surrealdb::{Connection, Surreal};
use tracing::info;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{CountRow, hash_password, pair_key};

/// Password given to every seeded user.
pub const SEED_PASSWORD: &str = "password";

const fn seed_id(n: u128) -> Uuid {
    Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0000 | n)
}

/// Fixed identifiers of the seeded records.
pub mod ids {
    use uuid::Uuid;

    use super::seed_id;

    pub const ALICE: Uuid = seed_id(0x01);
    pub const BOB: Uuid = seed_id(0x02);
    pub const CAROL: Uuid = seed_id(0x03);
    pub const DAN: Uuid = seed_id(0x04);
    pub const FRANK: Uuid = seed_id(0x05);

    pub const ENGINEERS: Uuid = seed_id(0x101);
    pub const SALES: Uuid = seed_id(0x102);

    pub const EDITOR: Uuid = seed_id(0x201);
    pub const READER: Uuid = seed_id(0x202);

    pub const PRODUCT_X: Uuid = seed_id(0x301);
    pub const SALES_PROJECT: Uuid = seed_id(0x302);
}

const USERS: &[(Uuid, &str, &str)] = &[
    (ids::ALICE, "Alice", "alice@example.com"),
    (ids::BOB, "Bob", "bob@example.com"),
    (ids::CAROL, "Carol", "carol@example.com"),
    (ids::DAN, "Dan", "dan@example.com"),
    (ids::FRANK, "Frank", "frank@example.com"),
];

const GROUPS: &[(Uuid, &str)] = &[(ids::ENGINEERS, "Engineers"), (ids::SALES, "Sales")];

/// (group, user)
const GROUP_ADMINS: &[(Uuid, Uuid)] = &[(ids::ENGINEERS, ids::CAROL), (ids::SALES, ids::FRANK)];

/// (group, user)
const GROUP_MEMBERS: &[(Uuid, Uuid)] = &[
    (ids::ENGINEERS, ids::ALICE),
    (ids::ENGINEERS, ids::BOB),
    (ids::SALES, ids::DAN),
];

const ROLES: &[(Uuid, &str)] = &[(ids::EDITOR, "Editor"), (ids::READER, "Reader")];

/// (role, user)
const ROLE_USERS: &[(Uuid, Uuid)] = &[(ids::EDITOR, ids::FRANK)];

/// (role, group)
const ROLE_GROUPS: &[(Uuid, Uuid)] = &[
    (ids::EDITOR, ids::ENGINEERS),
    (ids::READER, ids::ENGINEERS),
    (ids::READER, ids::SALES),
];

/// (project, name, owner)
const PROJECTS: &[(Uuid, &str, Uuid)] = &[
    (ids::PRODUCT_X, "Product X", ids::BOB),
    (ids::SALES_PROJECT, "Sales", ids::FRANK),
];

/// (project, group)
const PROJECT_GROUPS: &[(Uuid, Uuid)] = &[
    (ids::PRODUCT_X, ids::ENGINEERS),
    (ids::PRODUCT_X, ids::SALES),
    (ids::SALES_PROJECT, ids::SALES),
];

const SEED_SQL: &str = "\
BEGIN TRANSACTION;
FOR $u IN $users {
    CREATE type::record('user', $u.id) SET name = $u.name, email = $u.email;
};
FOR $p IN $passwords {
    CREATE type::record('password', $p.user_id) SET \
        user_id = $p.user_id, password_hash = $p.password_hash;
};
FOR $g IN $groups {
    CREATE type::record('group', $g.id) SET name = $g.name;
};
FOR $m IN $group_admins {
    CREATE type::record('group_admin', $m.key) SET \
        group_id = $m.parent, user_id = $m.child;
};
FOR $m IN $group_members {
    CREATE type::record('group_member', $m.key) SET \
        group_id = $m.parent, user_id = $m.child;
};
FOR $r IN $roles {
    CREATE type::record('role', $r.id) SET name = $r.name;
};
FOR $a IN $role_users {
    CREATE type::record('role_user', $a.key) SET \
        role_id = $a.parent, user_id = $a.child;
};
FOR $a IN $role_groups {
    CREATE type::record('role_group', $a.key) SET \
        role_id = $a.parent, group_id = $a.child;
};
FOR $p IN $projects {
    CREATE type::record('project', $p.id) SET name = $p.name, owner = $p.owner;
};
FOR $a IN $project_groups {
    CREATE type::record('project_group', $a.key) SET \
        project_id = $a.parent, group_id = $a.child;
};
CREATE _seed:initial;
COMMIT TRANSACTION;
";

fn pairs(rows: &[(Uuid, Uuid)]) -> Value {
    Value::Array(
        rows.iter()
            .map(|(parent, child)| {
                json!({
                    "key": pair_key(*parent, *child),
                    "parent": parent.to_string(),
                    "child": child.to_string(),
                })
            })
            .collect(),
    )
}

fn named(rows: &[(Uuid, &str)]) -> Value {
    Value::Array(
        rows.iter()
            .map(|(id, name)| json!({ "id": id.to_string(), "name": name }))
            .collect(),
    )
}

/// Populate the demo dataset unless it has already been written.
///
/// Returns `true` when data was inserted.
pub async fn seed<C: Connection>(db: &Surreal<C>, pepper: Option<&str>) -> Result<bool, DbError> {
    let mut result = db
        .query("SELECT count() AS total FROM _seed GROUP ALL")
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
        info!("Seed data already present, skipping");
        return Ok(false);
    }

    let users: Vec<Value> = USERS
        .iter()
        .map(|(id, name, email)| json!({ "id": id.to_string(), "name": name, "email": email }))
        .collect();

    let passwords = USERS
        .iter()
        .map(|(id, _, _)| {
            Ok(json!({
                "user_id": id.to_string(),
                "password_hash": hash_password(SEED_PASSWORD, pepper)?,
            }))
        })
        .collect::<Result<Vec<Value>, DbError>>()?;

    let projects: Vec<Value> = PROJECTS
        .iter()
        .map(|(id, name, owner)| {
            json!({ "id": id.to_string(), "name": name, "owner": owner.to_string() })
        })
        .collect();

    db.query(SEED_SQL)
        .bind(("users", Value::Array(users)))
        .bind(("passwords", Value::Array(passwords)))
        .bind(("groups", named(GROUPS)))
        .bind(("group_admins", pairs(GROUP_ADMINS)))
        .bind(("group_members", pairs(GROUP_MEMBERS)))
        .bind(("roles", named(ROLES)))
        .bind(("role_users", pairs(ROLE_USERS)))
        .bind(("role_groups", pairs(ROLE_GROUPS)))
        .bind(("projects", Value::Array(projects)))
        .bind(("project_groups", pairs(PROJECT_GROUPS)))
        .await?
        .check()
        .map_err(|e| DbError::Query(format!("seeding failed: {e}")))?;

    info!(
        users = USERS.len(),
        groups = GROUPS.len(),
        roles = ROLES.len(),
        projects = PROJECTS.len(),
        "Seed data written"
    );
    Ok(true)
}

//! Access-model resolver.
//!
//! Turns the stored direct relationships (group admins and members, role
//! assignments, project ownership and group shares) into a flat list of
//! `(entitlement, principal)` pairs. Every call re-derives the result from
//! the rows it is given, so there is nothing to invalidate when membership
//! changes.
//!
//! Group expansion is one level deep. Membership rows only ever reference
//! users, so a group can never appear inside another group's member list.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DemoError, DemoResult};
use crate::models::{group::Group, project::Project, role::Role};
use crate::repository::GroupRepository;

/// Whether holding an entitlement is a plain assignment or an elevated
/// permission that implies an assignment on the same resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    Assignment,
    Permission,
}

/// Every entitlement exposed by the demo access model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementSlug {
    /// Group membership.
    Member,
    /// Group administration; implies `Member`.
    Admin,
    /// Role assignment.
    Assignment,
    /// Project access.
    Access,
    /// Project ownership; implies `Access`.
    Owner,
}

impl EntitlementSlug {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Assignment => "assignment",
            Self::Access => "access",
            Self::Owner => "owner",
        }
    }

    pub fn purpose(&self) -> EntitlementPurpose {
        match self {
            Self::Member | Self::Assignment | Self::Access => EntitlementPurpose::Assignment,
            Self::Admin | Self::Owner => EntitlementPurpose::Permission,
        }
    }
}

impl fmt::Display for EntitlementSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntitlementSlug {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "assignment" => Ok(Self::Assignment),
            "access" => Ok(Self::Access),
            "owner" => Ok(Self::Owner),
            other => Err(DemoError::Validation {
                message: format!("unknown entitlement slug: {other}"),
            }),
        }
    }
}

/// The holder of a derived grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Principal {
    User(Uuid),
    Group(Uuid),
}

/// One `(entitlement, principal)` pair on the resource being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedGrant {
    pub entitlement: EntitlementSlug,
    pub principal: Principal,
}

impl DerivedGrant {
    pub fn user(entitlement: EntitlementSlug, user_id: Uuid) -> Self {
        Self {
            entitlement,
            principal: Principal::User(user_id),
        }
    }

    pub fn group(entitlement: EntitlementSlug, group_id: Uuid) -> Self {
        Self {
            entitlement,
            principal: Principal::Group(group_id),
        }
    }
}

/// Insertion-ordered set of grants.
#[derive(Default)]
struct GrantSet {
    seen: HashSet<DerivedGrant>,
    grants: Vec<DerivedGrant>,
}

impl GrantSet {
    fn push(&mut self, grant: DerivedGrant) {
        if self.seen.insert(grant) {
            self.grants.push(grant);
        }
    }

    fn into_vec(self) -> Vec<DerivedGrant> {
        self.grants
    }
}

/// Grants on a group: every admin holds `admin` and `member`, every other
/// member holds `member`. A user listed as both admin and member is
/// emitted once per entitlement.
pub fn group_grants(group: &Group) -> Vec<DerivedGrant> {
    let mut set = GrantSet::default();
    for admin in &group.admins {
        set.push(DerivedGrant::user(EntitlementSlug::Admin, *admin));
        set.push(DerivedGrant::user(EntitlementSlug::Member, *admin));
    }
    for member in &group.members {
        set.push(DerivedGrant::user(EntitlementSlug::Member, *member));
    }
    set.into_vec()
}

/// Grants on a role. Direct assignees and every admin or member of the
/// assigned `groups` hold `assignment`; the groups themselves do not.
pub fn role_grants(role: &Role, groups: &[Group]) -> Vec<DerivedGrant> {
    let mut set = GrantSet::default();
    for user_id in &role.direct_assignments {
        set.push(DerivedGrant::user(EntitlementSlug::Assignment, *user_id));
    }
    for group in groups {
        for user_id in group.principals() {
            set.push(DerivedGrant::user(EntitlementSlug::Assignment, user_id));
        }
    }
    set.into_vec()
}

/// Grants on a project. The owner holds `owner` and `access`. Each assigned
/// group holds `access` as a principal, and so does each of its admins and
/// members individually.
pub fn project_grants(project: &Project, groups: &[Group]) -> Vec<DerivedGrant> {
    let mut set = GrantSet::default();
    set.push(DerivedGrant::user(EntitlementSlug::Owner, project.owner));
    set.push(DerivedGrant::user(EntitlementSlug::Access, project.owner));
    for group in groups {
        set.push(DerivedGrant::group(EntitlementSlug::Access, group.id));
        for user_id in group.principals() {
            set.push(DerivedGrant::user(EntitlementSlug::Access, user_id));
        }
    }
    set.into_vec()
}

/// Load every group in `ids`, failing on the first one that is missing.
pub async fn load_groups<G: GroupRepository>(groups: &G, ids: &[Uuid]) -> DemoResult<Vec<Group>> {
    let mut loaded = Vec::with_capacity(ids.len());
    for id in ids {
        loaded.push(groups.get_by_id(*id).await?);
    }
    Ok(loaded)
}

/// Load the role's groups and derive its grants.
pub async fn resolve_role_grants<G: GroupRepository>(
    groups: &G,
    role: &Role,
) -> DemoResult<Vec<DerivedGrant>> {
    let assigned = load_groups(groups, &role.group_assignments).await?;
    Ok(role_grants(role, &assigned))
}

/// Load the project's groups and derive its grants.
pub async fn resolve_project_grants<G: GroupRepository>(
    groups: &G,
    project: &Project,
) -> DemoResult<Vec<DerivedGrant>> {
    let assigned = load_groups(groups, &project.group_assignments).await?;
    Ok(project_grants(project, &assigned))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn group(name: &str, admins: Vec<Uuid>, members: Vec<Uuid>) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: name.into(),
            admins,
            members,
            created_at: Utc::now(),
        }
    }

    fn users_with(grants: &[DerivedGrant], slug: EntitlementSlug) -> HashSet<Uuid> {
        grants
            .iter()
            .filter(|g| g.entitlement == slug)
            .filter_map(|g| match g.principal {
                Principal::User(id) => Some(id),
                Principal::Group(_) => None,
            })
            .collect()
    }

    #[test]
    fn engineers_group_yields_four_grants() {
        let (carol, alice, bob) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let engineers = group("Engineers", vec![carol], vec![alice, bob]);

        let grants: HashSet<_> = group_grants(&engineers).into_iter().collect();

        let expected: HashSet<_> = [
            DerivedGrant::user(EntitlementSlug::Admin, carol),
            DerivedGrant::user(EntitlementSlug::Member, carol),
            DerivedGrant::user(EntitlementSlug::Member, alice),
            DerivedGrant::user(EntitlementSlug::Member, bob),
        ]
        .into_iter()
        .collect();
        assert_eq!(grants, expected);
    }

    #[test]
    fn member_grants_cover_every_admin() {
        let admins = vec![Uuid::new_v4(), Uuid::new_v4()];
        let g = group("Ops", admins.clone(), vec![Uuid::new_v4()]);

        let members = users_with(&group_grants(&g), EntitlementSlug::Member);
        for admin in admins {
            assert!(members.contains(&admin));
        }
    }

    #[test]
    fn admin_listed_as_member_is_not_duplicated() {
        let carol = Uuid::new_v4();
        let g = group("Ops", vec![carol], vec![carol]);

        let grants = group_grants(&g);
        assert_eq!(grants.len(), 2);
    }

    #[test]
    fn reader_role_includes_each_member_of_both_groups_once() {
        let (carol, alice, bob) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (frank, dan) = (Uuid::new_v4(), Uuid::new_v4());
        let engineers = group("Engineers", vec![carol], vec![alice, bob]);
        // Carol also sits in Sales to check de-duplication across groups.
        let sales = group("Sales", vec![frank], vec![dan, carol]);
        let reader = Role {
            id: Uuid::new_v4(),
            name: "Reader".into(),
            direct_assignments: vec![],
            group_assignments: vec![engineers.id, sales.id],
            created_at: Utc::now(),
        };

        let grants = role_grants(&reader, &[engineers.clone(), sales.clone()]);

        assert_eq!(grants.len(), 5);
        assert!(
            grants
                .iter()
                .all(|g| g.entitlement == EntitlementSlug::Assignment)
        );
        assert!(
            grants
                .iter()
                .all(|g| !matches!(g.principal, Principal::Group(_)))
        );
        let holders = users_with(&grants, EntitlementSlug::Assignment);
        for id in [carol, alice, bob, frank, dan] {
            assert!(holders.contains(&id));
        }
    }

    #[test]
    fn direct_assignee_in_group_appears_once() {
        let frank = Uuid::new_v4();
        let sales = group("Sales", vec![frank], vec![]);
        let editor = Role {
            id: Uuid::new_v4(),
            name: "Editor".into(),
            direct_assignments: vec![frank],
            group_assignments: vec![sales.id],
            created_at: Utc::now(),
        };

        let grants = role_grants(&editor, &[sales]);
        assert_eq!(grants, vec![DerivedGrant::user(EntitlementSlug::Assignment, frank)]);
    }

    #[test]
    fn project_owner_holds_owner_and_access() {
        let (bob, alice) = (Uuid::new_v4(), Uuid::new_v4());
        let engineers = group("Engineers", vec![], vec![alice, bob]);
        let project = Project {
            id: Uuid::new_v4(),
            name: "Product X".into(),
            owner: bob,
            group_assignments: vec![engineers.id],
            created_at: Utc::now(),
        };

        let grants = project_grants(&project, std::slice::from_ref(&engineers));

        assert!(users_with(&grants, EntitlementSlug::Owner).contains(&bob));
        assert!(users_with(&grants, EntitlementSlug::Access).contains(&bob));
        assert!(grants.contains(&DerivedGrant::group(EntitlementSlug::Access, engineers.id)));
        assert!(users_with(&grants, EntitlementSlug::Access).contains(&alice));
        // owner, access(bob), access(group), access(alice)
        assert_eq!(grants.len(), 4);
    }

    #[test]
    fn slug_round_trips_through_str() {
        for slug in [
            EntitlementSlug::Member,
            EntitlementSlug::Admin,
            EntitlementSlug::Assignment,
            EntitlementSlug::Access,
            EntitlementSlug::Owner,
        ] {
            assert_eq!(slug.as_str().parse::<EntitlementSlug>().unwrap(), slug);
        }
        assert!("viewer".parse::<EntitlementSlug>().is_err());
    }

    #[test]
    fn permission_slugs_are_the_elevated_ones() {
        assert_eq!(EntitlementSlug::Admin.purpose(), EntitlementPurpose::Permission);
        assert_eq!(EntitlementSlug::Owner.purpose(), EntitlementPurpose::Permission);
        assert_eq!(EntitlementSlug::Member.purpose(), EntitlementPurpose::Assignment);
    }
}

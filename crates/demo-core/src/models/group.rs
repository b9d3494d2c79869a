//! Group domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named set of users. Admins are tracked separately from members;
/// being an admin implies membership when grants are derived, but the
/// admin is not stored in `members`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    /// Admin user ids in grant order.
    pub admins: Vec<Uuid>,
    /// Member user ids in grant order.
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Admins followed by members, each user listed once.
    pub fn principals(&self) -> Vec<Uuid> {
        let mut seen = std::collections::HashSet::new();
        self.admins
            .iter()
            .chain(self.members.iter())
            .filter(|id| seen.insert(**id))
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    pub name: String,
}

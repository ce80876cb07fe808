// role.rs — Actor roles and the injected role→permission table.
//
// The engine never consults a global permission registry; callers pass a
// RolePolicy per operation. The default table encodes the standard rules:
// any project member may submit, only decision authorities (approver,
// owner) may decide, viewers may do neither.

use serde::{Deserialize, Serialize};

use gov_audit::ActorRef;

/// A project role, in ascending order of authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Member,
    Approver,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Member => "member",
            Role::Approver => "approver",
            Role::Owner => "owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "member" => Ok(Role::Member),
            "approver" => Ok(Role::Approver),
            "owner" => Ok(Role::Owner),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Who is acting, with their current project role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Snapshot this actor for an audit event (role becomes a string,
    /// frozen at action time).
    pub fn to_ref(&self) -> ActorRef {
        ActorRef::new(&self.user_id, &self.display_name, self.role.as_str())
    }
}

/// Read-only role→permission lookup table, injected per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePolicy {
    submit: Vec<Role>,
    decide: Vec<Role>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self {
            submit: vec![Role::Member, Role::Approver, Role::Owner],
            decide: vec![Role::Approver, Role::Owner],
        }
    }
}

impl RolePolicy {
    /// May this role move a change into review (or back out of it)?
    pub fn can_submit(&self, role: Role) -> bool {
        self.submit.contains(&role)
    }

    /// May this role approve, request changes, or reject?
    pub fn can_decide(&self, role: Role) -> bool {
        self.decide.contains(&role)
    }
}

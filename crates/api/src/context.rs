use serde::{Deserialize, Serialize};

use inventrack_core::PrincipalId;

/// Role granted to a principal for the current request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Already-authenticated caller of a service operation (identity + roles).
///
/// Session handling lives outside this crate; every service call receives
/// the context explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl RequestContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self { principal_id, roles }
    }

    pub fn admin(principal_id: PrincipalId) -> Self {
        Self::new(principal_id, vec![Role::Admin])
    }

    pub fn staff(principal_id: PrincipalId) -> Self {
        Self::new(principal_id, vec![Role::Staff])
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

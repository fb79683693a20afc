//! Authorization guard for service operations.
//!
//! Checked at the service boundary, before any validation or store access,
//! so the domain and infra layers stay auth-agnostic.

use inventrack_core::{DomainError, DomainResult};

use crate::context::RequestContext;

/// Require the admin role for `action`.
pub fn require_admin(ctx: &RequestContext, action: &str) -> DomainResult<()> {
    if ctx.is_admin() {
        return Ok(());
    }

    tracing::warn!(
        principal_id = %ctx.principal_id(),
        action,
        "admin role required"
    );
    Err(DomainError::unauthorized(format!("{action} requires the admin role")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Role;
    use inventrack_core::PrincipalId;

    #[test]
    fn admin_passes_and_staff_is_rejected() {
        let admin = RequestContext::admin(PrincipalId::new());
        assert!(require_admin(&admin, "delete item").is_ok());

        let staff = RequestContext::staff(PrincipalId::new());
        let err = require_admin(&staff, "delete item").unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn any_admin_role_among_several_is_enough() {
        let ctx = RequestContext::new(PrincipalId::new(), vec![Role::Staff, Role::Admin]);
        assert!(require_admin(&ctx, "create category").is_ok());
    }
}

//! Sub-gates: the admin gate (for `/admin*`) and the per-route role gate.

use crate::routes::{ADMIN_LOGIN, Location};
use crate::{AdminSession, Decision, Role, SessionHints};

/// Decide an `/admin*` location from the admin-session probe.
///
/// `/admin/login` is always rendered, even while the probe is in flight, so a
/// rejected admin can try again. Every other admin path renders nothing until
/// the probe settles; probe failures stay `Checking`, so this fails closed.
pub fn admin_gate(location: &Location, admin: AdminSession) -> Decision {
    if location.path() == ADMIN_LOGIN {
        return Decision::Render;
    }
    match admin {
        AdminSession::Checking => Decision::Blank,
        AdminSession::Admin => Decision::Render,
        AdminSession::NotAdmin => Decision::Redirect(location.admin_login_redirect()),
    }
}

/// Route-level guard over the cached role.
///
/// This is a navigation convenience, **not** a security boundary: it trusts
/// the local session hints and never asks the backend. Data access is
/// enforced by the backend's row-level rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    allowed: Vec<Role>,
}

impl RoleGate {
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// - cached role allowed: render
    /// - not signed in, or no usable cached role: login with `next`
    /// - signed in with another role: that role's home page
    pub fn decide(&self, location: &Location, hints: &impl SessionHints) -> Decision {
        match (hints.authed(), hints.role()) {
            (true, Some(role)) if self.permits(role) => Decision::Render,
            (true, Some(role)) => Decision::Redirect(role.home_path().to_string()),
            _ => Decision::Redirect(location.login_redirect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionContext;

    #[test]
    fn admin_login_renders_while_probe_pending() {
        let loc = Location::new("/admin/login").with_query("next=%2Fadmin");
        assert_eq!(admin_gate(&loc, AdminSession::Checking), Decision::Render);
        assert_eq!(admin_gate(&loc, AdminSession::NotAdmin), Decision::Render);
    }

    #[test]
    fn other_admin_paths_blank_while_probe_pending() {
        let loc = Location::new("/admin/reports");
        assert_eq!(admin_gate(&loc, AdminSession::Checking), Decision::Blank);
        assert_eq!(admin_gate(&loc, AdminSession::Admin), Decision::Render);
    }

    #[test]
    fn admin_login_match_is_exact() {
        let loc = Location::new("/admin/login/extra");
        assert_eq!(
            admin_gate(&loc, AdminSession::NotAdmin),
            Decision::Redirect("/admin/login?next=%2Fadmin%2Flogin%2Fextra".to_string())
        );
    }

    #[test]
    fn role_gate_renders_for_allowed_role() {
        let gate = RoleGate::new([Role::Student]);
        let loc = Location::new("/seekers/applications");
        let decision = gate.decide(&loc, &SessionContext::signed_in(Role::Student));
        assert!(decision.is_render());
    }

    #[test]
    fn role_gate_sends_other_roles_home() {
        let gate = RoleGate::new([Role::Student]);
        let loc = Location::new("/seekers/applications");
        let decision = gate.decide(&loc, &SessionContext::signed_in(Role::Company));
        assert_eq!(decision.redirect_target(), Some("/company/dashboard"));
    }

    #[test]
    fn role_gate_sends_anonymous_to_login() {
        let gate = RoleGate::new([Role::Company, Role::Admin]);
        let loc = Location::new("/company/jobs").with_query("status=open");
        let decision = gate.decide(&loc, &SessionContext::anonymous());
        assert_eq!(
            decision.redirect_target(),
            Some("/login?next=%2Fcompany%2Fjobs%3Fstatus%3Dopen")
        );
    }

    #[test]
    fn role_gate_treats_missing_role_as_signed_out() {
        let gate = RoleGate::new([Role::Company]);
        let loc = Location::new("/company/jobs");
        let decision = gate.decide(&loc, &SessionContext::new(true, None));
        assert_eq!(decision.redirect_target(), Some("/login?next=%2Fcompany%2Fjobs"));
    }
}

//! Global gate: an ordered rule table over [`GateInput`].
//!
//! The first guarded rule that applies decides; the allow-list is the
//! terminal rule and covers everything the guarded rules leave over.

use serde::Serialize;

use crate::gates::admin_gate;
use crate::routes::{Location, RouteFamily};
use crate::{AdminSession, BanCheck, SessionHints};

/// What the gate tells the rendering layer to do with the requested page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Decision {
    /// Render the requested page.
    Render,
    /// Full-screen loading indicator; the page is suspended.
    Loading,
    /// Render nothing at all.
    Blank,
    /// In-app redirect to the given target (path plus optional query).
    Redirect(String),
}

impl Decision {
    pub fn is_render(&self) -> bool {
        matches!(self, Decision::Render)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Decision::Redirect(target) => Some(target),
            _ => None,
        }
    }
}

/// Everything the global gate reads for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInput<'a> {
    pub location: &'a Location,
    pub authed: bool,
    pub admin: AdminSession,
    pub ban: BanCheck,
}

impl<'a> GateInput<'a> {
    /// Both checks start out as `Checking`.
    pub fn new(location: &'a Location, hints: &impl SessionHints) -> Self {
        Self {
            location,
            authed: hints.authed(),
            admin: AdminSession::Checking,
            ban: BanCheck::Checking,
        }
    }

    pub fn with_admin(mut self, admin: AdminSession) -> Self {
        self.admin = admin;
        self
    }

    pub fn with_ban(mut self, ban: BanCheck) -> Self {
        self.ban = ban;
        self
    }
}

/// Rules of the global gate, listed in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRule {
    /// Signed in, ban status unknown, outside `/banned` and `/admin*`.
    PendingBanCheck,
    /// `/banned` is always reachable.
    BannedPage,
    /// `/admin*` is decided by the admin gate alone.
    AdminFamily,
    /// Everything else needs a session unless it is allow-listed.
    AllowList,
}

/// The decision together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateVerdict {
    pub rule: GateRule,
    pub decision: Decision,
}

struct Rule {
    rule: GateRule,
    applies: fn(&GateInput<'_>) -> bool,
    decide: fn(&GateInput<'_>) -> Decision,
}

/// Guarded rules, in precedence order. When none applies the allow-list
/// decides.
const RULES: [Rule; 3] = [
    Rule {
        rule: GateRule::PendingBanCheck,
        applies: |i| {
            i.authed && i.ban.is_checking() && i.location.family() == RouteFamily::General
        },
        decide: |_| Decision::Loading,
    },
    Rule {
        rule: GateRule::BannedPage,
        applies: |i| i.location.family() == RouteFamily::BannedPage,
        decide: |_| Decision::Render,
    },
    Rule {
        rule: GateRule::AdminFamily,
        applies: |i| i.location.family() == RouteFamily::Admin,
        decide: |i| admin_gate(i.location, i.admin),
    },
];

fn allow_list(input: &GateInput<'_>) -> Decision {
    if input.authed || input.location.is_public() {
        Decision::Render
    } else {
        Decision::Redirect(input.location.login_redirect())
    }
}

/// Decide what to render for `input`.
///
/// Never fails: every combination of in-flight or resolved checks maps to a
/// render, a blank/loading screen, or a redirect.
pub fn evaluate(input: &GateInput<'_>) -> Decision {
    explain(input).decision
}

/// Like [`evaluate`], but also reports which rule fired.
pub fn explain(input: &GateInput<'_>) -> GateVerdict {
    let verdict = RULES
        .iter()
        .find(|r| (r.applies)(input))
        .map(|r| GateVerdict {
            rule: r.rule,
            decision: (r.decide)(input),
        })
        .unwrap_or_else(|| GateVerdict {
            rule: GateRule::AllowList,
            decision: allow_list(input),
        });

    tracing::trace!(
        path = input.location.path(),
        rule = ?verdict.rule,
        decision = ?verdict.decision,
        "gate evaluated"
    );
    verdict
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::routes::PUBLIC_PATHS;
    use crate::{Role, SessionContext};

    fn anon(location: &Location) -> GateInput<'_> {
        GateInput::new(location, &SessionContext::anonymous())
    }

    fn signed_in(location: &Location, role: Role) -> GateInput<'_> {
        GateInput::new(location, &SessionContext::signed_in(role))
    }

    #[test]
    fn allow_list_decides_when_no_guarded_rule_applies() {
        let public = Location::new("/about");
        let verdict = explain(&anon(&public));
        assert_eq!(verdict.rule, GateRule::AllowList);
        assert_eq!(verdict.decision, Decision::Render);

        let protected = Location::new("/company/jobs");
        let verdict = explain(&signed_in(&protected, Role::Company).with_ban(BanCheck::NotBanned));
        assert_eq!(verdict.rule, GateRule::AllowList);
        assert!(verdict.decision.is_render());
    }

    #[test]
    fn guarded_rules_name_themselves() {
        let admin = Location::new("/admin/users");
        assert_eq!(explain(&anon(&admin)).rule, GateRule::AdminFamily);

        let banned = Location::new("/banned");
        assert_eq!(explain(&anon(&banned)).rule, GateRule::BannedPage);

        let dash = Location::new("/seekers/dashboard");
        assert_eq!(explain(&signed_in(&dash, Role::Student)).rule, GateRule::PendingBanCheck);
    }

    #[test]
    fn anonymous_visit_to_protected_page_redirects_to_login() {
        let loc = Location::new("/seekers/opportunities");
        let decision = evaluate(&anon(&loc).with_ban(BanCheck::NotBanned));
        assert_eq!(
            decision,
            Decision::Redirect("/login?next=%2Fseekers%2Fopportunities".to_string())
        );
    }

    #[test]
    fn signed_in_seeker_waits_for_ban_check() {
        let loc = Location::new("/seekers/dashboard");
        let verdict = explain(&signed_in(&loc, Role::Student));
        assert_eq!(verdict.rule, GateRule::PendingBanCheck);
        assert_eq!(verdict.decision, Decision::Loading);
    }

    #[test]
    fn signed_in_seeker_renders_once_cleared() {
        let loc = Location::new("/seekers/dashboard");
        let input = signed_in(&loc, Role::Student).with_ban(BanCheck::NotBanned);
        assert_eq!(evaluate(&input), Decision::Render);
    }

    #[test]
    fn pending_ban_check_also_covers_public_pages() {
        let loc = Location::new("/about");
        assert_eq!(evaluate(&signed_in(&loc, Role::Company)), Decision::Loading);
    }

    #[test]
    fn banned_user_still_renders_general_pages_until_navigated() {
        // Navigation to /banned is the monitor's job, not the gate's.
        let loc = Location::new("/company/jobs");
        let input = signed_in(&loc, Role::Company).with_ban(BanCheck::Banned);
        assert_eq!(evaluate(&input), Decision::Render);
    }

    #[test]
    fn admin_route_with_rejected_probe_redirects_to_admin_login() {
        let loc = Location::new("/admin/dashboard");
        let verdict = explain(&anon(&loc).with_admin(AdminSession::NotAdmin));
        assert_eq!(verdict.rule, GateRule::AdminFamily);
        assert_eq!(
            verdict.decision,
            Decision::Redirect("/admin/login?next=%2Fadmin%2Fdashboard".to_string())
        );
    }

    #[test]
    fn admin_route_is_not_held_by_pending_ban_check() {
        let loc = Location::new("/admin/users");
        let input = signed_in(&loc, Role::Admin).with_admin(AdminSession::Admin);
        assert_eq!(evaluate(&input), Decision::Render);
    }

    #[test]
    fn decision_serializes_with_kind_tag() {
        let json = serde_json::to_value(Decision::Redirect("/login".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "redirect", "target": "/login"}));
    }

    fn any_admin() -> impl Strategy<Value = AdminSession> {
        prop_oneof![
            Just(AdminSession::Checking),
            Just(AdminSession::Admin),
            Just(AdminSession::NotAdmin),
        ]
    }

    fn any_ban() -> impl Strategy<Value = BanCheck> {
        prop_oneof![
            Just(BanCheck::Checking),
            Just(BanCheck::Banned),
            Just(BanCheck::NotBanned),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Anonymous visitors to any non-public, non-admin, non-banned path
        /// are sent to login with the full location in `next`.
        #[test]
        fn anonymous_private_paths_redirect_to_login(
            path in "/[a-z]{1,12}(/[a-z0-9-]{1,12}){0,3}",
            query in proptest::option::of("[a-z]{1,6}=[a-z0-9 ]{0,6}"),
            ban in any_ban(),
            admin in any_admin(),
        ) {
            let mut loc = Location::new(path.clone());
            if let Some(q) = &query {
                loc = loc.with_query(q.clone());
            }
            prop_assume!(!loc.is_public());
            prop_assume!(loc.family() == RouteFamily::General);

            let decision = evaluate(&anon(&loc).with_ban(ban).with_admin(admin));
            let expected = format!("/login?next={}", urlencoding::encode(&loc.path_and_query()));
            prop_assert_eq!(decision, Decision::Redirect(expected));
        }

        /// Allow-listed paths always render for anonymous visitors.
        #[test]
        fn anonymous_public_paths_render(
            idx in 0..PUBLIC_PATHS.len(),
            ban in any_ban(),
        ) {
            let loc = Location::new(PUBLIC_PATHS[idx]);
            let input = anon(&loc).with_ban(ban).with_admin(AdminSession::NotAdmin);
            prop_assert_eq!(evaluate(&input), Decision::Render);
        }

        /// `/banned` renders for every combination of inputs.
        #[test]
        fn banned_page_always_renders(
            authed in any::<bool>(),
            ban in any_ban(),
            admin in any_admin(),
            query in proptest::option::of("[a-z]{1,6}"),
        ) {
            let mut loc = Location::new("/banned");
            if let Some(q) = query {
                loc = loc.with_query(q);
            }
            let input = GateInput { location: &loc, authed, admin, ban };
            prop_assert_eq!(evaluate(&input), Decision::Render);
        }

        /// Admin paths only ever see the admin gate's answers, whatever the
        /// session flags and ban state say.
        #[test]
        fn admin_paths_ignore_allow_list(
            suffix in "(/[a-z]{1,10}){0,2}",
            authed in any::<bool>(),
            ban in any_ban(),
            admin in any_admin(),
        ) {
            let loc = Location::new(format!("/admin{suffix}"));
            let input = GateInput { location: &loc, authed, admin, ban };
            let verdict = explain(&input);
            prop_assert_eq!(verdict.rule, GateRule::AdminFamily);
            prop_assert_eq!(verdict.decision, admin_gate(&loc, admin));
        }
    }
}

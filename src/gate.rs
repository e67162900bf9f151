use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::models::{AccessOutcome, DenyReason, ResolvedRoute, RouteNode, SessionState};

/// EffectiveAccess
///
/// Access requirement of a whole chain. Flags are OR-ed; each node's role set is
/// kept on its own so that every one of them has to be satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveAccess {
    pub auth_required: bool,
    pub member_only: bool,
    pub customer_only: bool,
    pub role_sets: Vec<BTreeSet<String>>,
    pub hidden: bool,
}

impl EffectiveAccess {
    /// Whether a decision depends on the session at all. A role requirement
    /// implies a signed-in user.
    pub fn requires_session(&self) -> bool {
        self.auth_required || self.member_only || self.customer_only || !self.role_sets.is_empty()
    }
}

/// effective_access
///
/// Folds the access flags of a root-to-leaf chain. A child never loosens what a
/// parent requires.
pub fn effective_access(chain: &[Arc<RouteNode>]) -> EffectiveAccess {
    chain.iter().fold(EffectiveAccess::default(), |mut acc, node| {
        let flags = &node.access;
        acc.auth_required |= flags.auth_required;
        acc.member_only |= flags.member_only;
        acc.customer_only |= flags.customer_only;
        acc.hidden |= flags.hidden;
        if !flags.roles_required.is_empty() {
            acc.role_sets.push(flags.roles_required.clone());
        }
        acc
    })
}

/// evaluate
///
/// Decides allow / pending / deny for an effective requirement. Pure: redirects
/// are the caller's business.
pub fn evaluate(access: &EffectiveAccess, session: &SessionState) -> AccessOutcome {
    if !access.requires_session() {
        return AccessOutcome::Allow;
    }

    if !session.initialized {
        return AccessOutcome::Pending;
    }

    let Some(profile) = session.profile.as_ref() else {
        return AccessOutcome::Deny(DenyReason::NotLoggedIn);
    };

    if access
        .role_sets
        .iter()
        .any(|roles| !profile.has_any_role(roles))
    {
        return AccessOutcome::Deny(DenyReason::InsufficientRole);
    }

    if access.member_only && !profile.is_member() {
        return AccessOutcome::Deny(DenyReason::NotMember);
    }

    if access.customer_only && !profile.is_customer() {
        return AccessOutcome::Deny(DenyReason::NotCustomer);
    }

    AccessOutcome::Allow
}

/// check
///
/// Gate a resolved route against the current session.
pub fn check(route: &ResolvedRoute, session: &SessionState) -> AccessOutcome {
    let access = effective_access(&route.chain);
    let outcome = evaluate(&access, session);
    debug!(
        route = %route.leaf().title,
        ?outcome,
        initialized = session.initialized,
        "access gate evaluated"
    );
    outcome
}

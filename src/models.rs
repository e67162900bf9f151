use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role granting full platform membership.
pub const MEMBER_ROLE: &str = "Topcoder User";
/// Role carried by customers who launch work.
pub const CUSTOMER_ROLE: &str = "Topcoder Customer";
/// Administrators count as both members and customers.
pub const ADMIN_ROLE: &str = "administrator";

// --- Route Configuration ---

/// ElementId
///
/// Opaque handle to a renderable unit. The shell never interprets it; the render
/// collaborator maps it to an actual page component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// AccessFlags
///
/// Per-node access requirements. Requirements only ever accumulate down a chain
/// (see `gate::effective_access`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessFlags {
    pub auth_required: bool,
    pub member_only: bool,
    pub customer_only: bool,
    /// Any-of: holding one of these roles satisfies the node.
    pub roles_required: BTreeSet<String>,
    /// Left out of navigation listings; still reachable by URL.
    pub hidden: bool,
}

/// RouteNode
///
/// One routable unit of a tool. Paths are `/`-separated patterns relative to the
/// parent node: `:name` captures one segment, a lone `*` captures the remainder,
/// and an empty path is an index route. Sibling order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNode {
    pub path: String,
    pub title: String,
    pub element: Option<ElementId>,
    pub access: AccessFlags,
    /// Extra root paths resolving to this node. Only consulted for tool roots.
    pub alternative_paths: Vec<String>,
    pub children: Vec<Arc<RouteNode>>,
}

impl RouteNode {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            element: None,
            access: AccessFlags::default(),
            alternative_paths: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn element(mut self, id: impl Into<String>) -> Self {
        self.element = Some(ElementId::new(id));
        self
    }

    pub fn auth_required(mut self) -> Self {
        self.access.auth_required = true;
        self
    }

    pub fn member_only(mut self) -> Self {
        self.access.member_only = true;
        self
    }

    pub fn customer_only(mut self) -> Self {
        self.access.customer_only = true;
        self
    }

    pub fn roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.access.roles_required.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.access.hidden = true;
        self
    }

    pub fn alternative_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.alternative_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = RouteNode>,
    {
        self.children.extend(children.into_iter().map(Arc::new));
        self
    }

    pub fn is_index(&self) -> bool {
        self.path.split('/').all(str::is_empty)
    }
}

// --- Resolution ---

/// ResolvedRoute
///
/// The outcome of matching a concrete URL: the node chain from tool root to leaf,
/// the captured (decoded) parameters and the part of the path no node consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Never empty: `chain[0]` is the tool root, the last entry is the leaf.
    pub chain: Vec<Arc<RouteNode>>,
    pub params: BTreeMap<String, String>,
    pub element: ElementId,
    /// Normalized prefix consumed by the chain, always starting with `/`. Kept
    /// percent-encoded, as it appears in the URL.
    pub matched_path: String,
    /// Unconsumed suffix, without a leading `/`, still percent-encoded. Empty
    /// when fully matched.
    pub rest: String,
}

impl ResolvedRoute {
    pub fn tool(&self) -> &Arc<RouteNode> {
        &self.chain[0]
    }

    pub fn leaf(&self) -> &Arc<RouteNode> {
        &self.chain[self.chain.len() - 1]
    }

    pub fn titles(&self) -> Vec<String> {
        self.chain.iter().map(|node| node.title.clone()).collect()
    }
}

// --- Session ---

/// Profile
///
/// The member record supplied by the profile collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Profile {
    pub user_id: i64,
    pub handle: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Profile {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held.eq_ignore_ascii_case(role))
    }

    pub fn has_any_role(&self, roles: &BTreeSet<String>) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    pub fn is_member(&self) -> bool {
        self.has_role(MEMBER_ROLE) || self.has_role(ADMIN_ROLE)
    }

    pub fn is_customer(&self) -> bool {
        self.has_role(CUSTOMER_ROLE) || self.has_role(ADMIN_ROLE)
    }
}

/// SessionState
///
/// Snapshot of the session collaborator. `initialized` stays false until the
/// profile lookup has completed, whatever its outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionState {
    pub initialized: bool,
    pub profile: Option<Profile>,
}

impl SessionState {
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn anonymous() -> Self {
        Self {
            initialized: true,
            profile: None,
        }
    }

    pub fn signed_in(profile: Profile) -> Self {
        Self {
            initialized: true,
            profile: Some(profile),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.initialized && self.profile.is_some()
    }
}

// --- Access Outcomes ---

/// DenyReason
///
/// Why the gate refused a route. The caller picks the redirect target from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum DenyReason {
    NotLoggedIn,
    InsufficientRole,
    NotMember,
    NotCustomer,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DenyReason::NotLoggedIn => "not-logged-in",
            DenyReason::InsufficientRole => "insufficient-role",
            DenyReason::NotMember => "not-member",
            DenyReason::NotCustomer => "not-customer",
        };
        f.write_str(label)
    }
}

/// AccessOutcome
///
/// Result of the access gate. `Pending` means "no decision yet", never a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Allow,
    Pending,
    Deny(DenyReason),
}

// --- HTTP Payloads ---

/// OutcomeKind
///
/// Flat outcome label used in API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum OutcomeKind {
    Allow,
    Pending,
    Deny,
    NotFound,
}

/// ResolutionResponse
///
/// Response of `GET /api/resolve`: everything the client router needs to render
/// or redirect for one path.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolutionResponse {
    /// Normalized request path.
    pub path: String,
    pub active_tool: Option<String>,
    /// Titles of the matched chain, tool first (breadcrumbs).
    pub titles: Vec<String>,
    pub element: Option<String>,
    pub params: BTreeMap<String, String>,
    pub rest: String,
    pub outcome: OutcomeKind,
    pub deny_reason: Option<DenyReason>,
    pub redirect_to: Option<String>,
    pub is_root: bool,
}

/// RouteSummary
///
/// Flat view of one route node, used for navigation menus and nested route lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteSummary {
    pub title: String,
    pub path: String,
    pub alternative_paths: Vec<String>,
    pub element: Option<String>,
    pub hidden: bool,
    pub auth_required: bool,
    pub member_only: bool,
    pub customer_only: bool,
    pub roles_required: Vec<String>,
    pub child_count: usize,
}

impl From<&RouteNode> for RouteSummary {
    fn from(node: &RouteNode) -> Self {
        Self {
            title: node.title.clone(),
            path: node.path.clone(),
            alternative_paths: node.alternative_paths.clone(),
            element: node.element.as_ref().map(ToString::to_string),
            hidden: node.access.hidden,
            auth_required: node.access.auth_required,
            member_only: node.access.member_only,
            customer_only: node.access.customer_only,
            roles_required: node.access.roles_required.iter().cloned().collect(),
            child_count: node.children.len(),
        }
    }
}

/// BuildPathRequest
///
/// Input payload for `POST /api/paths`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BuildPathRequest {
    /// Title of the route to build a path for.
    pub title: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BuildPathResponse {
    pub path: String,
}

/// ErrorResponse
///
/// JSON body of API errors.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// ShellResponse
///
/// Body returned by the navigation shell for paths that are not redirected.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShellResponse {
    /// `render`, `loading` or `not-found`.
    pub directive: String,
    pub path: String,
    pub tool: Option<String>,
    pub element: Option<String>,
    pub params: BTreeMap<String, String>,
    /// Child routes of the matched leaf, for tools rendering nested routes.
    pub children: Vec<RouteSummary>,
}

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace};

use crate::{
    error::PathBuildError,
    gate,
    matcher::{self, MatchOutcome},
    models::{AccessOutcome, DenyReason, ElementId, RouteNode, SessionState},
    tools::RouteTable,
};

/// Query parameter carrying the page to return to after signing in.
pub const RETURN_URL_PARAM: &str = "retUrl";

// --- Collaborators ---

/// Navigator
///
/// The navigation collaborator: performs an imperative redirect.
pub trait Navigator {
    fn redirect(&mut self, target: &str);
}

/// RenderTarget
///
/// The render collaborator: receives the latest directive after every pass.
pub trait RenderTarget {
    fn render(&mut self, directive: &Directive);
}

/// RedirectConfig
///
/// Where denied navigations are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectConfig {
    pub login_url: Url,
    pub unauthorized_url: String,
}

impl RedirectConfig {
    /// target_for
    ///
    /// `not-logged-in` goes to the login page with the requested path and query
    /// as `retUrl`; every other reason goes to the unauthorized page.
    pub fn target_for(&self, reason: DenyReason, requested_path: &str) -> String {
        match reason {
            DenyReason::NotLoggedIn => {
                let mut url = self.login_url.clone();
                url.query_pairs_mut()
                    .append_pair(RETURN_URL_PARAM, requested_path);
                url.to_string()
            }
            DenyReason::InsufficientRole | DenyReason::NotMember | DenyReason::NotCustomer => {
                self.unauthorized_url.clone()
            }
        }
    }
}

// --- Resolution State ---

/// Resolution
///
/// Result of one pass: the path matched (or not) and, when matched, what the
/// gate decided for the session seen during that pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Normalized path used for matching.
    pub path: String,
    /// The navigation as requested, query included. Login redirects return here.
    pub requested: String,
    pub outcome: MatchOutcome,
    /// `None` when nothing matched.
    pub access: Option<AccessOutcome>,
}

/// ContextPhase
///
/// `Uninitialized` until the first navigation, then `Resolved` with the latest
/// pass. A pass runs synchronously under `&mut self`, so the resolving step in
/// between is never observable. Nothing is cached between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPhase<'a> {
    Uninitialized,
    Resolved(&'a Resolution),
}

/// Directive
///
/// What the render layer should do with the current resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Render {
        tool: String,
        element: ElementId,
        params: BTreeMap<String, String>,
        /// Nested routes of the leaf, for tools that render their own routes.
        children: Vec<Arc<RouteNode>>,
        rest: String,
    },
    Loading,
    Redirect {
        target: String,
        reason: DenyReason,
    },
    NotFound,
}

/// RouteContext
///
/// Owns the per-navigation resolution and exposes it, with the table helpers,
/// to whatever renders the application.
#[derive(Debug, Clone)]
pub struct RouteContext {
    table: Arc<RouteTable>,
    redirects: RedirectConfig,
    resolved: Option<Resolution>,
    current_request: Option<String>,
}

impl RouteContext {
    pub fn new(table: Arc<RouteTable>, redirects: RedirectConfig) -> Self {
        Self {
            table,
            redirects,
            resolved: None,
            current_request: None,
        }
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    pub fn phase(&self) -> ContextPhase<'_> {
        match &self.resolved {
            Some(resolution) => ContextPhase::Resolved(resolution),
            None => ContextPhase::Uninitialized,
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolved.as_ref()
    }

    /// navigate
    ///
    /// Resolves `path` from scratch against the table and the given session.
    /// `path` is a URL path as the browser shows it: percent-encoded, optionally
    /// followed by a query string or fragment.
    pub fn navigate(&mut self, path: &str, session: &SessionState) -> &Resolution {
        self.current_request = Some(path.to_string());
        self.run_pass(path.to_string(), session)
    }

    /// session_changed
    ///
    /// Re-resolves the current path for a new session snapshot. Does nothing
    /// before the first navigation.
    pub fn session_changed(&mut self, session: &SessionState) -> Option<&Resolution> {
        let requested = self.current_request.clone()?;
        Some(self.run_pass(requested, session))
    }

    fn run_pass(&mut self, requested: String, session: &SessionState) -> &Resolution {
        let path = matcher::normalize_path(&requested);
        trace!(path = %path, "resolving");
        let outcome = matcher::resolve(&self.table, &path);
        let access = outcome.route().map(|route| gate::check(route, session));
        debug!(path = %path, matched = access.is_some(), ?access, "route resolved");

        self.resolved.insert(Resolution {
            path,
            requested,
            outcome,
            access,
        })
    }

    /// directive
    ///
    /// Translates the current resolution into a render instruction: deny becomes
    /// a redirect, pending a loading state, no match a not-found page.
    pub fn directive(&self) -> Option<Directive> {
        let resolution = self.resolution()?;
        let directive = match (&resolution.outcome, resolution.access) {
            (MatchOutcome::NoMatch { .. }, _) | (MatchOutcome::Matched(_), None) => {
                Directive::NotFound
            }
            (MatchOutcome::Matched(_), Some(AccessOutcome::Pending)) => Directive::Loading,
            (MatchOutcome::Matched(_), Some(AccessOutcome::Deny(reason))) => Directive::Redirect {
                target: self.redirects.target_for(reason, &resolution.requested),
                reason,
            },
            (MatchOutcome::Matched(route), Some(AccessOutcome::Allow)) => Directive::Render {
                tool: route.tool().title.clone(),
                element: route.element.clone(),
                params: route.params.clone(),
                children: route.leaf().children.clone(),
                rest: route.rest.clone(),
            },
        };
        Some(directive)
    }

    // --- Helpers exposed to descendants ---

    /// Title of the tool owning the current path, if any tool claimed it.
    pub fn active_tool_title(&self) -> Option<&str> {
        match &self.resolution()?.outcome {
            MatchOutcome::Matched(route) => Some(route.tool().title.as_str()),
            MatchOutcome::NoMatch { tool, .. } => tool.as_deref(),
        }
    }

    /// Child routes owned by a tool, for tools that render their own routes.
    pub fn child_routes(&self, tool_title: &str) -> Option<&[Arc<RouteNode>]> {
        self.table
            .tool_by_title(tool_title)
            .map(|tool| tool.children.as_slice())
    }

    pub fn build_path(
        &self,
        node: &RouteNode,
        params: &BTreeMap<String, String>,
    ) -> Result<String, PathBuildError> {
        self.table.build_path(node, params)
    }

    pub fn path_for_title(
        &self,
        title: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, PathBuildError> {
        let chain = self
            .table
            .find_by_title(title)
            .ok_or_else(|| PathBuildError::UnknownRoute(title.to_string()))?;
        matcher::build_path(&chain, params)
    }

    /// Whether the current path is the application root.
    pub fn is_root_route(&self) -> bool {
        self.resolution()
            .is_some_and(|resolution| resolution.path == "/")
    }

    pub fn navigation(&self) -> Vec<&Arc<RouteNode>> {
        self.table.navigation().collect()
    }
}

/// run_navigation_loop
///
/// Drives a context from navigation events and session updates on a single
/// task. Each event triggers exactly one pass; redirects go to the navigator and
/// every directive goes to the render target. Returns the context once the
/// navigation channel closes.
pub async fn run_navigation_loop<N, R>(
    mut context: RouteContext,
    mut navigation: mpsc::Receiver<String>,
    mut session: watch::Receiver<SessionState>,
    navigator: &mut N,
    renderer: &mut R,
) -> RouteContext
where
    N: Navigator,
    R: RenderTarget,
{
    let mut session_open = true;

    loop {
        tokio::select! {
            event = navigation.recv() => {
                let Some(path) = event else {
                    break;
                };
                let snapshot = session.borrow_and_update().clone();
                context.navigate(&path, &snapshot);
            }
            changed = session.changed(), if session_open => {
                if changed.is_err() {
                    // Keep serving navigations with the last session seen.
                    session_open = false;
                    continue;
                }
                let snapshot = session.borrow_and_update().clone();
                if context.session_changed(&snapshot).is_none() {
                    continue;
                }
            }
        }

        let Some(directive) = context.directive() else {
            continue;
        };
        if let Directive::Redirect { target, reason } = &directive {
            info!(%reason, target = %target, "navigation denied, redirecting");
            navigator.redirect(target);
        }
        renderer.render(&directive);
    }

    context
}

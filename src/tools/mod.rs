//! Route Table
//!
//! Each tool of the platform owns one route tree. The trees are concatenated in
//! activation order: the first tool whose root matches a path owns it, so the
//! catch-all home tool has to come last.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::{
    error::{PathBuildError, RouteTableError},
    matcher::{self, Segment},
    models::RouteNode,
};

pub mod certificates;
pub mod challenges;
pub mod gamification_admin;
pub mod home;
pub mod learn;
pub mod onboarding;
pub mod settings;
pub mod work;

/// RouteTable
///
/// Immutable after construction; shared behind an `Arc` and read without locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    tools: Vec<Arc<RouteNode>>,
}

impl RouteTable {
    /// new
    ///
    /// Builds a table from tool trees in activation order, rejecting authoring
    /// defects (misplaced catch-all, ambiguous siblings, duplicated parameters or
    /// tool titles).
    pub fn new(tools: Vec<RouteNode>) -> Result<Self, RouteTableError> {
        let tools: Vec<Arc<RouteNode>> = tools.into_iter().map(Arc::new).collect();
        validate_tools(&tools)?;
        Ok(Self { tools })
    }

    /// platform
    ///
    /// The platform's own tools.
    pub fn platform() -> Result<Self, RouteTableError> {
        Self::new(vec![
            challenges::routes(),
            learn::routes(),
            gamification_admin::routes(),
            work::routes(),
            certificates::routes(),
            onboarding::routes(),
            settings::routes(),
            home::routes(),
        ])
    }

    pub fn tools(&self) -> &[Arc<RouteNode>] {
        &self.tools
    }

    pub fn tool_by_title(&self, title: &str) -> Option<&Arc<RouteNode>> {
        self.tools.iter().find(|tool| tool.title == title)
    }

    /// Tools shown in navigation menus.
    pub fn navigation(&self) -> impl Iterator<Item = &Arc<RouteNode>> {
        self.tools.iter().filter(|tool| !tool.access.hidden)
    }

    /// find_by_title
    ///
    /// Chain from the owning tool root down to the first node (depth-first, in
    /// table order) carrying `title`.
    pub fn find_by_title(&self, title: &str) -> Option<Vec<Arc<RouteNode>>> {
        self.find_chain(|node| node.title == title)
    }

    /// Chain from the owning tool root down to this exact node.
    pub fn chain_to(&self, target: &RouteNode) -> Option<Vec<Arc<RouteNode>>> {
        self.find_chain(|node| std::ptr::eq(node, target))
    }

    /// build_path
    ///
    /// Concrete path for a node of this table.
    pub fn build_path(
        &self,
        node: &RouteNode,
        params: &BTreeMap<String, String>,
    ) -> Result<String, PathBuildError> {
        let chain = self.chain_to(node).ok_or(PathBuildError::ForeignNode)?;
        matcher::build_path(&chain, params)
    }

    fn find_chain(&self, predicate: impl Fn(&RouteNode) -> bool) -> Option<Vec<Arc<RouteNode>>> {
        let mut chain = Vec::new();
        self.tools
            .iter()
            .any(|tool| search(tool, &predicate, &mut chain))
            .then_some(chain)
    }
}

fn search(
    node: &Arc<RouteNode>,
    predicate: &impl Fn(&RouteNode) -> bool,
    chain: &mut Vec<Arc<RouteNode>>,
) -> bool {
    chain.push(Arc::clone(node));
    if predicate(node.as_ref())
        || node
            .children
            .iter()
            .any(|child| search(child, predicate, chain))
    {
        return true;
    }
    chain.pop();
    false
}

// --- Validation ---

fn validate_tools(tools: &[Arc<RouteNode>]) -> Result<(), RouteTableError> {
    let mut titles = HashSet::new();
    for tool in tools {
        if !titles.insert(tool.title.as_str()) {
            return Err(RouteTableError::DuplicateToolTitle(tool.title.clone()));
        }
    }

    // Every root pattern of every tool is a top-level sibling.
    let roots: Vec<(&str, Vec<Segment>)> = tools
        .iter()
        .flat_map(|tool| {
            std::iter::once(&tool.path)
                .chain(tool.alternative_paths.iter())
                .map(move |path| (tool.title.as_str(), matcher::parse_pattern(path)))
        })
        .collect();

    let last_title = tools.last().map(|tool| tool.title.as_str());
    for (title, pattern) in &roots {
        if matcher::is_catch_all(pattern) && Some(*title) != last_title {
            return Err(RouteTableError::CatchAllNotLast {
                title: (*title).to_string(),
            });
        }
    }
    check_ambiguity("", &roots)?;

    for tool in tools {
        for root in std::iter::once(&tool.path).chain(tool.alternative_paths.iter()) {
            let mut seen = Vec::new();
            collect_params(&matcher::parse_pattern(root), &tool.title, &mut seen)?;
            validate_children(tool, &mut seen)?;
        }
    }

    Ok(())
}

fn validate_children(node: &RouteNode, seen: &mut Vec<String>) -> Result<(), RouteTableError> {
    let siblings: Vec<(&str, Vec<Segment>)> = node
        .children
        .iter()
        .map(|child| (child.title.as_str(), matcher::parse_pattern(&child.path)))
        .collect();

    for (index, (title, pattern)) in siblings.iter().enumerate() {
        if matches!(pattern.as_slice(), [Segment::Splat]) && index + 1 != siblings.len() {
            return Err(RouteTableError::CatchAllNotLast {
                title: (*title).to_string(),
            });
        }
    }
    check_ambiguity(&node.title, &siblings)?;

    for (child, (_, pattern)) in node.children.iter().zip(&siblings) {
        let mark = seen.len();
        collect_params(pattern, &child.title, seen)?;
        validate_children(child, seen)?;
        seen.truncate(mark);
    }
    Ok(())
}

fn check_ambiguity(parent: &str, siblings: &[(&str, Vec<Segment>)]) -> Result<(), RouteTableError> {
    for (index, (first, first_pattern)) in siblings.iter().enumerate() {
        for (second, second_pattern) in &siblings[index + 1..] {
            // Aliases of the same tool may legitimately overlap each other.
            if first == second {
                continue;
            }
            if same_shape(first_pattern, second_pattern) {
                return Err(RouteTableError::AmbiguousSiblings {
                    parent: parent.to_string(),
                    first: (*first).to_string(),
                    second: (*second).to_string(),
                });
            }
        }
    }
    Ok(())
}

fn same_shape(left: &[Segment], right: &[Segment]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| {
                l.shape() == r.shape() && matches!(l, Segment::Splat) == matches!(r, Segment::Splat)
            })
}

fn collect_params(
    pattern: &[Segment],
    title: &str,
    seen: &mut Vec<String>,
) -> Result<(), RouteTableError> {
    for part in pattern {
        let name = match part {
            Segment::Param(name) => name.as_str(),
            Segment::Splat => matcher::SPLAT_PARAM,
            Segment::Literal(_) => continue,
        };
        if seen.iter().any(|existing| existing == name) {
            return Err(RouteTableError::DuplicateParam {
                param: name.to_string(),
                title: title.to_string(),
            });
        }
        seen.push(name.to_string());
    }
    Ok(())
}

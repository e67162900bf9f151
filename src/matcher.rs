use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use tracing::trace;

use crate::{
    error::PathBuildError,
    models::{ResolvedRoute, RouteNode},
    tools::RouteTable,
};

/// Parameter key under which a `*` segment stores the remainder of the path.
pub const SPLAT_PARAM: &str = "*";

// --- Patterns ---

/// Segment
///
/// One parsed segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Splat,
}

impl Segment {
    /// Shape with the parameter name erased. Two patterns with equal shapes match
    /// exactly the same concrete paths.
    pub fn shape(&self) -> Option<&str> {
        match self {
            Segment::Literal(literal) => Some(literal),
            Segment::Param(_) | Segment::Splat => None,
        }
    }
}

/// parse_pattern
///
/// Splits a route pattern into segments. Leading, trailing and doubled slashes
/// carry no meaning, so `""`, `"/"` and `"//"` all parse to the empty pattern.
pub fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment == "*" {
                Segment::Splat
            } else if let Some(name) = segment.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(segment.to_string())
            }
        })
        .collect()
}

/// Whether the pattern matches any path at all (empty, or a single splat).
pub fn is_catch_all(pattern: &[Segment]) -> bool {
    matches!(pattern, [] | [Segment::Splat])
}

/// normalize_path
///
/// Canonical form used for matching: query and fragment removed, leading `/`
/// ensured, trailing and doubled slashes dropped. The root is `/`.
pub fn normalize_path(raw: &str) -> String {
    let without_fragment = raw.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    format!("/{}", path_segments(without_query).join("/"))
}

/// Non-empty segments of a path.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// decode_segment
///
/// Percent-decodes one path segment. Runs after the path was split, so an
/// encoded `/` stays inside its segment.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

/// PrefixMatch
///
/// A pattern matched against the head of a segment list.
#[derive(Debug, Default)]
struct PrefixMatch {
    consumed: usize,
    params: Vec<(String, String)>,
}

/// match_prefix
///
/// Matches `pattern` against the leading `segments`. Segments are compared and
/// captured decoded: literals compare exactly, a parameter takes any one
/// segment and a splat takes everything left.
fn match_prefix(pattern: &[Segment], segments: &[&str]) -> Option<PrefixMatch> {
    let mut matched = PrefixMatch::default();

    for (index, part) in pattern.iter().enumerate() {
        match part {
            Segment::Splat => {
                let rest = segments
                    .get(index..)
                    .unwrap_or_default()
                    .iter()
                    .map(|segment| decode_segment(segment))
                    .collect::<Vec<_>>()
                    .join("/");
                matched.params.push((SPLAT_PARAM.to_string(), rest));
                matched.consumed = segments.len();
                return Some(matched);
            }
            Segment::Literal(literal) => {
                let segment = segments.get(index)?;
                if decode_segment(segment) != literal.as_str() {
                    return None;
                }
            }
            Segment::Param(name) => {
                let value = segments.get(index)?;
                matched
                    .params
                    .push((name.clone(), decode_segment(value).into_owned()));
            }
        }
        matched.consumed = index + 1;
    }

    Some(matched)
}

// --- Resolution ---

/// MatchOutcome
///
/// Terminal state of one matching pass. `NoMatch` is an ordinary outcome: the
/// render layer shows a not-found page for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(ResolvedRoute),
    NoMatch {
        path: String,
        /// Title of the tool that was activated before descent failed, if any.
        tool: Option<String>,
    },
}

impl MatchOutcome {
    pub fn route(&self) -> Option<&ResolvedRoute> {
        match self {
            MatchOutcome::Matched(route) => Some(route),
            MatchOutcome::NoMatch { .. } => None,
        }
    }
}

/// active_tool
///
/// The first tool (in table order) whose root path or one of its alternative
/// paths is a segment-wise prefix of `path`.
pub fn active_tool<'t>(table: &'t RouteTable, path: &str) -> Option<&'t Arc<RouteNode>> {
    let normalized = normalize_path(path);
    let segments = path_segments(&normalized);
    activate(table, &segments).map(|(tool, _)| tool)
}

fn activate<'t>(
    table: &'t RouteTable,
    segments: &[&str],
) -> Option<(&'t Arc<RouteNode>, PrefixMatch)> {
    table.tools().iter().find_map(|tool| {
        std::iter::once(&tool.path)
            .chain(tool.alternative_paths.iter())
            .find_map(|root| match_prefix(&parse_pattern(root), segments))
            .map(|matched| (tool, matched))
    })
}

/// resolve
///
/// Maps a path onto the table: activates a tool, then descends depth-first,
/// committing to the first child whose pattern matches. Never fails; an
/// unmatched path is reported as `MatchOutcome::NoMatch`.
pub fn resolve(table: &RouteTable, path: &str) -> MatchOutcome {
    let normalized = normalize_path(path);
    let segments = path_segments(&normalized);

    let Some((tool, root_match)) = activate(table, &segments) else {
        trace!(path = %normalized, "no tool claims path");
        return MatchOutcome::NoMatch {
            path: normalized,
            tool: None,
        };
    };

    let mut chain = Vec::new();
    let mut params: BTreeMap<String, String> = root_match.params.into_iter().collect();

    match descend(tool, &segments, root_match.consumed, &mut chain, &mut params) {
        Some(consumed) => {
            let leaf = &chain[chain.len() - 1];
            let Some(element) = leaf.element.clone() else {
                return MatchOutcome::NoMatch {
                    path: normalized,
                    tool: Some(tool.title.clone()),
                };
            };
            MatchOutcome::Matched(ResolvedRoute {
                element,
                matched_path: format!("/{}", segments[..consumed].join("/")),
                rest: segments[consumed..].join("/"),
                chain,
                params,
            })
        }
        None => {
            trace!(path = %normalized, tool = %tool.title, "descent found no renderable node");
            MatchOutcome::NoMatch {
                path: normalized,
                tool: Some(tool.title.clone()),
            }
        }
    }
}

fn descend(
    node: &Arc<RouteNode>,
    segments: &[&str],
    consumed: usize,
    chain: &mut Vec<Arc<RouteNode>>,
    params: &mut BTreeMap<String, String>,
) -> Option<usize> {
    chain.push(Arc::clone(node));
    let remaining = &segments[consumed..];

    for child in &node.children {
        let pattern = parse_pattern(&child.path);

        // Index routes only claim a fully consumed path.
        if pattern.is_empty() {
            if remaining.is_empty() {
                return descend(child, segments, consumed, chain, params);
            }
            continue;
        }

        if let Some(matched) = match_prefix(&pattern, remaining) {
            params.extend(matched.params);
            return descend(child, segments, consumed + matched.consumed, chain, params);
        }
    }

    node.element.as_ref().map(|_| consumed)
}

// --- Path Building ---

/// build_path
///
/// Concatenates the patterns of a root-to-node chain and substitutes parameter
/// values. A splat takes `params["*"]` verbatim (possibly empty).
pub fn build_path(
    chain: &[Arc<RouteNode>],
    params: &BTreeMap<String, String>,
) -> Result<String, PathBuildError> {
    let mut segments: Vec<String> = Vec::new();

    for node in chain {
        for part in parse_pattern(&node.path) {
            match part {
                Segment::Literal(literal) => segments.push(literal),
                Segment::Param(name) => {
                    let value = params
                        .get(&name)
                        .filter(|value| !value.is_empty())
                        .ok_or_else(|| PathBuildError::MissingParam(name.clone()))?;
                    if value.contains('/') {
                        return Err(PathBuildError::InvalidParam {
                            name,
                            value: value.clone(),
                        });
                    }
                    segments.push(value.clone());
                }
                Segment::Splat => {
                    if let Some(rest) = params.get(SPLAT_PARAM) {
                        segments.extend(path_segments(rest).into_iter().map(String::from));
                    }
                }
            }
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

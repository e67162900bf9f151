//! Typed errors. Expected routing states (no match, pending, denied) are values
//! and never appear here.

use thiserror::Error;

/// Configuration errors raised while reading the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Failures of the profile collaborator.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("member api request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("member api answered with status {0}")]
    Upstream(u16),

    #[error("member api base url is unusable: {0}")]
    InvalidBaseUrl(String),

    #[error("profile service unavailable: {0}")]
    Unavailable(String),
}

/// Authoring defects in a route table, detected when the table is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("catch-all route '{title}' must be the last of its siblings")]
    CatchAllNotLast { title: String },

    #[error("routes '{first}' and '{second}' under '{parent}' match the same paths")]
    AmbiguousSiblings {
        parent: String,
        first: String,
        second: String,
    },

    #[error("parameter ':{param}' is declared twice on the chain ending at '{title}'")]
    DuplicateParam { param: String, title: String },

    #[error("tool title '{0}' is used more than once")]
    DuplicateToolTitle(String),
}

/// Errors building a concrete path from a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathBuildError {
    #[error("no route titled '{0}'")]
    UnknownRoute(String),

    #[error("route node is not part of this table")]
    ForeignNode,

    #[error("missing value for parameter ':{0}'")]
    MissingParam(String),

    #[error("value '{value}' for parameter ':{name}' is not a single path segment")]
    InvalidParam { name: String, value: String },
}

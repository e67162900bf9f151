use crate::models::RouteNode;

pub const TITLE: &str = "Home";

/// Catch-all landing tool. Its empty root prefixes every path, so it must stay
/// the last tool of the table.
pub fn routes() -> RouteNode {
    RouteNode::new("", TITLE).element("home")
}

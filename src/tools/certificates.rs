use crate::models::RouteNode;

pub const TITLE: &str = "Certificates";

/// Public certificate pages, shareable without signing in. The root renders
/// nothing of its own: `/certificates` alone is not found.
pub fn routes() -> RouteNode {
    RouteNode::new("/certificates", TITLE).children([RouteNode::new(
        ":memberHandle/:certification",
        "Member Certificate",
    )
    .element("member-certificate")])
}

use crate::models::RouteNode;

pub const TITLE: &str = "Challenges";

pub fn routes() -> RouteNode {
    RouteNode::new("/challenges", TITLE)
        .element("challenges-layout")
        .children([
            RouteNode::new("", "Challenge Listing").element("challenge-listing"),
            RouteNode::new(":challengeId/submit", "Submit")
                .element("challenge-submit")
                .auth_required()
                .member_only(),
            RouteNode::new(":challengeId", "Challenge Details").element("challenge-details"),
        ])
}

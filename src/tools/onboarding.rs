use crate::models::RouteNode;

pub const TITLE: &str = "Onboarding";

pub fn routes() -> RouteNode {
    RouteNode::new("/onboarding", TITLE)
        .element("onboarding")
        .hidden()
        .member_only()
        .children([RouteNode::new(":step", "Onboarding Step").element("onboarding-step")])
}

use crate::models::RouteNode;

pub const TITLE: &str = "Work";

/// Work intake for customers. The intake wizard steps are hidden from
/// navigation but reachable through the dashboard.
pub fn routes() -> RouteNode {
    RouteNode::new("/work", TITLE)
        .alternative_paths(["/self-service"])
        .element("work-layout")
        .auth_required()
        .customer_only()
        .children([
            RouteNode::new("", "Dashboard").element("work-dashboard"),
            RouteNode::new("new/:workType/review", "Review").element("work-review").hidden(),
            RouteNode::new("new/:workType/thank-you", "Thank You")
                .element("work-thank-you")
                .hidden(),
            RouteNode::new("new/:workType", "Intake Form").element("work-intake").hidden(),
            RouteNode::new("items/:workId", "Work Item").element("work-item"),
        ])
}

use crate::models::RouteNode;

pub const TITLE: &str = "Topcoder Academy";

/// Learning paths. Lesson and certificate routes sit before the bare
/// certification route because they share its prefix.
pub fn routes() -> RouteNode {
    RouteNode::new("/learn", TITLE)
        .alternative_paths(["/academy"])
        .element("learn-layout")
        .children([
            RouteNode::new("", "Welcome").element("learn-welcome"),
            RouteNode::new("my-learning", "My Learning")
                .element("my-learning")
                .auth_required(),
            RouteNode::new(":provider/:certification/certificate", "Certificate")
                .element("learn-certificate")
                .auth_required(),
            RouteNode::new(":provider/:certification/:module/:lesson", "Lesson")
                .element("fcc-lesson")
                .auth_required(),
            RouteNode::new(":provider/:certification", "Certification Details")
                .element("certification-details"),
        ])
}

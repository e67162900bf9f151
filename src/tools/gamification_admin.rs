use crate::models::RouteNode;

pub const TITLE: &str = "Gamification Admin";
pub const ADMIN_ROLE: &str = "gamificationAdmin";

pub fn routes() -> RouteNode {
    RouteNode::new("/gamification-admin", TITLE)
        .element("gamification-admin-layout")
        .auth_required()
        .roles([ADMIN_ROLE])
        .children([
            RouteNode::new("", "Badge Listing").element("badge-listing"),
            RouteNode::new("create-badge", "Create Badge").element("create-badge"),
            RouteNode::new("badge-detail/:id", "Badge Detail").element("badge-detail"),
        ])
}

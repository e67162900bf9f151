use crate::models::RouteNode;

pub const TITLE: &str = "Account Settings";

pub fn routes() -> RouteNode {
    RouteNode::new("/account", TITLE)
        .alternative_paths(["/settings"])
        .element("account-layout")
        .auth_required()
        .children([
            RouteNode::new("", "Profile").element("account-profile"),
            RouteNode::new("preferences", "Preferences").element("account-preferences"),
            RouteNode::new("tools", "Tools").element("account-tools").member_only(),
            RouteNode::new("security", "Security").element("account-security").hidden(),
        ])
}

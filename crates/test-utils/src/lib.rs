//! Waypoint test utilities.
//!
//! Helpers for integration testing: route fixture builders, a sample
//! console catalog, and assertion utilities for menus and JSON output.

use waypoint_kernel::route::ComponentRef;
use waypoint_kernel::{Authority, AuthorityRule, RouteCatalog, RouteMeta, RouteNode};

/// Start a route fixture. The title defaults to the name.
pub fn test_route(path: &str, name: &str) -> RouteFixture {
    RouteFixture {
        path: path.to_string(),
        name: name.to_string(),
        component: None,
        redirect: None,
        meta: RouteMeta::titled(name),
        children: Vec::new(),
    }
}

/// A route builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct RouteFixture {
    pub path: String,
    pub name: String,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub meta: RouteMeta,
    pub children: Vec<RouteFixture>,
}

impl RouteFixture {
    /// Set the title.
    pub fn titled(mut self, title: &str) -> Self {
        self.meta.title = title.to_string();
        self
    }

    /// Set the icon.
    pub fn icon(mut self, icon: &str) -> Self {
        self.meta.icon = Some(icon.to_string());
        self
    }

    /// Render a view component.
    pub fn component(mut self, key: &str) -> Self {
        self.component = Some(key.to_string());
        self
    }

    /// Redirect elsewhere.
    pub fn redirect(mut self, to: &str) -> Self {
        self.redirect = Some(to.to_string());
        self
    }

    /// Restrict to a single authority.
    pub fn only(mut self, authority: Authority) -> Self {
        self.meta.authority = Some(AuthorityRule::One(authority));
        self
    }

    /// Restrict to any of the given authorities.
    pub fn any_of(mut self, authorities: &[Authority]) -> Self {
        self.meta.authority = Some(AuthorityRule::Any(authorities.to_vec()));
        self
    }

    /// Keep out of the menu.
    pub fn hidden(mut self) -> Self {
        self.meta.hide_menu = true;
        self
    }

    /// Show as a menu leaf.
    pub fn hide_children(mut self) -> Self {
        self.meta.hide_children_in_menu = true;
        self
    }

    /// Set the sibling order.
    pub fn order(mut self, order_no: i32) -> Self {
        self.meta.order_no = Some(order_no);
        self
    }

    /// Pin as a tab.
    pub fn affix(mut self) -> Self {
        self.meta.affix = true;
        self
    }

    /// Add a child route.
    pub fn child(mut self, child: RouteFixture) -> Self {
        self.children.push(child);
        self
    }

    /// Build the route node.
    pub fn build(self) -> RouteNode {
        let children: Vec<RouteNode> = self.children.into_iter().map(RouteFixture::build).collect();
        let component = self.component.map(ComponentRef::new);
        let node = RouteNode::container(self.path, self.name, component, self.meta, children);
        match self.redirect {
            Some(to) => node.with_redirect(to),
            None => node,
        }
    }
}

/// Build a list of fixtures.
pub fn build_all(fixtures: Vec<RouteFixture>) -> Vec<RouteNode> {
    fixtures.into_iter().map(RouteFixture::build).collect()
}

/// An IoT console catalog covering every authority, with one branch three
/// levels deep.
pub fn console_routes() -> Vec<RouteNode> {
    use Authority::{CustomerUser, SysAdmin, TenantAdmin};

    build_all(vec![
        test_route("/", "Root").redirect("/home").hidden(),
        test_route("/home", "Home").component("HomePage").icon("home").order(1).affix(),
        test_route("/tenants", "Tenants")
            .component("Layout")
            .only(SysAdmin)
            .order(2)
            .child(test_route("list", "TenantList").component("TenantTable"))
            .child(test_route(":tenantId", "TenantDetail").component("TenantDetails").hidden()),
        test_route("/entities", "Entities")
            .component("Layout")
            .any_of(&[TenantAdmin, CustomerUser])
            .order(3)
            .child(test_route("devices", "Devices").component("DeviceTable"))
            .child(
                test_route("assets", "Assets")
                    .component("Layout")
                    .child(test_route("list", "AssetList").component("AssetTable"))
                    .child(
                        test_route("profiles", "AssetProfiles")
                            .component("AssetProfileTable")
                            .only(TenantAdmin),
                    ),
            ),
        test_route("/settings", "Settings")
            .component("Layout")
            .any_of(&[SysAdmin, TenantAdmin])
            .child(test_route("general", "GeneralSettings").component("GeneralSettings"))
            .child(
                test_route("mail", "MailServer")
                    .component("MailServer")
                    .only(SysAdmin),
            ),
        test_route("/profile", "Profile").component("Profile").hidden(),
    ])
}

/// [`console_routes`] as a validated catalog.
pub fn console_catalog() -> RouteCatalog {
    match RouteCatalog::from_routes(console_routes()) {
        Ok(catalog) => catalog,
        Err(e) => panic!("console fixture catalog is invalid: {e}"),
    }
}

/// Assertion helpers for route and menu output.
pub mod assert {
    use serde_json::Value;
    use waypoint_kernel::{MenuNode, RouteNode};

    /// Names of the given routes, in order.
    pub fn route_names(routes: &[RouteNode]) -> Vec<String> {
        routes.iter().map(|r| r.name.clone()).collect()
    }

    /// Names of the given menu entries, in order.
    pub fn menu_names(menu: &[MenuNode]) -> Vec<String> {
        menu.iter().map(|m| m.name.clone()).collect()
    }

    /// Find a menu entry by name anywhere in the tree.
    pub fn find_menu<'a>(menu: &'a [MenuNode], name: &str) -> Option<&'a MenuNode> {
        menu.iter().find_map(|m| {
            if m.name == name {
                Some(m)
            } else {
                find_menu(&m.children, name)
            }
        })
    }

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}

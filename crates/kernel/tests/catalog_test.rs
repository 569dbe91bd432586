#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Route catalog loading tests.
//!
//! Loads the fixture catalogs in every supported format and checks that the
//! loaded trees feed the builder and the component registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use waypoint_kernel::route::{ComponentRegistry, LazyView, View};
use waypoint_kernel::{
    Authority, BuildOptions, PermissionService, RouteCatalog, RouteError, build_routes,
};
use waypoint_test_utils::assert::{contains, find_menu, has_key, menu_names};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn load_yaml_catalog() {
    let catalog = RouteCatalog::load(&fixture("console.yaml")).unwrap();
    assert_eq!(catalog.routes().len(), 4);
    assert_eq!(catalog.len(), 9);

    let tenants = catalog.find("Tenants").unwrap();
    assert!(tenants.meta.visible_to(Some(Authority::SysAdmin)));
    assert!(!tenants.meta.visible_to(Some(Authority::TenantAdmin)));
}

#[test]
fn load_json_catalog() {
    let catalog = RouteCatalog::load(&fixture("console.json")).unwrap();
    let set = build_routes(&catalog, Some(Authority::CustomerUser), &BuildOptions::default()).unwrap();
    assert_eq!(menu_names(&set.menu), ["Home", "Alarms"]);
}

#[test]
fn load_toml_catalog() {
    let catalog = RouteCatalog::load(&fixture("console.toml")).unwrap();
    let set = build_routes(&catalog, Some(Authority::SysAdmin), &BuildOptions::default()).unwrap();
    let general = find_menu(&set.menu, "GeneralSettings").unwrap();
    assert_eq!(general.path, "/settings/general");
    assert_eq!(general.title, "General");
}

#[test]
fn duplicate_names_fail_to_load() {
    let err = RouteCatalog::load(&fixture("duplicate_name.yaml")).unwrap_err();
    assert!(matches!(err, RouteError::Configuration(_)));
    contains(&err.to_string(), "'Home'");
}

#[test]
fn malformed_document_is_a_parse_error() {
    let err = RouteCatalog::parse("- path: [", waypoint_kernel::route::CatalogFormat::Yaml).unwrap_err();
    assert!(matches!(err, RouteError::Parse { .. }));
}

#[test]
fn yaml_catalog_builds_per_authority() {
    let catalog = RouteCatalog::load(&fixture("console.yaml")).unwrap();
    let service = PermissionService::new(catalog, BuildOptions::default());

    let tenant = service.route_set(Some(Authority::TenantAdmin)).unwrap();
    let assets = find_menu(&tenant.menu, "Assets").unwrap();
    assert_eq!(menu_names(&assets.children), ["AssetList", "AssetProfiles"]);

    let customer = service.route_set(Some(Authority::CustomerUser)).unwrap();
    let assets = find_menu(&customer.menu, "Assets").unwrap();
    assert_eq!(menu_names(&assets.children), ["AssetList"]);

    let json = serde_json::to_value(&*tenant).unwrap();
    has_key(&json, "routes");
    has_key(&json, "menu");
    assert_eq!(json["menu"][0]["affix"], true);
}

#[test]
fn yaml_catalog_components_resolve_lazily() {
    let catalog = RouteCatalog::load(&fixture("console.yaml")).unwrap();
    let mut registry = ComponentRegistry::new();
    for key in [
        "HomePage",
        "Layout",
        "TenantTable",
        "DeviceTable",
        "AssetTable",
        "AssetProfileTable",
    ] {
        let owned = key.to_string();
        registry.register(
            key,
            Arc::new(LazyView::new(move || {
                Ok(View {
                    key: owned.clone(),
                    source: format!("views/{owned}.vue"),
                })
            })),
        );
    }

    let home = catalog.find("Home").unwrap();
    let loader = registry.resolve(home).unwrap().unwrap();
    assert_eq!(loader.load().unwrap().source, "views/HomePage.vue");

    let service =
        PermissionService::with_registry(catalog, BuildOptions::default(), &registry).unwrap();
    assert!(service.login(Some(Authority::SysAdmin)).is_ok());
}

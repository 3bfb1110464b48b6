//! Declaring routes in controller scopes and generating their URLs

use http::Method;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};
use trellis_urls::{
	CompiledRoute, ParentResource, Priority, RouteError, RouteSpec, RouteTable, ScopeContext,
	UrlBuilder,
};

fn keyed(value: Value) -> Map<String, Value> {
	value.as_object().cloned().unwrap_or_default()
}

#[fixture]
fn shop() -> RouteTable<()> {
	let table = RouteTable::new();
	let root = ScopeContext::new();
	let product = ScopeContext::new()
		.with_controller("product")
		.with_parent(ParentResource::new("user"));
	let admin = ScopeContext::new()
		.with_controller("admin")
		.with_parent(ParentResource::new("shops").optional());

	let specs = [
		(RouteSpec::get("index"), &root),
		(RouteSpec::get("show").with_params(["id"]), &product),
		(RouteSpec::get("list").with_provides(["html", "js"]), &product),
		(RouteSpec::get("index"), &admin),
		(RouteSpec::get("/files/*path").with_name("file"), &root),
	];
	for (spec, scope) in specs {
		table.add(CompiledRoute::compile(&spec, scope).unwrap(), ());
	}
	table
}

#[rstest]
fn test_index_is_root(shop: RouteTable<()>) {
	let url = shop.url(&UrlBuilder::new(), "index", &[], &Map::new()).unwrap();
	assert_eq!(url, "/");
	assert_eq!(shop.match_candidates(&Method::GET, "/").len(), 1);
}

#[rstest]
fn test_parent_and_with_params(shop: RouteTable<()>) {
	let url = shop
		.url(
			&UrlBuilder::new(),
			"product_show",
			&[],
			&keyed(json!({"user_id": 5, "id": 10})),
		)
		.unwrap();
	assert_eq!(url, "/user/5/product/show/10");

	let candidates = shop.match_candidates(&Method::GET, "/user/5/product/show/10");
	assert_eq!(candidates.len(), 1);
	assert_eq!(candidates[0].captures.get("user_id"), Some("5"));
	assert_eq!(candidates[0].captures.get("id"), Some("10"));
}

#[rstest]
fn test_positional_values(shop: RouteTable<()>) {
	let url = shop
		.url(&UrlBuilder::new(), "product_show", &[json!(5), json!(10)], &Map::new())
		.unwrap();
	assert_eq!(url, "/user/5/product/show/10");
}

#[rstest]
#[case(json!({"user_id": 1}), "/user/1/product/list")]
#[case(json!({"user_id": 1, "format": "js"}), "/user/1/product/list.js")]
fn test_format_suffix(shop: RouteTable<()>, #[case] values: Value, #[case] expected: &str) {
	let url = shop
		.url(&UrlBuilder::new(), "product_list", &[], &keyed(values))
		.unwrap();
	assert_eq!(url, expected);
}

#[rstest]
fn test_optional_parent_both_ways(shop: RouteTable<()>) {
	assert_eq!(shop.match_candidates(&Method::GET, "/admin").len(), 1);
	assert_eq!(shop.match_candidates(&Method::GET, "/shops/3/admin").len(), 1);

	let builder = UrlBuilder::new();
	assert_eq!(shop.url(&builder, "admin_index", &[], &Map::new()).unwrap(), "/admin");
	assert_eq!(
		shop.url(&builder, "admin_index", &[], &keyed(json!({"shop_id": 3})))
			.unwrap(),
		"/shops/3/admin"
	);
}

#[rstest]
fn test_glob_route(shop: RouteTable<()>) {
	let candidates = shop.match_candidates(&Method::GET, "/files/docs/a.txt");
	assert_eq!(candidates[0].captures.get("path"), Some("docs/a.txt"));

	let url = shop
		.url(&UrlBuilder::new(), "file", &[], &keyed(json!({"path": ["docs", "a.txt"]})))
		.unwrap();
	assert_eq!(url, "/files/docs/a.txt");
}

#[rstest]
fn test_mounted_application(shop: RouteTable<()>) {
	let builder = UrlBuilder::new()
		.with_uri_root("/store/")
		.with_base_path("edge");
	let url = shop
		.url(&builder, "product_show", &[json!("a b"), json!(2)], &keyed(json!({"ref": "mail"})))
		.unwrap();
	assert_eq!(url, "/edge/store/user/a%20b/product/show/2?ref=mail");
}

#[rstest]
fn test_unknown_route_is_an_error(shop: RouteTable<()>) {
	let result = shop.url(&UrlBuilder::new(), "product_destroy", &[], &Map::new());
	assert!(matches!(result, Err(RouteError::UnrecognizedRoute { .. })));
}

#[rstest]
fn test_missing_parent_id_is_an_error(shop: RouteTable<()>) {
	let result = shop.url(&UrlBuilder::new(), "product_show", &[], &keyed(json!({"id": 1})));
	assert!(matches!(result, Err(RouteError::UnrecognizedRoute { .. })));
}

#[rstest]
fn test_low_priority_declared_first_matches_last() {
	let table: RouteTable<&'static str> = RouteTable::new();
	let scope = ScopeContext::new();
	let spec = RouteSpec::get("/:anything").with_priority("low".parse::<Priority>().unwrap());
	table.add(CompiledRoute::compile(&spec, &scope).unwrap(), "catch-all");
	table.add(
		CompiledRoute::compile(&RouteSpec::get("/contact"), &scope).unwrap(),
		"contact",
	);

	let order: Vec<&str> = table
		.match_candidates(&Method::GET, "/contact")
		.iter()
		.map(|c| *c.payload)
		.collect();
	assert_eq!(order, vec!["contact", "catch-all"]);
}

//! The facade crate's prelude covers a whole application declaration

use http::StatusCode;
use rstest::rstest;
use serde_json::Map;
use trellis::prelude::*;

fn app() -> Application {
	let settings = Settings::from_toml_str(
		r#"
uri_root = "/blog"

[mime_types]
atom = "application/atom+xml"
"#,
	)
	.unwrap();
	let mut app = Application::with_settings(&settings);
	app.controller(Controller::new("posts").with_provides(["html", "atom"]), |app| {
		app.get("index", |ctx, _| {
			let format = ctx.content_type().map(Format::as_str).unwrap_or("none").to_string();
			Ok(Response::from(format))
		})?;
		app.before(FilterOptions::new().with_name("index"), |ctx| {
			if ctx.request().header("x-banned").is_some() {
				return halt(StatusCode::FORBIDDEN);
			}
			Ok(())
		})?;
		Ok(())
	})
	.unwrap();
	app
}

#[rstest]
#[case("/posts", None, StatusCode::OK, "html")]
#[case("/posts.atom", None, StatusCode::OK, "atom")]
#[case("/posts", Some("application/atom+xml"), StatusCode::OK, "atom")]
#[case("/posts", Some("image/png"), StatusCode::NOT_ACCEPTABLE, "Not Acceptable")]
fn test_feed_formats(
	#[case] uri: &str,
	#[case] accept: Option<&str>,
	#[case] status: StatusCode,
	#[case] body: &str,
) {
	let mut builder = Request::builder().uri(uri);
	if let Some(accept) = accept {
		builder = builder.header("accept", accept);
	}
	let response = app().call(builder.build().unwrap());
	assert_eq!(response.status, status);
	assert_eq!(response.body_text(), body);
}

#[rstest]
fn test_filter_halts() {
	let request = Request::builder()
		.uri("/posts")
		.header("x-banned", "1")
		.build()
		.unwrap();
	assert_eq!(app().call(request).status, StatusCode::FORBIDDEN);
}

#[rstest]
fn test_urls_include_uri_root() {
	let app = app();
	assert_eq!(app.url("posts_index", &[], &Map::new()).unwrap(), "/blog/posts");
}

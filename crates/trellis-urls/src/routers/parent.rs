//! Parent resources
//!
//! A parent turns `product/show` into `user/:user_id/product/show`. Optional
//! parents wrap their segment in an optional group so both the nested and the
//! flat URL match.

use std::borrow::Cow;
use std::sync::Arc;

/// A resource a route is nested under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentResource {
	name: String,
	optional: bool,
	map: Option<String>,
	singular: Option<String>,
}

impl ParentResource {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			optional: false,
			map: None,
			singular: None,
		}
	}

	/// Make the parent segment optional
	pub fn optional(mut self) -> Self {
		self.optional = true;
		self
	}

	/// Use `map` as the URL segment instead of the name
	pub fn with_map(mut self, map: impl Into<String>) -> Self {
		self.map = Some(map.into());
		self
	}

	/// Override the singular form used for the id placeholder
	///
	/// # Examples
	///
	/// ```
	/// use trellis_urls::ParentResource;
	///
	/// let parent = ParentResource::new("people").with_singular("person");
	/// assert_eq!(parent.segment(), "people/:person_id/");
	/// ```
	pub fn with_singular(mut self, singular: impl Into<String>) -> Self {
		self.singular = Some(singular.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_optional(&self) -> bool {
		self.optional
	}

	pub fn map(&self) -> &str {
		self.map.as_deref().unwrap_or(&self.name)
	}

	pub fn singular(&self) -> Cow<'_, str> {
		match &self.singular {
			Some(singular) => Cow::Borrowed(singular),
			None => singularize(&self.name),
		}
	}

	/// Name of the id placeholder, e.g. `user_id`
	pub fn id_param(&self) -> String {
		format!("{}_id", self.singular())
	}

	/// `<map>/:<singular>_id/`, wrapped in `( )` when optional
	pub fn segment(&self) -> String {
		let segment = format!("{}/:{}/", self.map().trim_matches('/'), self.id_param());
		if self.optional {
			format!("({})", segment)
		} else {
			segment
		}
	}
}

/// Singular form of a resource name
///
/// `ies` becomes `y`; otherwise one trailing `s` is dropped unless the word
/// ends in `ss`. Irregular words need [`ParentResource::with_singular`].
///
/// # Examples
///
/// ```
/// use trellis_urls::routers::parent::singularize;
///
/// assert_eq!(singularize("categories"), "category");
/// assert_eq!(singularize("users"), "user");
/// assert_eq!(singularize("address"), "address");
/// assert_eq!(singularize("user"), "user");
/// ```
pub fn singularize(word: &str) -> Cow<'_, str> {
	if let Some(stem) = word.strip_suffix("ies")
		&& !stem.is_empty()
	{
		return Cow::Owned(format!("{}y", stem));
	}
	if word.ends_with("ss") {
		return Cow::Borrowed(word);
	}
	match word.strip_suffix('s') {
		Some(stem) if !stem.is_empty() => Cow::Borrowed(stem),
		_ => Cow::Borrowed(word),
	}
}

/// Scope parents followed by route parents, keeping the first occurrence
pub fn merge_parents(
	scope: &[Arc<ParentResource>],
	route: &[Arc<ParentResource>],
) -> Vec<Arc<ParentResource>> {
	let mut merged: Vec<Arc<ParentResource>> = Vec::with_capacity(scope.len() + route.len());
	for parent in scope.iter().chain(route) {
		if !merged.iter().any(|seen| seen == parent) {
			merged.push(Arc::clone(parent));
		}
	}
	merged
}

/// Prepend the parent segments to `path`
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use trellis_urls::ParentResource;
/// use trellis_urls::routers::parent::compose;
///
/// let parents = vec![
///     Arc::new(ParentResource::new("users")),
///     Arc::new(ParentResource::new("shops").optional()),
/// ];
/// assert_eq!(
///     compose("/product/show", &parents),
///     "users/:user_id/(shops/:shop_id/)product/show"
/// );
/// ```
pub fn compose(path: &str, parents: &[Arc<ParentResource>]) -> String {
	let prefix: String = parents.iter().map(|parent| parent.segment()).collect();
	format!("{}{}", prefix, path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("users", "user")]
	#[case("companies", "company")]
	#[case("class", "class")]
	#[case("status", "statu")]
	#[case("s", "s")]
	#[case("ies", "ies")]
	#[case("sheep", "sheep")]
	fn test_singularize(#[case] word: &str, #[case] expected: &str) {
		assert_eq!(singularize(word), expected);
	}

	#[rstest]
	fn test_segment_uses_map() {
		let parent = ParentResource::new("user").with_map("/members/");
		assert_eq!(parent.segment(), "members/:user_id/");
	}

	#[rstest]
	fn test_optional_segment() {
		let parent = ParentResource::new("user").optional();
		assert_eq!(parent.segment(), "(user/:user_id/)");
	}

	#[rstest]
	fn test_merge_parents_dedupes() {
		let user = Arc::new(ParentResource::new("user"));
		let shop = Arc::new(ParentResource::new("shop"));
		let merged = merge_parents(
			&[Arc::clone(&user)],
			&[Arc::new(ParentResource::new("user")), Arc::clone(&shop)],
		);
		let names: Vec<&str> = merged.iter().map(|p| p.name()).collect();
		assert_eq!(names, vec!["user", "shop"]);
	}
}

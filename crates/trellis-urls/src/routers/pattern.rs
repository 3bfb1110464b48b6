//! Path templates and the route matcher
//!
//! Template syntax:
//!
//! - literal text is matched exactly
//! - `:name` captures one path segment
//! - `*name` captures the rest of the path, `/` included
//! - `( ... )` is an optional group; groups nest and a trailing `?` after the
//!   closing parenthesis is accepted
//!
//! Regex routes use the expression as written, anchored at both ends.

use http::Method;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::route::CompiledRoute;
use super::table::Candidate;
use super::RouteError;

/// Maximum allowed length for a route template or pattern in bytes.
const MAX_PATTERN_LENGTH: usize = 2048;

/// Maximum allowed size for a compiled route regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Characters escaped when a value is written into a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'%')
	.add(b'/')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}')
	.add(b'[')
	.add(b']')
	.add(b'\\')
	.add(b'^')
	.add(b'|');

pub(crate) fn encode_segment(value: &str) -> String {
	utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Literal(String),
	Param(String),
	Glob(String),
	Optional(Vec<Token>),
}

struct TemplateParser<'a> {
	template: &'a str,
	root: Vec<Token>,
	open: Vec<Vec<Token>>,
	literal: String,
}

impl<'a> TemplateParser<'a> {
	fn new(template: &'a str) -> Self {
		Self {
			template,
			root: Vec::new(),
			open: Vec::new(),
			literal: String::new(),
		}
	}

	fn current(&mut self) -> &mut Vec<Token> {
		match self.open.last_mut() {
			Some(group) => group,
			None => &mut self.root,
		}
	}

	fn flush(&mut self) {
		if !self.literal.is_empty() {
			let literal = std::mem::take(&mut self.literal);
			self.current().push(Token::Literal(literal));
		}
	}

	fn error(&self, reason: &str) -> RouteError {
		RouteError::InvalidTemplate {
			template: self.template.to_string(),
			reason: reason.to_string(),
		}
	}

	fn parse(mut self) -> Result<Vec<Token>, RouteError> {
		let mut chars = self.template.chars().peekable();
		while let Some(c) = chars.next() {
			match c {
				':' | '*' => {
					let mut name = String::new();
					while let Some(&next) = chars.peek() {
						if next.is_ascii_alphanumeric() || next == '_' {
							name.push(next);
							chars.next();
						} else {
							break;
						}
					}
					if name.is_empty() {
						self.literal.push(c);
						continue;
					}
					self.flush();
					let token = if c == ':' {
						Token::Param(name)
					} else {
						Token::Glob(name)
					};
					self.current().push(token);
				}
				'(' => {
					self.flush();
					self.open.push(Vec::new());
				}
				')' => {
					self.flush();
					let Some(group) = self.open.pop() else {
						return Err(self.error("unbalanced ')'"));
					};
					self.current().push(Token::Optional(group));
					if chars.peek() == Some(&'?') {
						chars.next();
					}
				}
				_ => self.literal.push(c),
			}
		}
		self.flush();
		if !self.open.is_empty() {
			return Err(self.error("unclosed '('"));
		}
		Ok(self.root)
	}
}

fn push_regex(tokens: &[Token], out: &mut String) {
	for token in tokens {
		match token {
			Token::Literal(text) => out.push_str(&regex::escape(text)),
			Token::Param(name) => out.push_str(&format!("(?P<{}>[^/?#]+?)", name)),
			Token::Glob(name) => out.push_str(&format!("(?P<{}>.+?)", name)),
			Token::Optional(group) => {
				out.push_str("(?:");
				push_regex(group, out);
				out.push_str(")?");
			}
		}
	}
}

fn collect_names(tokens: &[Token], names: &mut Vec<String>) {
	for token in tokens {
		match token {
			Token::Param(name) | Token::Glob(name) => names.push(name.clone()),
			Token::Optional(group) => collect_names(group, names),
			Token::Literal(_) => {}
		}
	}
}

fn direct_names(tokens: &[Token]) -> impl Iterator<Item = &str> {
	tokens.iter().filter_map(|token| match token {
		Token::Param(name) | Token::Glob(name) => Some(name.as_str()),
		_ => None,
	})
}

fn render(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(encode_segment(s)),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Array(items) => {
			let parts: Option<Vec<String>> = items
				.iter()
				.map(|item| match item {
					Value::Array(_) => None,
					other => render(other),
				})
				.collect();
			parts.map(|parts| parts.join("/"))
		}
		Value::Null | Value::Object(_) => None,
	}
}

fn expand(
	tokens: &[Token],
	values: &Map<String, Value>,
	out: &mut String,
	consumed: &mut Vec<String>,
) -> Result<(), String> {
	for token in tokens {
		match token {
			Token::Literal(text) => out.push_str(text),
			Token::Param(name) | Token::Glob(name) => {
				let value = values
					.get(name)
					.ok_or_else(|| format!("missing required parameter '{}'", name))?;
				let rendered = render(value)
					.ok_or_else(|| format!("parameter '{}' can't be written into a path", name))?;
				out.push_str(&rendered);
				consumed.push(name.clone());
			}
			Token::Optional(group) => {
				let mut direct = direct_names(group).peekable();
				let has_direct = direct.peek().is_some();
				if has_direct && !direct.all(|name| values.contains_key(name)) {
					continue;
				}
				let mut buffer = String::new();
				let mut group_consumed = Vec::new();
				if expand(group, values, &mut buffer, &mut group_consumed).is_err() {
					continue;
				}
				if group_consumed.is_empty() {
					continue;
				}
				out.push_str(&buffer);
				consumed.extend(group_consumed);
			}
		}
	}
	Ok(())
}

/// Values captured from a matched path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
	/// Named captures in template order, percent-decoded
	pub named: Vec<(String, String)>,
	/// Positional groups of a regex route without named groups
	pub positional: Vec<Option<String>>,
}

impl Captures {
	pub fn get(&self, name: &str) -> Option<&str> {
		self.named
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	pub fn is_empty(&self) -> bool {
		self.named.is_empty() && self.positional.is_empty()
	}
}

/// Compiled path template or regex pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
	source: String,
	regex: Regex,
	tokens: Option<Vec<Token>>,
	param_names: Vec<String>,
}

fn check_length(source: &str) -> Result<(), RouteError> {
	if source.len() > MAX_PATTERN_LENGTH {
		return Err(RouteError::InvalidTemplate {
			template: source.chars().take(64).collect(),
			reason: format!(
				"length {} exceeds maximum allowed length of {} bytes",
				source.len(),
				MAX_PATTERN_LENGTH
			),
		});
	}
	Ok(())
}

impl PathPattern {
	/// Compile a path template
	///
	/// # Examples
	///
	/// ```
	/// use trellis_urls::PathPattern;
	///
	/// let pattern = PathPattern::template("/users/:id(.:format)").unwrap();
	/// assert_eq!(pattern.param_names(), ["id", "format"]);
	///
	/// let captures = pattern.captures("/users/42.json").unwrap();
	/// assert_eq!(captures.get("id"), Some("42"));
	/// assert_eq!(captures.get("format"), Some("json"));
	/// assert!(pattern.captures("/users/42/edit").is_none());
	/// ```
	pub fn template(template: &str) -> Result<Self, RouteError> {
		check_length(template)?;
		let tokens = TemplateParser::new(template).parse()?;

		let mut param_names = Vec::new();
		collect_names(&tokens, &mut param_names);
		for (i, name) in param_names.iter().enumerate() {
			if param_names[..i].contains(name) {
				return Err(RouteError::InvalidTemplate {
					template: template.to_string(),
					reason: format!("placeholder '{}' appears more than once", name),
				});
			}
		}

		let mut regex_str = String::from("^");
		push_regex(&tokens, &mut regex_str);
		regex_str.push('$');
		let regex = RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()?;

		Ok(Self {
			source: template.to_string(),
			regex,
			tokens: Some(tokens),
			param_names,
		})
	}

	/// Compile a regex route, anchored at both ends
	pub fn regex(pattern: &str) -> Result<Self, RouteError> {
		check_length(pattern)?;
		let regex = RegexBuilder::new(&format!("^(?:{})$", pattern))
			.size_limit(MAX_REGEX_SIZE)
			.build()?;
		let param_names = regex.capture_names().flatten().map(str::to_string).collect();
		Ok(Self {
			source: pattern.to_string(),
			regex,
			tokens: None,
			param_names,
		})
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn is_template(&self) -> bool {
		self.tokens.is_some()
	}

	/// Placeholder names in declaration order
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Match `path` and extract its captures
	pub fn captures(&self, path: &str) -> Option<Captures> {
		let caps = self.regex.captures(path)?;
		let named: Vec<(String, String)> = self
			.param_names
			.iter()
			.filter_map(|name| {
				caps.name(name).map(|m| {
					let value = percent_decode_str(m.as_str()).decode_utf8_lossy();
					(name.clone(), value.into_owned())
				})
			})
			.collect();

		let positional = if self.tokens.is_none() && self.param_names.is_empty() {
			caps.iter()
				.skip(1)
				.map(|m| m.map(|m| m.as_str().to_string()))
				.collect()
		} else {
			Vec::new()
		};

		Some(Captures { named, positional })
	}

	/// Write the template with `values` filled in
	///
	/// Names of the values that ended up in the path are pushed to `consumed`.
	/// Optional groups are only written when every placeholder they hold has a
	/// value.
	pub(crate) fn generate(
		&self,
		values: &Map<String, Value>,
		consumed: &mut Vec<String>,
	) -> Result<String, String> {
		let Some(tokens) = &self.tokens else {
			return Err("regex routes can't be generated".to_string());
		};
		let mut out = String::new();
		expand(tokens, values, &mut out, consumed)?;
		Ok(out)
	}
}

/// Ordered list of compiled routes queried per request
pub struct PathMatcher<T> {
	entries: Vec<(Arc<CompiledRoute>, Arc<T>)>,
}

impl<T> PathMatcher<T> {
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
		}
	}

	pub fn push(&mut self, route: Arc<CompiledRoute>, payload: Arc<T>) {
		self.entries.push((route, payload));
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn routes(&self) -> impl Iterator<Item = &Arc<CompiledRoute>> {
		self.entries.iter().map(|(route, _)| route)
	}

	/// Every route answering `method` on `path`, in insertion order
	///
	/// `GET` routes answer `HEAD` as well.
	pub fn candidates(&self, method: &Method, path: &str) -> Vec<Candidate<T>> {
		self.entries
			.iter()
			.filter(|(route, _)| route.answers(method))
			.filter_map(|(route, payload)| {
				let captures = route.pattern.captures(path)?;
				tracing::trace!(route = %route.path, %path, "route matched");
				Some(Candidate {
					route: Arc::clone(route),
					payload: Arc::clone(payload),
					captures,
				})
			})
			.collect()
	}

	/// Methods of the routes matching `path`, `HEAD` added next to `GET`
	pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
		let mut methods: Vec<Method> = Vec::new();
		for (route, _) in &self.entries {
			if !route.pattern.is_match(path) {
				continue;
			}
			if !methods.contains(&route.method) {
				methods.push(route.method.clone());
			}
			if route.method == Method::GET && !methods.contains(&Method::HEAD) {
				methods.push(Method::HEAD);
			}
		}
		methods
	}
}

impl<T> Default for PathMatcher<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn generate(template: &str, values: Value) -> Result<(String, Vec<String>), String> {
		let pattern = PathPattern::template(template).unwrap();
		let mut consumed = Vec::new();
		let values = values.as_object().cloned().unwrap_or_default();
		pattern
			.generate(&values, &mut consumed)
			.map(|url| (url, consumed))
	}

	#[rstest]
	#[case("/", "/", true)]
	#[case("/list(.:format)", "/list", true)]
	#[case("/list(.:format)", "/list.js", true)]
	#[case("/list(.:format)", "/lists", false)]
	#[case("/files/*path", "/files/a/b/c", true)]
	#[case("/files/*path", "/files/", false)]
	#[case("/show(/)", "/show/", true)]
	#[case("/show(/)", "/show", true)]
	#[case("/(user/:user_id/)product", "/product", true)]
	#[case("/(user/:user_id/)product", "/user/3/product", true)]
	#[case("/a.b", "/axb", false)]
	fn test_template_matching(#[case] template: &str, #[case] path: &str, #[case] matches: bool) {
		let pattern = PathPattern::template(template).unwrap();
		assert_eq!(pattern.is_match(path), matches, "{} against {}", template, path);
	}

	#[rstest]
	fn test_captures_are_decoded() {
		let pattern = PathPattern::template("/tags/:tag").unwrap();
		let captures = pattern.captures("/tags/rust%20lang").unwrap();
		assert_eq!(captures.get("tag"), Some("rust lang"));
	}

	#[rstest]
	fn test_glob_capture_spans_segments() {
		let pattern = PathPattern::template("/files/*path").unwrap();
		let captures = pattern.captures("/files/a/b.txt").unwrap();
		assert_eq!(captures.get("path"), Some("a/b.txt"));
	}

	#[rstest]
	fn test_trailing_question_mark_after_group() {
		let pattern = PathPattern::template("/list(.:format)?").unwrap();
		assert!(pattern.is_match("/list.xml"));
		assert!(pattern.is_match("/list"));
	}

	#[rstest]
	#[case("/users/(:id")]
	#[case("/users/:id)")]
	fn test_unbalanced_groups(#[case] template: &str) {
		assert!(matches!(
			PathPattern::template(template),
			Err(RouteError::InvalidTemplate { .. })
		));
	}

	#[rstest]
	fn test_duplicate_placeholder() {
		assert!(matches!(
			PathPattern::template("/:id/:id"),
			Err(RouteError::InvalidTemplate { .. })
		));
	}

	#[rstest]
	fn test_regex_positional_captures() {
		let pattern = PathPattern::regex(r"/archive/(\d{4})/(\d{2})").unwrap();
		let captures = pattern.captures("/archive/2024/05").unwrap();
		assert!(captures.named.is_empty());
		assert_eq!(
			captures.positional,
			vec![Some("2024".to_string()), Some("05".to_string())]
		);
		assert!(pattern.captures("/archive/2024/05/extra").is_none());
	}

	#[rstest]
	fn test_regex_named_captures() {
		let pattern = PathPattern::regex(r"/posts/(?P<slug>[a-z-]+)").unwrap();
		let captures = pattern.captures("/posts/hello-world").unwrap();
		assert_eq!(captures.get("slug"), Some("hello-world"));
		assert!(captures.positional.is_empty());
	}

	#[rstest]
	fn test_invalid_regex() {
		assert!(matches!(
			PathPattern::regex("/posts/(unclosed"),
			Err(RouteError::InvalidPattern(_))
		));
	}

	#[rstest]
	fn test_generate_fills_placeholders() {
		let (url, consumed) = generate("/users/:id/posts/:post_id", json!({"id": "7", "post_id": "9"})).unwrap();
		assert_eq!(url, "/users/7/posts/9");
		assert_eq!(consumed, vec!["id", "post_id"]);
	}

	#[rstest]
	fn test_generate_skips_incomplete_optional_group() {
		let (url, consumed) = generate("/(user/:user_id/)product/:id(.:format)", json!({"id": "1"})).unwrap();
		assert_eq!(url, "/product/1");
		assert_eq!(consumed, vec!["id"]);

		let (url, _) = generate(
			"/(user/:user_id/)product/:id(.:format)",
			json!({"id": "1", "user_id": "2", "format": "json"}),
		)
		.unwrap();
		assert_eq!(url, "/user/2/product/1.json");
	}

	#[rstest]
	fn test_generate_drops_parameterless_group() {
		let (url, _) = generate("/show(/)", json!({})).unwrap();
		assert_eq!(url, "/show");
	}

	#[rstest]
	fn test_generate_encodes_values() {
		let (url, _) = generate("/tags/:tag", json!({"tag": "a b/c?"})).unwrap();
		assert_eq!(url, "/tags/a%20b%2Fc%3F");
	}

	#[rstest]
	fn test_generate_glob_from_array() {
		let (url, _) = generate("/files/*path", json!({"path": ["docs", "read me.txt"]})).unwrap();
		assert_eq!(url, "/files/docs/read%20me.txt");
	}

	#[rstest]
	fn test_generate_missing_parameter() {
		let err = generate("/users/:id", json!({})).unwrap_err();
		assert!(err.contains("'id'"));
	}
}

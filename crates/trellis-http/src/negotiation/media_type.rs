//! Media type parsing

/// A single media range from an Accept header
#[derive(Debug, Clone, PartialEq)]
pub struct MediaType {
	pub type_: String,
	pub subtype: String,
	pub quality: f32,
	pub parameters: Vec<(String, String)>,
}

impl MediaType {
	/// Creates a media type with quality 1.0
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::MediaType;
	///
	/// let media_type = MediaType::new("text", "html");
	/// assert_eq!(media_type.essence(), "text/html");
	/// assert_eq!(media_type.quality, 1.0);
	/// ```
	pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
		Self {
			type_: type_.into(),
			subtype: subtype.into(),
			quality: 1.0,
			parameters: Vec::new(),
		}
	}

	/// Parses one media range such as `text/html; q=0.8; level=1`
	///
	/// Returns `None` for entries without a `/`.
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::MediaType;
	///
	/// let parsed = MediaType::parse("application/json; q=0.5").unwrap();
	/// assert_eq!(parsed.essence(), "application/json");
	/// assert_eq!(parsed.quality, 0.5);
	///
	/// assert!(MediaType::parse("garbage").is_none());
	/// ```
	pub fn parse(input: &str) -> Option<Self> {
		let mut parts = input.split(';');
		let essence = parts.next()?.trim();
		let (type_, subtype) = essence.split_once('/')?;
		if type_.is_empty() || subtype.is_empty() {
			return None;
		}

		let mut media_type = Self::new(type_.to_ascii_lowercase(), subtype.to_ascii_lowercase());
		for param in parts {
			let Some((key, value)) = param.split_once('=') else {
				continue;
			};
			let key = key.trim().to_ascii_lowercase();
			let value = value.trim().trim_matches('"').to_string();
			if key == "q" {
				media_type.quality = value.parse::<f32>().unwrap_or(1.0).clamp(0.0, 1.0);
			} else {
				media_type.parameters.push((key, value));
			}
		}
		Some(media_type)
	}

	/// `type/subtype` without parameters
	pub fn essence(&self) -> String {
		format!("{}/{}", self.type_, self.subtype)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("text/html", "text/html", 1.0)]
	#[case("TEXT/HTML;q=0.3", "text/html", 0.3)]
	#[case("application/json; charset=utf-8", "application/json", 1.0)]
	#[case("*/*; q=0.1", "*/*", 0.1)]
	#[case("text/plain;q=7", "text/plain", 1.0)]
	fn test_parse(#[case] input: &str, #[case] essence: &str, #[case] quality: f32) {
		let parsed = MediaType::parse(input).unwrap();
		assert_eq!(parsed.essence(), essence);
		assert_eq!(parsed.quality, quality);
	}
}

//! Accept header parsing

use super::media_type::MediaType;

/// Represents an Accept header
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
	pub media_types: Vec<MediaType>,
}

impl AcceptHeader {
	/// Parses an Accept header string into an AcceptHeader struct
	///
	/// Entries are ordered by quality, highest first; entries with equal
	/// quality keep their header order.
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::AcceptHeader;
	///
	/// let accept = AcceptHeader::parse("application/json, text/html; q=0.9");
	/// assert_eq!(accept.media_types.len(), 2);
	/// assert_eq!(accept.media_types[0].quality, 1.0);
	/// assert_eq!(accept.media_types[1].quality, 0.9);
	///
	/// let complex = AcceptHeader::parse("text/html;q=0.8, application/json, */*; q=0.1");
	/// assert_eq!(complex.essences(), vec!["application/json", "text/html", "*/*"]);
	/// ```
	pub fn parse(header: &str) -> Self {
		let mut media_types: Vec<MediaType> = header
			.split(',')
			.filter_map(|s| MediaType::parse(s.trim()))
			.collect();

		media_types.sort_by(|a, b| b.quality.total_cmp(&a.quality));

		Self { media_types }
	}

	/// Creates an empty AcceptHeader with no media types
	pub fn empty() -> Self {
		Self {
			media_types: Vec::new(),
		}
	}

	/// Whether the header carried no usable media ranges
	pub fn is_empty(&self) -> bool {
		self.media_types.is_empty()
	}

	/// `type/subtype` strings in preference order
	pub fn essences(&self) -> Vec<String> {
		self.media_types.iter().map(MediaType::essence).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_accept_header() {
		let accept = AcceptHeader::parse("application/json, text/html; q=0.9");
		assert_eq!(accept.media_types.len(), 2);
		assert_eq!(accept.media_types[0].quality, 1.0);
	}

	#[rstest]
	fn test_invalid_entries_are_skipped() {
		let accept = AcceptHeader::parse("nonsense, text/plain, ");
		assert_eq!(accept.essences(), vec!["text/plain"]);
	}

	#[rstest]
	fn test_equal_quality_keeps_order() {
		let accept = AcceptHeader::parse("text/css, text/html, application/xml");
		assert_eq!(
			accept.essences(),
			vec!["text/css", "text/html", "application/xml"]
		);
	}
}

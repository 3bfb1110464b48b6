//! Content negotiation for routes that declare the formats they provide

use trellis_http::{AcceptHeader, Format, MimeRegistry};

/// Outcome of negotiating one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiation {
	/// The route answers with this format
	Accepted(Format),
	/// The route doesn't apply; try the next candidate
	Unmatched,
	/// The client asked for formats the route can't produce
	NotAcceptable,
}

/// Inputs of a negotiation
#[derive(Debug, Clone, Copy)]
pub struct NegotiationRequest<'a> {
	pub provides: &'a [Format],
	pub accept: &'a AcceptHeader,
	/// Extension given in the URL, e.g. `js` for `/list.js`
	pub url_format: Option<&'a Format>,
	/// Reject URL extensions the route doesn't provide
	pub treat_format_as_accept: bool,
}

/// Pick the response format of a route
///
/// A bare `*/*` (or no Accept header) expresses no preference and selects
/// the first provided format. Otherwise the Accept entries are intersected
/// with the provided formats in preference order. A URL extension wins over
/// the Accept header.
///
/// # Examples
///
/// ```
/// use trellis_dispatch::negotiation::{Negotiation, NegotiationRequest, negotiate};
/// use trellis_http::{AcceptHeader, Format, MimeRegistry};
///
/// let registry = MimeRegistry::new();
/// let provides = [Format::new("html"), Format::new("js")];
///
/// let none = AcceptHeader::empty();
/// let request = NegotiationRequest { provides: &provides, accept: &none, url_format: None, treat_format_as_accept: false };
/// assert_eq!(negotiate(&request, &registry), Negotiation::Accepted(Format::html()));
///
/// let json = AcceptHeader::parse("application/json");
/// let request = NegotiationRequest { accept: &json, ..request };
/// assert_eq!(negotiate(&request, &registry), Negotiation::NotAcceptable);
///
/// let js = Format::new("js");
/// let request = NegotiationRequest { url_format: Some(&js), ..request };
/// assert_eq!(negotiate(&request, &registry), Negotiation::Accepted(js.clone()));
/// ```
pub fn negotiate(request: &NegotiationRequest<'_>, registry: &MimeRegistry) -> Negotiation {
	let provides: Vec<Format> = request
		.provides
		.iter()
		.map(|format| registry.canonical(format))
		.collect();
	let provides_any = provides.iter().any(Format::is_any);
	let url_format = request.url_format.map(|format| registry.canonical(format));

	let mut accepts = request.accept.essences();
	if accepts.len() == 1 && accepts[0] == "*/*" {
		accepts.clear();
	}
	let catch_all = match accepts.iter().position(|mime| mime == "*/*") {
		Some(index) => {
			accepts.remove(index);
			true
		}
		None => false,
	};

	let mut matching: Vec<Format> = if accepts.is_empty() {
		provides
			.iter()
			.filter(|format| !format.is_any())
			.take(1)
			.cloned()
			.collect()
	} else {
		accepts
			.iter()
			.filter_map(|mime| {
				registry
					.formats_for(mime)
					.into_iter()
					.find(|format| provides.contains(format))
			})
			.collect()
	};
	if matching.is_empty() && provides_any {
		matching = accepts
			.iter()
			.map(|mime| registry.format_for(mime).unwrap_or_else(|| Format::new(mime)))
			.collect();
	}

	let accept_format = if url_format.is_none() && !matching.is_empty() {
		matching.first().cloned()
	} else if catch_all && !provides_any {
		provides.first().cloned()
	} else {
		None
	};

	let matched = provides_any
		|| accept_format
			.as_ref()
			.is_some_and(|format| provides.contains(format))
		|| url_format
			.as_ref()
			.is_some_and(|format| provides.contains(format))
		|| (url_format.is_none()
			&& request.accept.is_empty()
			&& provides.contains(&Format::html()));

	if matched {
		let format = url_format.or(accept_format).unwrap_or_else(Format::html);
		return Negotiation::Accepted(registry.canonical(&format));
	}

	let header_rejects = url_format.is_none() && !accepts.is_empty();
	let extension_rejects = request.treat_format_as_accept && url_format.is_some();
	if header_rejects || extension_rejects {
		Negotiation::NotAcceptable
	} else {
		Negotiation::Unmatched
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn run(
		provides: &[&str],
		accept: Option<&str>,
		url_format: Option<&str>,
		treat_format_as_accept: bool,
	) -> Negotiation {
		let provides: Vec<Format> = provides.iter().map(|f| Format::new(*f)).collect();
		let accept = accept.map(AcceptHeader::parse).unwrap_or_else(AcceptHeader::empty);
		let url_format = url_format.map(Format::new);
		negotiate(
			&NegotiationRequest {
				provides: &provides,
				accept: &accept,
				url_format: url_format.as_ref(),
				treat_format_as_accept,
			},
			&MimeRegistry::new(),
		)
	}

	fn accepted(format: &str) -> Negotiation {
		Negotiation::Accepted(Format::new(format))
	}

	#[rstest]
	#[case(&["html", "js"], None, None, accepted("html"))]
	#[case(&["html", "js"], Some("*/*"), None, accepted("html"))]
	#[case(&["html", "js"], Some("application/json"), None, Negotiation::NotAcceptable)]
	#[case(&["html", "js"], Some("application/json"), Some("js"), accepted("js"))]
	#[case(&["html", "js"], Some("text/javascript, text/html"), None, accepted("js"))]
	#[case(&["html", "js"], Some("text/html;q=0.5, application/javascript"), None, accepted("js"))]
	#[case(&["json"], Some("text/html, */*;q=0.1"), None, accepted("json"))]
	#[case(&["html"], None, Some("htm"), accepted("html"))]
	#[case(&["json"], None, Some("xml"), Negotiation::Unmatched)]
	fn test_negotiation(
		#[case] provides: &[&str],
		#[case] accept: Option<&str>,
		#[case] url_format: Option<&str>,
		#[case] expected: Negotiation,
	) {
		assert_eq!(run(provides, accept, url_format, false), expected);
	}

	#[rstest]
	#[case(&["webm"], "video/webm", "webm")]
	#[case(&["jpg"], "image/jpeg", "jpg")]
	#[case(&["csv", "json"], "text/csv", "csv")]
	fn test_extension_table_formats(
		#[case] provides: &[&str],
		#[case] accept: &str,
		#[case] expected: &str,
	) {
		assert_eq!(run(provides, Some(accept), None, false), accepted(expected));
	}

	#[rstest]
	fn test_treat_format_as_accept() {
		assert_eq!(run(&["json"], None, Some("xml"), true), Negotiation::NotAcceptable);
		assert_eq!(run(&["json"], None, Some("json"), true), accepted("json"));
	}

	#[rstest]
	fn test_any_accepts_raw_mime() {
		assert_eq!(
			run(&["any"], Some("application/vnd.api+json"), None, false),
			Negotiation::Accepted(Format::new("application/vnd.api+json"))
		);
		assert_eq!(run(&["html", "any"], Some("application/json"), None, false), accepted("json"));
		assert_eq!(run(&["any"], None, None, false), accepted("html"));
	}
}

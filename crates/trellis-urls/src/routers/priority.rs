//! Route priorities

use std::fmt;
use std::str::FromStr;

use super::RouteError;

/// Matching priority of a route
///
/// Routes are inserted into the matcher bucket by bucket, `High` first;
/// inside a bucket declaration order is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
	High = 0,
	#[default]
	Normal = 1,
	Low = 2,
}

impl Priority {
	pub const ALL: [Priority; 3] = [Priority::High, Priority::Normal, Priority::Low];

	/// Bucket index of this priority
	pub fn index(self) -> usize {
		self as usize
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Priority::High => "high",
			Priority::Normal => "normal",
			Priority::Low => "low",
		}
	}
}

impl FromStr for Priority {
	type Err = RouteError;

	/// # Examples
	///
	/// ```
	/// use trellis_urls::Priority;
	///
	/// assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
	/// assert!("urgent".parse::<Priority>().is_err());
	/// ```
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"high" => Ok(Priority::High),
			"normal" => Ok(Priority::Normal),
			"low" => Ok(Priority::Low),
			other => Err(RouteError::PriorityUnrecognized(other.to_string())),
		}
	}
}

impl fmt::Display for Priority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("high", Priority::High, 0)]
	#[case("normal", Priority::Normal, 1)]
	#[case("low", Priority::Low, 2)]
	fn test_parse_labels(#[case] label: &str, #[case] expected: Priority, #[case] index: usize) {
		let priority: Priority = label.parse().unwrap();
		assert_eq!(priority, expected);
		assert_eq!(priority.index(), index);
		assert_eq!(priority.to_string(), label);
	}

	#[rstest]
	#[case("HIGH")]
	#[case("")]
	#[case("medium")]
	fn test_unknown_label(#[case] label: &str) {
		let err = label.parse::<Priority>().unwrap_err();
		assert!(matches!(err, RouteError::PriorityUnrecognized(ref l) if l == label));
	}
}

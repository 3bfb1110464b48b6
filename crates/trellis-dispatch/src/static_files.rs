//! Static file lookup consulted before routing

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Finds the file serving a request path
pub trait StaticFiles: Send + Sync {
	fn lookup(&self, path: &str) -> Option<PathBuf>;
}

/// Files below a public directory
#[derive(Debug, Clone)]
pub struct StaticDirectory {
	root: PathBuf,
}

impl StaticDirectory {
	pub fn new(root: impl AsRef<Path>) -> Self {
		Self {
			root: root.as_ref().to_path_buf(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl StaticFiles for StaticDirectory {
	/// Regular file at `root/path`; paths escaping the root are ignored
	fn lookup(&self, path: &str) -> Option<PathBuf> {
		let decoded = percent_decode_str(path).decode_utf8().ok()?;
		let relative = Path::new(decoded.trim_start_matches('/'));
		if relative.as_os_str().is_empty()
			|| relative
				.components()
				.any(|component| !matches!(component, Component::Normal(_)))
		{
			return None;
		}
		let candidate = self.root.join(relative);
		if candidate.is_file() {
			tracing::debug!(path, file = %candidate.display(), "static file found");
			Some(candidate)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::fs;
	use tempfile::TempDir;

	fn public_dir() -> TempDir {
		let dir = TempDir::new().unwrap();
		fs::create_dir_all(dir.path().join("css")).unwrap();
		fs::write(dir.path().join("css/site.css"), "body {}").unwrap();
		fs::write(dir.path().join("read me.txt"), "hi").unwrap();
		dir
	}

	#[rstest]
	#[case("/css/site.css", true)]
	#[case("/read%20me.txt", true)]
	#[case("/css", false)]
	#[case("/", false)]
	#[case("/missing.js", false)]
	#[case("/../etc/passwd", false)]
	#[case("/css/%2e%2e/css/site.css", false)]
	fn test_lookup(#[case] path: &str, #[case] found: bool) {
		let dir = public_dir();
		let files = StaticDirectory::new(dir.path());
		assert_eq!(files.lookup(path).is_some(), found, "{}", path);
	}
}

//! Per-document inlay hint configuration.
//!
//! Loaded once per pipeline. TOML form:
//!
//! ```toml
//! filetypes = ["rust", "typescript"]
//! namespace = "inlay-hint"
//! render_mode = "column"
//! debounce_ms = 100
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Default quiescence window before a render fires.
pub const RENDER_DEBOUNCE: Duration = Duration::from_millis(100);

/// Default overlay namespace.
pub const DEFAULT_NAMESPACE: &str = "inlay-hint";

/// Host capability selecting the overlay painting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
	/// Host supports arbitrary per-line virtual text; hints on one line are concatenated.
	#[default]
	Line,
	/// Host only anchors virtual text at a column; each hint is placed individually.
	Column,
}

/// Inlay hint settings for one document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InlayHintConfig {
	/// File types hints are enabled for. `*` enables all; empty disables.
	pub filetypes: Vec<String>,
	/// Overlay namespace painted marks are grouped under.
	pub namespace: String,
	/// Painting strategy supported by the host.
	pub render_mode: RenderMode,
	/// Debounce window in milliseconds.
	pub debounce_ms: u64,
}

impl Default for InlayHintConfig {
	fn default() -> Self {
		Self {
			filetypes: vec!["*".to_string()],
			namespace: DEFAULT_NAMESPACE.to_string(),
			render_mode: RenderMode::default(),
			debounce_ms: RENDER_DEBOUNCE.as_millis() as u64,
		}
	}
}

impl InlayHintConfig {
	/// Parses and validates a TOML configuration.
	pub fn from_toml(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks constraints serde cannot express.
	pub fn validate(&self) -> Result<()> {
		if self.namespace.trim().is_empty() {
			return Err(Error::InvalidConfig("namespace must not be empty".into()));
		}
		Ok(())
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Returns true if `file_type` passes the allow-list.
	pub fn allows(&self, file_type: &str) -> bool {
		matches_filetype(&self.filetypes, file_type)
	}

	pub fn with_filetypes<I, S>(mut self, filetypes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.filetypes = filetypes.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
		self.render_mode = render_mode;
		self
	}

	pub fn with_debounce(mut self, debounce: Duration) -> Self {
		self.debounce_ms = debounce.as_millis() as u64;
		self
	}
}

/// Exact or wildcard (`*`) file type match.
pub(crate) fn matches_filetype(filetypes: &[String], file_type: &str) -> bool {
	filetypes.iter().any(|ft| ft == "*" || ft == file_type)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_enable_everything() {
		let config = InlayHintConfig::default();
		assert!(config.allows("rust"));
		assert!(config.allows(""));
		assert_eq!(config.debounce(), RENDER_DEBOUNCE);
		assert_eq!(config.render_mode, RenderMode::Line);
	}

	#[test]
	fn empty_filetypes_disable() {
		let config = InlayHintConfig::default().with_filetypes(Vec::<String>::new());
		assert!(!config.allows("rust"));
	}

	#[test]
	fn parses_toml() {
		let config = InlayHintConfig::from_toml(
			r#"
			filetypes = ["rust", "typescript"]
			namespace = "hints"
			render_mode = "column"
			debounce_ms = 25
			"#,
		)
		.expect("valid config");

		assert!(config.allows("rust"));
		assert!(!config.allows("python"));
		assert_eq!(config.namespace, "hints");
		assert_eq!(config.render_mode, RenderMode::Column);
		assert_eq!(config.debounce(), Duration::from_millis(25));
	}

	#[test]
	fn missing_fields_use_defaults() {
		let config = InlayHintConfig::from_toml("render_mode = \"line\"").expect("valid config");
		assert_eq!(config.filetypes, vec!["*".to_string()]);
		assert_eq!(config.namespace, DEFAULT_NAMESPACE);
	}

	#[test]
	fn unknown_field_is_rejected() {
		assert!(matches!(InlayHintConfig::from_toml("colour = 1"), Err(Error::Config(_))));
	}

	#[test]
	fn blank_namespace_is_rejected() {
		assert!(matches!(InlayHintConfig::from_toml("namespace = \"  \""), Err(Error::InvalidConfig(_))));
	}
}

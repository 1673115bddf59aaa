/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the inlay hint pipeline.
///
/// Disabled and stale cycles are not errors; they are reported through
/// [`crate::RenderOutcome`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// An inlay hint provider failed while computing hints.
	#[error("inlay hint provider failed: {0}")]
	Provider(#[source] anyhow::Error),
	/// Configuration text could not be parsed.
	#[error("invalid inlay hint config: {0}")]
	Config(#[from] toml::de::Error),
	/// Configuration parsed but violates a constraint.
	#[error("invalid inlay hint config: {0}")]
	InvalidConfig(String),
}

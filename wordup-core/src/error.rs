//! Error type shared by every stage of the engine.

use std::path::Path;

use thiserror::Error;

/// Errors surfaced by `wordup-core`.
///
/// An empty corpus is deliberately absent: it is a valid terminal state
/// reported through [`crate::model::generator::Outcome::EmptyCorpus`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordUpError {
	/// Invalid parameter combination, raised before any model is built.
	#[error("Configuration error: {message}")]
	Config { message: String },

	#[error("IO error: {message}")]
	Io {
		message: String,
		path: Option<String>,
	},

	/// Broken internal invariant (poisoned lock, panicked worker, model mismatch).
	#[error("Internal error: {message}")]
	Internal { message: String },
}

impl WordUpError {
	/// Create a configuration error
	pub fn config(message: impl Into<String>) -> Self {
		Self::Config {
			message: message.into(),
		}
	}

	/// Create an IO error tied to a path
	pub fn io_at<P: AsRef<Path>>(message: impl Into<String>, path: P) -> Self {
		Self::Io {
			message: message.into(),
			path: Some(path.as_ref().display().to_string()),
		}
	}

	/// Create an internal error
	pub fn internal(message: impl Into<String>) -> Self {
		Self::Internal {
			message: message.into(),
		}
	}

	/// Whether the error comes from a bad configuration.
	pub fn is_config(&self) -> bool {
		matches!(self, Self::Config { .. })
	}
}

impl From<std::io::Error> for WordUpError {
	fn from(err: std::io::Error) -> Self {
		Self::Io {
			message: err.to_string(),
			path: None,
		}
	}
}

/// Result type alias for `wordup-core`.
pub type Result<T> = std::result::Result<T, WordUpError>;

//! Error type shared by every menucard crate

use crate::link::SyncReport;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	DbError,
	Parse,
	Timeout,
	ValidationError(String),
	/// Some scheduled link writes failed; the ones in `report` stay applied.
	SyncIncomplete {
		failed: usize,
		total: usize,
		report: Box<SyncReport>,
	},
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::Timeout => write!(f, "operation timed out"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::SyncIncomplete { failed, total, .. } => write!(
				f,
				"link synchronization incomplete: {} of {} operations failed",
				failed, total
			),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("json error: {}", err);
		Self::Parse
	}
}

impl From<tokio::task::JoinError> for Error {
	fn from(err: tokio::task::JoinError) -> Self {
		Self::Internal(err.to_string())
	}
}


// vim: ts=4

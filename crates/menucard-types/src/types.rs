//! Common types used throughout menucard.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// ProfileRef //
//************//
/// Identity of a profile document: the owning user and the profile itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRef {
	pub user_id: Box<str>,
	pub profile_id: Box<str>,
}

impl ProfileRef {
	pub fn new(user_id: impl Into<Box<str>>, profile_id: impl Into<Box<str>>) -> Self {
		Self { user_id: user_id.into(), profile_id: profile_id.into() }
	}

	/// Collection holding all profiles of a user
	pub fn collection_path(user_id: &str) -> String {
		format!("users/{}/profiles", user_id)
	}

	/// Path of the profile document
	pub fn path(&self) -> String {
		format!("{}/{}", Self::collection_path(&self.user_id), self.profile_id)
	}

	/// Collection holding the profile's social and custom links
	pub fn links_path(&self) -> String {
		format!("{}/links", self.path())
	}

	pub fn link_path(&self, link_id: &str) -> String {
		format!("{}/{}", self.links_path(), link_id)
	}
}

impl std::fmt::Display for ProfileRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.user_id, self.profile_id)
	}
}

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default)]
pub struct Timestamp(pub i64);

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::cmp::PartialEq for Timestamp {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl std::cmp::Eq for Timestamp {}

impl std::cmp::PartialOrd for Timestamp {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::cmp::Ord for Timestamp {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.0.cmp(&other.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

pub fn now() -> Timestamp {
	let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
	Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_profile_paths() {
		let profile = ProfileRef::new("u1", "p1");
		assert_eq!(profile.path(), "users/u1/profiles/p1");
		assert_eq!(profile.links_path(), "users/u1/profiles/p1/links");
		assert_eq!(profile.link_path("abc"), "users/u1/profiles/p1/links/abc");
		assert_eq!(profile.to_string(), "u1/p1");
	}
}

// vim: ts=4
